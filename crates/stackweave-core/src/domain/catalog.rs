//! Read-only catalogs: service templates and bundles.
//!
//! Both are plain values. Hot registration is done by building a new catalog
//! with [`ServiceCatalog::with_template`] and swapping it in at the store
//! level, so a resolution that already holds a catalog never observes a
//! registration that happened after it started.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{
    DomainError,
    entities::{Bundle, ServiceIdentifier, ServiceKey, ServicePattern, ServiceTemplate},
};

// ============================================================================
// ServiceCatalog
// ============================================================================

/// Indexed lookup of [`ServiceTemplate`] by `(type, provider)`.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    templates: HashMap<ServiceKey, ServiceTemplate>,
    /// type → providers, sorted.
    by_type: BTreeMap<String, Vec<String>>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, rejecting invalid or duplicate templates.
    pub fn from_templates<I>(templates: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = ServiceTemplate>,
    {
        let mut catalog = Self::new();
        for template in templates {
            catalog.insert(template)?;
        }
        Ok(catalog)
    }

    /// Copy of this catalog with one more template.
    pub fn with_template(&self, template: ServiceTemplate) -> Result<Self, DomainError> {
        let mut next = self.clone();
        next.insert(template)?;
        Ok(next)
    }

    fn insert(&mut self, template: ServiceTemplate) -> Result<(), DomainError> {
        template.validate()?;
        let key = template.key();
        if self.templates.contains_key(&key) {
            return Err(DomainError::DuplicateService {
                service: key.to_string(),
            });
        }

        let providers = self.by_type.entry(key.service_type.clone()).or_default();
        let at = providers.partition_point(|p| p < &key.provider);
        providers.insert(at, key.provider.clone());

        self.templates.insert(key, template);
        Ok(())
    }

    /// O(1) lookup. Absence is an expected outcome, not an error.
    pub fn get(&self, service_type: &str, provider: &str) -> Option<&ServiceTemplate> {
        self.templates.get(&ServiceKey::new(service_type, provider))
    }

    pub fn get_by_key(&self, key: &ServiceKey) -> Option<&ServiceTemplate> {
        self.templates.get(key)
    }

    /// Like [`get`](Self::get) but reports absence as `ServiceNotFound`.
    pub fn require(&self, service_type: &str, provider: &str) -> Result<&ServiceTemplate, DomainError> {
        self.get(service_type, provider)
            .ok_or_else(|| DomainError::ServiceNotFound {
                service_type: service_type.to_string(),
                provider: provider.to_string(),
            })
    }

    /// All templates of a type, in lexical provider order.
    pub fn list_by_type(&self, service_type: &str) -> Vec<&ServiceTemplate> {
        self.by_type
            .get(service_type)
            .into_iter()
            .flatten()
            .filter_map(|provider| self.get(service_type, provider))
            .collect()
    }

    /// Known service types, sorted.
    pub fn service_types(&self) -> Vec<&str> {
        self.by_type.keys().map(String::as_str).collect()
    }

    /// Every template, sorted by `(type, provider)`.
    pub fn iter_sorted(&self) -> impl Iterator<Item = &ServiceTemplate> {
        self.by_type.iter().flat_map(move |(service_type, providers)| {
            providers
                .iter()
                .filter_map(move |provider| self.get(service_type, provider))
        })
    }

    /// Templates matching `pattern`, best candidate first.
    ///
    /// Preference: entries flagged `is_default`, then lexical provider order.
    /// Tag constraints are checked against the template's capability tags.
    pub fn candidates(&self, pattern: &ServicePattern) -> Vec<&ServiceTemplate> {
        let mut found: Vec<&ServiceTemplate> = self
            .list_by_type(&pattern.service_type)
            .into_iter()
            .filter(|t| pattern.matches(&t.identifier()))
            .collect();
        // stable sort keeps lexical order within each group
        found.sort_by_key(|t| !t.is_default);
        found
    }

    /// First candidate for `pattern` other than `exclude`.
    pub fn best_match(
        &self,
        pattern: &ServicePattern,
        exclude: &ServiceIdentifier,
    ) -> Option<&ServiceTemplate> {
        self.candidates(pattern)
            .into_iter()
            .find(|t| !exclude.is(&t.service_type, &t.provider))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

// ============================================================================
// BundleCatalog
// ============================================================================

/// Bundles in registration order.
#[derive(Debug, Clone, Default)]
pub struct BundleCatalog {
    bundles: Vec<Bundle>,
}

impl BundleCatalog {
    pub fn new<I>(bundles: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = Bundle>,
    {
        let mut out: Vec<Bundle> = Vec::new();
        for bundle in bundles {
            bundle.validate()?;
            if out.iter().any(|b| b.id == bundle.id) {
                return Err(DomainError::DuplicateBundle {
                    bundle_id: bundle.id,
                });
            }
            out.push(bundle);
        }
        Ok(Self { bundles: out })
    }

    pub fn get(&self, id: &str) -> Option<&Bundle> {
        self.bundles.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bundle> {
        self.bundles.iter()
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(service_type: &str, provider: &str) -> ServiceTemplate {
        ServiceTemplate::builder(service_type, provider)
            .build()
            .unwrap()
    }

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::from_templates([
            template("database", "sqlite"),
            ServiceTemplate::builder("database", "postgresql")
                .default_for_type(true)
                .tag("rls")
                .build()
                .unwrap(),
            template("database", "mysql"),
            template("cache", "redis"),
        ])
        .unwrap()
    }

    #[test]
    fn get_returns_none_for_unknown_provider() {
        let catalog = catalog();
        assert!(catalog.get("database", "sqlite").is_some());
        assert!(catalog.get("database", "oracle").is_none());
        assert!(catalog.get("queue", "sqs").is_none());
    }

    #[test]
    fn require_reports_not_found() {
        let err = catalog().require("database", "oracle").unwrap_err();
        assert_eq!(
            err,
            DomainError::ServiceNotFound {
                service_type: "database".into(),
                provider: "oracle".into()
            }
        );
    }

    #[test]
    fn list_by_type_is_lexical() {
        let catalog = catalog();
        let providers: Vec<_> = catalog
            .list_by_type("database")
            .iter()
            .map(|t| t.provider.as_str())
            .collect();
        assert_eq!(providers, ["mysql", "postgresql", "sqlite"]);
        assert!(catalog.list_by_type("queue").is_empty());
    }

    #[test]
    fn candidates_prefer_defaults_then_lexical() {
        let catalog = catalog();
        let providers: Vec<_> = catalog
            .candidates(&ServicePattern::any("database"))
            .iter()
            .map(|t| t.provider.as_str())
            .collect();
        assert_eq!(providers, ["postgresql", "mysql", "sqlite"]);
    }

    #[test]
    fn candidates_respect_pattern_tags() {
        let catalog = catalog();
        let found = catalog.candidates(&ServicePattern::any("database").with_tag("rls"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].provider, "postgresql");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let catalog = catalog();
        let err = catalog
            .with_template(template("cache", "redis"))
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateService { .. }));
    }

    #[test]
    fn with_template_leaves_original_untouched() {
        let original = catalog();
        let extended = original.with_template(template("cache", "upstash")).unwrap();
        assert_eq!(original.len(), 4);
        assert_eq!(extended.len(), 5);
        assert!(original.get("cache", "upstash").is_none());
    }

    #[test]
    fn iter_sorted_orders_by_type_then_provider() {
        let catalog = catalog();
        let keys: Vec<_> = catalog.iter_sorted().map(|t| t.key().to_string()).collect();
        assert_eq!(
            keys,
            [
                "cache:redis",
                "database:mysql",
                "database:postgresql",
                "database:sqlite"
            ]
        );
    }
}
