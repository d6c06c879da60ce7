//! Service identity, dependency patterns and catalog templates.
//!
//! ## Identity
//!
//! A service is identified by `(type, provider)` only. Tags describe
//! capabilities (`multi-tenant`, `rls`, `sql`) and never take part in
//! equality, hashing or ordering.
//!
//! ## Textual form
//!
//! ```text
//! database:postgresql              identifier
//! database:postgresql+multi-tenant identifier with a tag
//! database:*                       pattern, any provider
//! database:*+rls                   pattern, any provider tagged rls
//! ```

use std::{
    cmp::Ordering,
    collections::BTreeSet,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Wildcard accepted in place of a provider in a pattern.
pub const WILDCARD: &str = "*";

// ============================================================================
// ServiceKey
// ============================================================================

/// The identity part of a service: `(type, provider)`.
///
/// Used as the catalog index key and as the graph node key in the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceKey {
    #[serde(rename = "type")]
    pub service_type: String,
    pub provider: String,
}

impl ServiceKey {
    pub fn new(service_type: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            provider: provider.into(),
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service_type, self.provider)
    }
}

// ============================================================================
// ServiceIdentifier
// ============================================================================

/// A concrete service: `{type, provider, tags}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceIdentifier {
    #[serde(rename = "type")]
    pub service_type: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl ServiceIdentifier {
    pub fn new(service_type: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            provider: provider.into(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Parse `type:provider[+tag...]`.
    ///
    /// # Errors
    ///
    /// `InvalidIdentifier` when a segment is empty, malformed, or the
    /// provider is the wildcard.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let parts = split_service_text(input).map_err(|reason| DomainError::InvalidIdentifier {
            input: input.to_string(),
            reason,
        })?;
        if parts.provider == WILDCARD {
            return Err(DomainError::InvalidIdentifier {
                input: input.to_string(),
                reason: "a concrete provider is required, '*' is only valid in patterns".into(),
            });
        }
        Ok(Self {
            service_type: parts.service_type,
            provider: parts.provider,
            tags: parts.tags,
        })
    }

    pub fn key(&self) -> ServiceKey {
        ServiceKey::new(&self.service_type, &self.provider)
    }

    pub fn is(&self, service_type: &str, provider: &str) -> bool {
        self.service_type == service_type && self.provider == provider
    }

    pub fn is_type(&self, service_type: &str) -> bool {
        self.service_type == service_type
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Structural check applied before any algorithm runs.
    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |reason: String| DomainError::InvalidIdentifier {
            input: self.to_string(),
            reason,
        };
        check_segment("type", &self.service_type).map_err(invalid)?;
        check_segment("provider", &self.provider).map_err(invalid)?;
        for tag in &self.tags {
            check_segment("tag", tag).map_err(invalid)?;
        }
        Ok(())
    }

    /// Identity as text, without tags.
    pub fn id(&self) -> String {
        format!("{}:{}", self.service_type, self.provider)
    }
}

impl PartialEq for ServiceIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.service_type == other.service_type && self.provider == other.provider
    }
}

impl Eq for ServiceIdentifier {}

impl Hash for ServiceIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.service_type.hash(state);
        self.provider.hash(state);
    }
}

impl PartialOrd for ServiceIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServiceIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.service_type, &self.provider).cmp(&(&other.service_type, &other.provider))
    }
}

impl fmt::Display for ServiceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service_type, self.provider)?;
        for tag in &self.tags {
            write!(f, "+{tag}")?;
        }
        Ok(())
    }
}

impl FromStr for ServiceIdentifier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// ServicePattern
// ============================================================================

/// A dependency or conflict declaration: `{type, provider | *, tags}`.
///
/// A pattern matches an identifier when the types are equal, the provider is
/// equal (or the pattern's provider is the wildcard), and the pattern's tags
/// are a subset of the identifier's tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServicePattern {
    pub service_type: String,
    /// `None` is the wildcard.
    pub provider: Option<String>,
    pub tags: BTreeSet<String>,
}

impl ServicePattern {
    /// Any provider of `service_type`.
    pub fn any(service_type: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            provider: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn exact(service_type: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            provider: Some(provider.into()),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Parse `type:provider[+tag...]` where provider may be `*`.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let parts = split_service_text(input).map_err(|reason| DomainError::InvalidPattern {
            input: input.to_string(),
            reason,
        })?;
        Ok(Self {
            service_type: parts.service_type,
            provider: (parts.provider != WILDCARD).then_some(parts.provider),
            tags: parts.tags,
        })
    }

    pub fn matches(&self, candidate: &ServiceIdentifier) -> bool {
        self.service_type == candidate.service_type
            && self
                .provider
                .as_deref()
                .is_none_or(|p| p == candidate.provider)
            && self.tags.is_subset(&candidate.tags)
    }

    pub fn is_wildcard(&self) -> bool {
        self.provider.is_none()
    }

    /// The pattern viewed as an identifier, for reporting in `missing`.
    ///
    /// A wildcard provider is rendered as `*`.
    pub fn to_identifier(&self) -> ServiceIdentifier {
        ServiceIdentifier {
            service_type: self.service_type.clone(),
            provider: self.provider.clone().unwrap_or_else(|| WILDCARD.to_string()),
            tags: self.tags.clone(),
        }
    }
}

impl fmt::Display for ServicePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.service_type,
            self.provider.as_deref().unwrap_or(WILDCARD)
        )?;
        for tag in &self.tags {
            write!(f, "+{tag}")?;
        }
        Ok(())
    }
}

impl FromStr for ServicePattern {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ServicePattern {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ServicePattern> for String {
    fn from(pattern: ServicePattern) -> Self {
        pattern.to_string()
    }
}

// ============================================================================
// Parsing helpers
// ============================================================================

struct ServiceText {
    service_type: String,
    provider: String,
    tags: BTreeSet<String>,
}

fn split_service_text(input: &str) -> Result<ServiceText, String> {
    let normalized = input.trim().to_ascii_lowercase();
    let mut segments = normalized.split('+');
    let head = segments.next().unwrap_or_default();

    let (service_type, provider) = head
        .split_once(':')
        .ok_or_else(|| "expected 'type:provider'".to_string())?;

    check_segment("type", service_type)?;
    if provider != WILDCARD {
        check_segment("provider", provider)?;
    }

    let mut tags = BTreeSet::new();
    for tag in segments {
        check_segment("tag", tag)?;
        tags.insert(tag.to_string());
    }

    Ok(ServiceText {
        service_type: service_type.to_string(),
        provider: provider.to_string(),
        tags,
    })
}

fn check_segment(what: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{what} cannot be empty"));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(format!("{what} contains invalid character '{bad}'"));
    }
    Ok(())
}

// ============================================================================
// ServiceTemplate
// ============================================================================

/// Where the renderer must place a service's generated code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionPoint {
    pub path: String,
    #[serde(default)]
    pub priority: i32,
}

impl InjectionPoint {
    pub fn new(path: impl Into<String>, priority: i32) -> Self {
        Self {
            path: path.into(),
            priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVariable {
    pub name: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_required() -> bool {
    true
}

impl EnvVariable {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            description: None,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            description: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Catalog entry keyed by `(type, provider)`. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceTemplate {
    #[serde(rename = "type")]
    pub service_type: String,
    pub provider: String,
    pub version: String,
    pub description: String,
    /// Preferred entry for its type when a wildcard dependency is expanded.
    pub is_default: bool,
    /// Capability tags merged into every resolved identifier.
    pub tags: BTreeSet<String>,
    pub dependencies: Vec<ServicePattern>,
    pub conflicts: Vec<ServicePattern>,
    pub injection_points: Vec<InjectionPoint>,
    pub env_variables: Vec<EnvVariable>,
    pub post_install: Vec<String>,
}

impl ServiceTemplate {
    pub fn builder(
        service_type: impl Into<String>,
        provider: impl Into<String>,
    ) -> ServiceTemplateBuilder {
        ServiceTemplateBuilder::new(service_type, provider)
    }

    pub fn key(&self) -> ServiceKey {
        ServiceKey::new(&self.service_type, &self.provider)
    }

    /// Identifier carrying this template's capability tags.
    pub fn identifier(&self) -> ServiceIdentifier {
        ServiceIdentifier::new(&self.service_type, &self.provider).with_tags(self.tags.iter().cloned())
    }

    /// Maximum declared injection priority; `0` when none are declared.
    pub fn max_priority(&self) -> i32 {
        self.injection_points
            .iter()
            .map(|p| p.priority)
            .max()
            .unwrap_or(0)
    }

    /// Whether any dependency pattern of this template matches `other`.
    ///
    /// A template never depends on itself.
    pub fn depends_on(&self, other: &ServiceIdentifier) -> bool {
        !self.is_self(other) && self.dependencies.iter().any(|d| d.matches(other))
    }

    pub fn conflicts_with(&self, other: &ServiceIdentifier) -> bool {
        !self.is_self(other) && self.conflicts.iter().any(|c| c.matches(other))
    }

    fn is_self(&self, other: &ServiceIdentifier) -> bool {
        other.is(&self.service_type, &self.provider)
    }

    /// Injection points sorted by priority, highest first. Stable for ties.
    pub fn injection_points_by_priority(&self) -> Vec<InjectionPoint> {
        let mut points = self.injection_points.clone();
        points.sort_by(|a, b| b.priority.cmp(&a.priority));
        points
    }

    /// Validate all invariants.
    ///
    /// Catalog loaders call this before registering a template.
    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |reason: String| DomainError::InvalidTemplate {
            service: self.key().to_string(),
            reason,
        };

        check_segment("type", &self.service_type).map_err(invalid)?;
        check_segment("provider", &self.provider).map_err(invalid)?;

        if self.version.trim().is_empty() {
            return Err(invalid("version cannot be empty".into()));
        }

        for tag in &self.tags {
            check_segment("tag", tag).map_err(invalid)?;
        }

        if let Some(point) = self.injection_points.iter().find(|p| p.path.trim().is_empty()) {
            return Err(invalid(format!(
                "injection point with priority {} has an empty path",
                point.priority
            )));
        }

        let mut seen = BTreeSet::new();
        for var in &self.env_variables {
            if var.name.trim().is_empty() {
                return Err(invalid("environment variable name cannot be empty".into()));
            }
            if !seen.insert(var.name.as_str()) {
                return Err(invalid(format!(
                    "environment variable '{}' declared twice",
                    var.name
                )));
            }
        }

        Ok(())
    }
}

/// Builder for [`ServiceTemplate`].
///
/// `build()` runs [`ServiceTemplate::validate`].
#[derive(Debug, Clone)]
pub struct ServiceTemplateBuilder {
    template: ServiceTemplate,
}

impl ServiceTemplateBuilder {
    pub fn new(service_type: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            template: ServiceTemplate {
                service_type: service_type.into(),
                provider: provider.into(),
                version: "1.0.0".into(),
                description: String::new(),
                is_default: false,
                tags: BTreeSet::new(),
                dependencies: Vec::new(),
                conflicts: Vec::new(),
                injection_points: Vec::new(),
                env_variables: Vec::new(),
                post_install: Vec::new(),
            },
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.template.version = version.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.template.description = description.into();
        self
    }

    pub fn default_for_type(mut self, is_default: bool) -> Self {
        self.template.is_default = is_default;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.template.tags.insert(tag.into());
        self
    }

    pub fn depends_on(mut self, pattern: ServicePattern) -> Self {
        self.template.dependencies.push(pattern);
        self
    }

    pub fn conflicts_with(mut self, pattern: ServicePattern) -> Self {
        self.template.conflicts.push(pattern);
        self
    }

    pub fn injection_point(mut self, path: impl Into<String>, priority: i32) -> Self {
        self.template
            .injection_points
            .push(InjectionPoint::new(path, priority));
        self
    }

    pub fn env(mut self, var: EnvVariable) -> Self {
        self.template.env_variables.push(var);
        self
    }

    pub fn post_install(mut self, step: impl Into<String>) -> Self {
        self.template.post_install.push(step.into());
        self
    }

    pub fn build(self) -> Result<ServiceTemplate, DomainError> {
        self.template.validate()?;
        Ok(self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_parses_tags() {
        let id = ServiceIdentifier::parse("database:postgresql+multi-tenant+rls").unwrap();
        assert_eq!(id.service_type, "database");
        assert_eq!(id.provider, "postgresql");
        assert!(id.has_tag("multi-tenant"));
        assert!(id.has_tag("rls"));
        assert_eq!(id.to_string(), "database:postgresql+multi-tenant+rls");
    }

    #[test]
    fn identifier_rejects_malformed_input() {
        assert!(ServiceIdentifier::parse("postgresql").is_err());
        assert!(ServiceIdentifier::parse(":postgresql").is_err());
        assert!(ServiceIdentifier::parse("database:").is_err());
        assert!(ServiceIdentifier::parse("database:*").is_err());
        assert!(ServiceIdentifier::parse("database:pg+").is_err());
        assert!(ServiceIdentifier::parse("data base:pg").is_err());
    }

    #[test]
    fn identity_ignores_tags() {
        let a = ServiceIdentifier::new("database", "postgresql").with_tag("rls");
        let b = ServiceIdentifier::new("database", "postgresql");
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn identifiers_order_by_type_then_provider() {
        let mut ids = vec![
            ServiceIdentifier::new("database", "sqlite"),
            ServiceIdentifier::new("auth", "clerk"),
            ServiceIdentifier::new("database", "mysql"),
        ];
        ids.sort();
        let rendered: Vec<_> = ids.iter().map(ServiceIdentifier::id).collect();
        assert_eq!(rendered, ["auth:clerk", "database:mysql", "database:sqlite"]);
    }

    #[test]
    fn wildcard_pattern_matches_any_provider() {
        let pattern = ServicePattern::parse("database:*").unwrap();
        assert!(pattern.is_wildcard());
        assert!(pattern.matches(&ServiceIdentifier::new("database", "sqlite")));
        assert!(!pattern.matches(&ServiceIdentifier::new("cache", "redis")));
        assert_eq!(pattern.to_string(), "database:*");
    }

    #[test]
    fn pattern_tags_must_be_subset_of_candidate() {
        let pattern = ServicePattern::any("database").with_tag("rls");
        let plain = ServiceIdentifier::new("database", "mysql");
        let rls = ServiceIdentifier::new("database", "postgresql").with_tags(["rls", "sql"]);
        assert!(!pattern.matches(&plain));
        assert!(pattern.matches(&rls));
    }

    #[test]
    fn pattern_deserializes_from_string() {
        let patterns: Vec<ServicePattern> =
            serde_json::from_str(r#"["database:*", "cache:redis+persistent"]"#).unwrap();
        assert_eq!(patterns[0], ServicePattern::any("database"));
        assert_eq!(
            patterns[1],
            ServicePattern::exact("cache", "redis").with_tag("persistent")
        );
    }

    #[test]
    fn template_never_depends_on_itself() {
        let template = ServiceTemplate::builder("database", "postgresql")
            .depends_on(ServicePattern::any("database"))
            .build()
            .unwrap();
        assert!(!template.depends_on(&ServiceIdentifier::new("database", "postgresql")));
        assert!(template.depends_on(&ServiceIdentifier::new("database", "sqlite")));
    }

    #[test]
    fn max_priority_defaults_to_zero() {
        let bare = ServiceTemplate::builder("email", "resend").build().unwrap();
        assert_eq!(bare.max_priority(), 0);

        let placed = ServiceTemplate::builder("auth", "clerk")
            .injection_point("src/middleware.ts", 10)
            .injection_point("src/app/layout.tsx", 50)
            .build()
            .unwrap();
        assert_eq!(placed.max_priority(), 50);
        assert_eq!(
            placed.injection_points_by_priority()[0].path,
            "src/app/layout.tsx"
        );
    }

    #[test]
    fn template_rejects_duplicate_env_variables() {
        let result = ServiceTemplate::builder("payment", "stripe")
            .env(EnvVariable::required("STRIPE_SECRET_KEY"))
            .env(EnvVariable::optional("STRIPE_SECRET_KEY"))
            .build();
        assert!(matches!(result, Err(DomainError::InvalidTemplate { .. })));
    }

    #[test]
    fn template_identifier_carries_capability_tags() {
        let template = ServiceTemplate::builder("database", "postgresql")
            .tag("rls")
            .build()
            .unwrap();
        assert!(template.identifier().has_tag("rls"));
    }
}
