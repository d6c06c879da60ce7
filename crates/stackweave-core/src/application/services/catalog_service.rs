//! Catalog Service - browse and extend the service and bundle catalogs.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::{
    application::ports::{BundleStore, CatalogStore},
    domain::{Bundle, DomainError, DomainValidator, ServiceTemplate},
    error::StackweaveResult,
};

/// Catalog browsing use cases.
///
/// Results are owned copies taken from a single snapshot, so a concurrent
/// `register` never shows up halfway through a listing.
#[derive(Clone)]
pub struct CatalogService {
    services: Arc<dyn CatalogStore>,
    bundles: Arc<dyn BundleStore>,
}

impl CatalogService {
    pub fn new(services: Arc<dyn CatalogStore>, bundles: Arc<dyn BundleStore>) -> Self {
        Self { services, bundles }
    }

    /// All templates, optionally restricted to one service type, sorted by
    /// type then provider.
    pub fn list_services(&self, service_type: Option<&str>) -> StackweaveResult<Vec<ServiceTemplate>> {
        let catalog = self.services.snapshot()?;
        let templates: Vec<ServiceTemplate> = match service_type {
            Some(t) => catalog.list_by_type(t).into_iter().cloned().collect(),
            None => catalog.iter_sorted().cloned().collect(),
        };
        debug!(count = templates.len(), filter = ?service_type, "Listed services");
        Ok(templates)
    }

    /// # Errors
    ///
    /// `ServiceNotFound` when the catalog has no such template.
    pub fn get(&self, service_type: &str, provider: &str) -> StackweaveResult<ServiceTemplate> {
        let catalog = self.services.snapshot()?;
        Ok(catalog.require(service_type, provider)?.clone())
    }

    pub fn service_types(&self) -> StackweaveResult<Vec<String>> {
        let catalog = self.services.snapshot()?;
        Ok(catalog.service_types().into_iter().map(String::from).collect())
    }

    pub fn list_bundles(&self) -> StackweaveResult<Vec<Bundle>> {
        let bundles = self.bundles.snapshot()?;
        Ok(bundles.iter().cloned().collect())
    }

    pub fn get_bundle(&self, id: &str) -> StackweaveResult<Bundle> {
        let bundles = self.bundles.snapshot()?;
        bundles.get(id).cloned().ok_or_else(|| {
            DomainError::InvalidBundle {
                bundle_id: id.to_string(),
                reason: "no bundle with this id".into(),
            }
            .into()
        })
    }

    /// Add a template to the catalog.
    ///
    /// Resolutions already running keep the snapshot they started with.
    #[instrument(skip_all, fields(service = %template.key()))]
    pub fn register(&self, template: ServiceTemplate) -> StackweaveResult<()> {
        DomainValidator::validate_template(&template)?;
        self.services.register(template)?;
        info!("Service registered");
        Ok(())
    }
}
