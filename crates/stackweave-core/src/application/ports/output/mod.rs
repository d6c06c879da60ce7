//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `stackweave-adapters` crate provides implementations.

use std::sync::Arc;

use crate::domain::{BundleCatalog, ServiceCatalog, ServiceTemplate};
use crate::error::StackweaveResult;

/// Port for the service template catalog.
///
/// Implemented by:
/// - `stackweave_adapters::catalog_store::InMemoryCatalogStore`
///
/// ## Snapshot semantics
///
/// `snapshot()` hands out the current catalog behind an `Arc`. `register()`
/// must never mutate a catalog that was already handed out; it builds a new
/// one and swaps it in, so a resolution holding a snapshot never sees a
/// registration that happened after it started.
pub trait CatalogStore: Send + Sync {
    /// The catalog as of now.
    fn snapshot(&self) -> StackweaveResult<Arc<ServiceCatalog>>;

    /// Add a template. Rejects duplicates and invalid templates.
    fn register(&self, template: ServiceTemplate) -> StackweaveResult<()>;
}

/// Port for the bundle catalog.
///
/// Implemented by:
/// - `stackweave_adapters::bundle_store::InMemoryBundleStore`
pub trait BundleStore: Send + Sync {
    fn snapshot(&self) -> StackweaveResult<Arc<BundleCatalog>>;
}
