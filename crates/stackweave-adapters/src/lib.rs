//! Infrastructure adapters for Stackweave.
//!
//! This crate implements the ports defined in `stackweave-core::application::ports`
//! and the catalog-loading collaborator. It contains all file I/O.

pub mod builtin_catalog;
pub mod bundle_store;
pub mod catalog_loader;
pub mod catalog_store;
pub mod error;

use std::sync::Arc;

use stackweave_core::application::ports::{BundleStore, CatalogStore};

// Re-export commonly used adapters
pub use builtin_catalog::{CATALOG_DIR_ENV, CatalogSource, discover, embedded};
pub use bundle_store::InMemoryBundleStore;
pub use catalog_loader::{FilesystemCatalogLoader, LoadedCatalog};
pub use catalog_store::InMemoryCatalogStore;
pub use error::CatalogLoadError;

impl LoadedCatalog {
    /// Wrap the loaded catalogs in in-memory stores ready for the services.
    pub fn into_stores(self) -> (Arc<dyn CatalogStore>, Arc<dyn BundleStore>) {
        (
            Arc::new(InMemoryCatalogStore::new(self.services)),
            Arc::new(InMemoryBundleStore::new(self.bundles)),
        )
    }
}
