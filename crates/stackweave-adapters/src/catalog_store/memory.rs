//! In-memory service catalog store.

use std::sync::{Arc, RwLock};

use stackweave_core::{
    application::{ApplicationError, ports::CatalogStore},
    domain::{DomainValidator as validator, ServiceCatalog, ServiceTemplate},
    error::StackweaveResult,
};

/// Thread-safe copy-on-write catalog store.
///
/// Readers clone the current `Arc` and keep working on it; `register` builds
/// a new catalog and swaps it in under the write lock.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    inner: Arc<RwLock<Arc<ServiceCatalog>>>,
}

impl InMemoryCatalogStore {
    pub fn new(catalog: ServiceCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// Number of services in the current snapshot.
    pub fn len(&self) -> StackweaveResult<usize> {
        Ok(self.snapshot()?.len())
    }

    pub fn is_empty(&self) -> StackweaveResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn snapshot(&self) -> StackweaveResult<Arc<ServiceCatalog>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::CatalogLockError)?;
        Ok(Arc::clone(&inner))
    }

    fn register(&self, template: ServiceTemplate) -> StackweaveResult<()> {
        validator::validate_template(&template)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::CatalogLockError)?;
        let next = inner.with_template(template)?;
        *inner = Arc::new(next);
        Ok(())
    }
}
