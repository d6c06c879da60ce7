//! In-memory bundle store.

use std::sync::Arc;

use stackweave_core::{
    application::ports::BundleStore, domain::BundleCatalog, error::StackweaveResult,
};

/// Bundles never change after load, so the store is a shared immutable value.
#[derive(Clone, Default)]
pub struct InMemoryBundleStore {
    inner: Arc<BundleCatalog>,
}

impl InMemoryBundleStore {
    pub fn new(bundles: BundleCatalog) -> Self {
        Self {
            inner: Arc::new(bundles),
        }
    }
}

impl BundleStore for InMemoryBundleStore {
    fn snapshot(&self) -> StackweaveResult<Arc<BundleCatalog>> {
        Ok(Arc::clone(&self.inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshots_share_one_catalog() {
        let store = InMemoryBundleStore::default();
        let a = store.snapshot().unwrap();
        let b = store.snapshot().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.is_empty());
    }
}
