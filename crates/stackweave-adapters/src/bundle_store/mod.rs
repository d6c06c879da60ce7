mod memory;

pub use memory::InMemoryBundleStore;
