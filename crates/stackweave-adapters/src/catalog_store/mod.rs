mod memory;

pub use memory::InMemoryCatalogStore;
