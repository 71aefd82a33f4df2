pub mod local_storage;
pub mod memory;
pub mod auto;

pub use local_storage::LocalStorageStore;
pub use memory::MemoryStore;
pub use auto::auto_detect_store;
