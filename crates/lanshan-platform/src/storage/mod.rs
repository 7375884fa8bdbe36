pub mod auto;
pub mod indexeddb;
pub mod memory;

pub use auto::auto_detect_storage;
pub use indexeddb::IndexedDbStorage;
pub use memory::MemoryStorage;
