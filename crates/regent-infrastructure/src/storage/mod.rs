//! Storage layer: atomic file primitive and key-value store implementations.

mod atomic_json;
mod file_store;
mod memory_store;

pub use atomic_json::{AtomicJsonError, AtomicJsonFile};
pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;
