//! Filesystem side of the Shadow Regent client: platform paths, config
//! loading and the durable key-value stores.

pub mod config_service;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::paths::RegentPaths;
pub use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
