//! Durable key-value storage contract.
//!
//! The controller mirrors its state slices into a flat string-to-string
//! namespace. Implementations live in `regent-infrastructure`.

mod repository;

pub use repository::KeyValueStore;
