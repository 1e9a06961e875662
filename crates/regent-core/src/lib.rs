//! Domain model and contracts for the Shadow Regent client.
//!
//! Nothing in this crate performs I/O. It defines what the controller holds
//! (`game`), what it sends and receives (`gateway`), where it mirrors state
//! (`storage`), and how it is configured (`config`).

pub mod config;
pub mod error;
pub mod game;
pub mod gateway;
pub mod storage;

// Re-export common error type
pub use error::{RegentError, Result};
