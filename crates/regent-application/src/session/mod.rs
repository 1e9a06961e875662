//! Game session application services.
//!
//! - `controller`: `GameSessionController`, the single owner of session state
//! - `state`: `SessionState` and the published `SessionView`
//! - `persistence`: explicit save/load/wipe of state slices
//! - `transcript`: builders for transcript batches

mod controller;
mod persistence;
mod state;
pub mod transcript;

pub use controller::{ControllerOptions, GameSessionController};
pub use persistence::{SessionPersistence, StorageKey};
pub use state::{SessionState, SessionView};
