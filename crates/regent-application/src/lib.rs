//! Use cases for the Shadow Regent client.

pub mod session;

pub use session::{ControllerOptions, GameSessionController, SessionView};
