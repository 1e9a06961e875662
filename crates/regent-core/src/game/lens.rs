//! Observation lens choices.

use serde::{Deserialize, Serialize};

/// One lens offered at the start of a game, keyed by its lens key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LensChoice {
    pub name: String,
    pub description: String,
    pub effect: String,
    pub warning: String,
}

/// The lens the server confirmed for this session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectedLens {
    pub key: String,
    pub name: String,
    pub description: String,
}
