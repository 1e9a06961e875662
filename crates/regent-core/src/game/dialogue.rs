//! Transcript entries.

use super::advisor::Advisor;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Who spoke a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Speaker {
    Player,
    Lion,
    Fox,
    Balance,
    System,
}

impl From<Advisor> for Speaker {
    fn from(advisor: Advisor) -> Self {
        match advisor {
            Advisor::Lion => Speaker::Lion,
            Advisor::Fox => Speaker::Fox,
            Advisor::Balance => Speaker::Balance,
        }
    }
}

/// One line of the chapter transcript. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueEntry {
    pub turn: u32,
    pub speaker: Speaker,
    pub content: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_promise: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_secret_action: bool,
}

impl DialogueEntry {
    pub fn new(turn: u32, speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            turn,
            speaker,
            content: content.into(),
            is_promise: false,
            is_secret_action: false,
        }
    }

    pub fn system(turn: u32, content: impl Into<String>) -> Self {
        Self::new(turn, Speaker::System, content)
    }

    pub fn with_flags(mut self, is_promise: bool, is_secret_action: bool) -> Self {
        self.is_promise = is_promise;
        self.is_secret_action = is_secret_action;
        self
    }
}
