//! Client configuration and credentials.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Default game server location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Permanent storage key for the API key. Never wiped on session reset.
pub const API_KEY_STORAGE_KEY: &str = "regent_api_key";

/// Permanent storage key for the model name. Never wiped on session reset.
pub const MODEL_STORAGE_KEY: &str = "regent_model";

/// How much per-turn server metadata goes into the live transcript.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TranscriptVerbosity {
    /// Judgment, causal seeds and similar notes are held back until the
    /// chapter ends.
    #[default]
    Quiet,
    /// Every note is appended as a system line on the turn it arrives.
    Verbose,
}

/// Settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub transcript: TranscriptVerbosity,
    pub skip_intro: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            transcript: TranscriptVerbosity::default(),
            skip_intro: false,
        }
    }
}

/// User-entered credentials. Scoped to the installation, not the session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub model: Option<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, model: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model,
        }
    }

    /// Whether a non-blank API key is configured.
    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
