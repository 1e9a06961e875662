//! Error types for the Shadow Regent client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every layer of the client.
///
/// The controller never lets one of these escape to the presentation layer;
/// it folds them into a single human-readable string via [`RegentError::user_message`].
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegentError {
    /// A local guard rejected the operation before any network call.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The server answered with a non-success status.
    #[error("API error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Api {
        status: Option<u16>,
        message: String,
    },

    /// The request could not be sent or its body could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The operation was superseded by a session reset.
    #[error("Operation cancelled")]
    Cancelled,

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RegentError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Creates an Api error
    pub fn api(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Precondition error
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// Check if this error came from the server
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Check if the operation was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The string surfaced in the controller's error slot.
    ///
    /// Server-provided messages are passed through verbatim; everything else
    /// uses the display form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Precondition(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RegentError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RegentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RegentError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for RegentError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, RegentError>`.
pub type Result<T> = std::result::Result<T, RegentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_user_message_is_verbatim() {
        let err = RegentError::api(Some(404), "Game session does not exist");
        assert_eq!(err.user_message(), "Game session does not exist");
        assert_eq!(
            err.to_string(),
            "API error (404): Game session does not exist"
        );
    }

    #[test]
    fn test_api_display_without_status() {
        let err = RegentError::api(None, "boom");
        assert_eq!(err.to_string(), "API error: boom");
    }

    #[test]
    fn test_precondition_user_message() {
        let err = RegentError::precondition("Set an API key first");
        assert!(err.is_precondition());
        assert_eq!(err.user_message(), "Set an API key first");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: RegentError = parse.into();
        assert!(matches!(err, RegentError::Serialization { ref format, .. } if format == "JSON"));
    }
}
