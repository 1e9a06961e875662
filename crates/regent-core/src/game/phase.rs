//! UI phase state machine.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// The single active UI phase of a playthrough.
///
/// `Setup` is the only phase reachable without a session; `Ended` is terminal
/// for a playthrough and is only entered through a final audit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Setup,
    LensSelection,
    ChapterSelect,
    Playing,
    Ended,
}

impl GamePhase {
    /// Whether this phase only makes sense with an active session.
    pub fn requires_session(self) -> bool {
        !matches!(self, GamePhase::Setup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_phase_string_form() {
        assert_eq!(GamePhase::LensSelection.to_string(), "lens_selection");
        assert_eq!(
            GamePhase::from_str("chapter_select").unwrap(),
            GamePhase::ChapterSelect
        );
        assert!(GamePhase::from_str("lobby").is_err());
    }

    #[test]
    fn test_only_setup_is_sessionless() {
        assert!(!GamePhase::Setup.requires_session());
        assert!(GamePhase::Playing.requires_session());
        assert!(GamePhase::Ended.requires_session());
    }
}
