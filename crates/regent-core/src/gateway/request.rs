//! Request bodies sent to the game server.

use crate::game::{Advisor, PendingConsequence};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGameRequest {
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub skip_intro: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetLensRequest {
    pub session_id: String,
    pub lens: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartChapterRequest {
    pub session_id: String,
    pub chapter_id: String,
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRequest {
    pub session_id: String,
    /// The free-text decree.
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followed_advisor: Option<Advisor>,
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Deferred consequences the player is still carrying.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pending_consequences: Vec<PendingConsequence>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudienceRequest {
    pub session_id: String,
    pub advisor: Advisor,
    pub message: String,
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// The player's answer to a pending realm event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventChoiceRequest {
    pub session_id: String,
    pub event_id: String,
    pub choice_id: String,
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_request_omits_empty_optionals() {
        let request = DecisionRequest {
            session_id: "s-1".into(),
            input: "Raise the tithe".into(),
            followed_advisor: None,
            api_key: "k".into(),
            model: None,
            pending_consequences: Vec::new(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("followed_advisor").is_none());
        assert!(value.get("model").is_none());
        assert!(value.get("pending_consequences").is_none());
        assert_eq!(value["input"], "Raise the tithe");
    }

    #[test]
    fn test_followed_advisor_uses_wire_name() {
        let request = AudienceRequest {
            session_id: "s-1".into(),
            advisor: Advisor::Fox,
            message: "What do you know?".into(),
            api_key: "k".into(),
            model: Some("m".into()),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["advisor"], "fox");
        assert_eq!(value["model"], "m");
    }
}
