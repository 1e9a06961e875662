//! Realm events raised by the server mid-chapter (riots, coups and the like).

use serde::{Deserialize, Serialize};

/// Power shift a choice would cause, as the server describes it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventImpact {
    pub authority: f64,
    pub fear: f64,
    pub love: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventChoice {
    pub id: String,
    pub text: String,
    pub impact: EventImpact,
}

/// An event awaiting the player's choice.
///
/// At most one is held at a time; it stays until a choice is accepted by the
/// server or the server stops listing it as pending.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub narration: String,
    pub choices: Vec<EventChoice>,
}

impl GameEvent {
    pub fn choice(&self, choice_id: &str) -> Option<&EventChoice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_server_event() {
        let event: GameEvent = serde_json::from_str(
            r#"{
                "id": "riot",
                "type": "crisis",
                "title": "Bread Riot",
                "narration": "The square fills with torches.",
                "choices": [
                    {"id": "suppress", "text": "Send the guard", "impact": {"authority": 5, "fear": 10, "love": -15}},
                    {"id": "feed", "text": "Open the granaries"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(event.kind, "crisis");
        assert_eq!(event.choice("suppress").map(|c| c.impact.love), Some(-15.0));
        assert_eq!(event.choice("feed").map(|c| c.impact.clone()), Some(EventImpact::default()));
        assert!(event.choice("flee").is_none());
    }
}
