//! Server-authoritative game snapshot.
//!
//! The client never derives any of these numbers. The controller replaces its
//! copy wholesale whenever the server sends one; the only local edit is the
//! optimistic trust patch after a private audience.

use super::advisor::Advisor;
use serde::{Deserialize, Serialize};

/// One axis of the power vector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PowerValue {
    pub value: f64,
    #[serde(default)]
    pub label: String,
}

/// Authority / Fear / Love plus their total.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PowerVector {
    #[serde(default)]
    pub authority: PowerValue,
    #[serde(default)]
    pub fear: PowerValue,
    #[serde(default)]
    pub love: PowerValue,
    #[serde(default)]
    pub total: f64,
}

/// Relationship between the player and one advisor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorRelation {
    pub trust: f64,
    pub loyalty: f64,
    pub is_hostile: bool,
    pub betrayal_intent: bool,
}

/// Per-advisor relation records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorRelations {
    pub lion: AdvisorRelation,
    pub fox: AdvisorRelation,
    pub balance: AdvisorRelation,
}

impl AdvisorRelations {
    pub fn get(&self, advisor: Advisor) -> &AdvisorRelation {
        match advisor {
            Advisor::Lion => &self.lion,
            Advisor::Fox => &self.fox,
            Advisor::Balance => &self.balance,
        }
    }

    pub fn get_mut(&mut self, advisor: Advisor) -> &mut AdvisorRelation {
        match advisor {
            Advisor::Lion => &mut self.lion,
            Advisor::Fox => &mut self.fox,
            Advisor::Balance => &mut self.balance,
        }
    }
}

/// The full snapshot the server returns after every state-changing call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    pub power: PowerVector,
    pub relations: AdvisorRelations,
    pub credit_score: f64,
    pub active_promises: u32,
    /// Leverage advisors hold against the player.
    pub leverage_count: u32,
    pub warnings: Vec<String>,
    pub game_over: bool,
    pub game_over_reason: Option<String>,
    pub current_chapter: Option<String>,
    pub turn: u32,
}

impl GameState {
    /// Current trust the given advisor has in the player.
    pub fn trust_of(&self, advisor: Advisor) -> f64 {
        self.relations.get(advisor).trust
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_state_deserializes_with_defaults() {
        let json = r#"{
            "power": {"authority": {"value": 55.0, "label": "steady"}, "total": 55.0},
            "relations": {"fox": {"trust": 12.5, "is_hostile": true}},
            "turn": 4
        }"#;

        let state: GameState = serde_json::from_str(json).unwrap();
        assert_eq!(state.power.authority.value, 55.0);
        assert_eq!(state.power.fear.value, 0.0);
        assert_eq!(state.trust_of(Advisor::Fox), 12.5);
        assert!(state.relations.fox.is_hostile);
        assert!(!state.relations.lion.is_hostile);
        assert_eq!(state.turn, 4);
        assert!(state.warnings.is_empty());
    }

    #[test]
    fn test_relation_get_mut_targets_one_advisor() {
        let mut relations = AdvisorRelations::default();
        relations.get_mut(Advisor::Balance).trust = 40.0;
        assert_eq!(relations.balance.trust, 40.0);
        assert_eq!(relations.lion.trust, 0.0);
        assert_eq!(relations.fox.trust, 0.0);
    }
}
