//! Response bodies read back from the game server.
//!
//! Optional and collection fields default so a partial response still
//! deserializes; presence checks happen in the controller.

use crate::game::{
    Advisor, ChapterInfo, ChapterScene, CouncilDebate, DecreeConsequence, DialogueEntry,
    FinalAudit, GameEvent, GameState, LensChoice, PendingConsequence, SelectedLens,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// New game / lens
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewGameResponse {
    pub session_id: String,
    pub intro: String,
    pub initialization_scene: Option<String>,
    /// Lens key to choice.
    pub lens_choices: BTreeMap<String, LensChoice>,
    pub state: Option<GameState>,
    pub chapters: Vec<ChapterInfo>,
    pub requires_lens_selection: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SetLensResponse {
    pub selected_lens: SelectedLens,
    pub message: String,
    pub mountain_view: Option<String>,
}

// ============================================================================
// Chapters
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterDescriptor {
    pub id: String,
    pub name: String,
    pub subtitle: Option<String>,
    pub complexity: u8,
    pub max_turns: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StartChapterResponse {
    pub chapter: ChapterDescriptor,
    pub background: String,
    pub scene_snapshot: String,
    pub dilemma: String,
    pub opening_narration: String,
    pub council_debate: CouncilDebate,
    pub state: Option<GameState>,
    pub hide_values: bool,
}

impl StartChapterResponse {
    /// Splits the response into the scene the controller keeps and the
    /// authoritative state, if one was sent.
    pub fn into_scene(self) -> (ChapterScene, Option<GameState>) {
        let scene = ChapterScene {
            id: self.chapter.id,
            name: self.chapter.name,
            subtitle: self.chapter.subtitle,
            complexity: self.chapter.complexity,
            max_turns: self.chapter.max_turns,
            current_turn: 0,
            background: self.background,
            scene_snapshot: self.scene_snapshot,
            dilemma: self.dilemma,
            opening_narration: self.opening_narration,
            council_debate: self.council_debate,
            hide_values: self.hide_values,
        };
        (scene, self.state)
    }
}

// ============================================================================
// Decisions
// ============================================================================

/// Flags the server attaches to the player's decree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionAnalysis {
    pub is_promise: bool,
    pub is_secret_action: bool,
    pub is_deceptive: bool,
    pub is_violent: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerDelta {
    pub authority: f64,
    pub fear: f64,
    pub love: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterResult {
    pub chapter_ended: bool,
    pub victory: bool,
    pub message: Option<String>,
    pub current_turn: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorResponses {
    pub lion: Option<String>,
    pub fox: Option<String>,
    pub balance: Option<String>,
}

impl AdvisorResponses {
    pub fn response(&self, advisor: Advisor) -> Option<&str> {
        match advisor {
            Advisor::Lion => self.lion.as_deref(),
            Advisor::Fox => self.fox.as_deref(),
            Advisor::Balance => self.balance.as_deref(),
        }
    }
}

/// Short narrative notice: leverage gained, secret leaked.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeNotice {
    pub advisor: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgmentInfo {
    pub player_strategy: String,
    pub machiavelli_critique: String,
    pub outcome_level: String,
    pub consequence: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CausalSeedInfo {
    pub action_type: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoInfo {
    pub action_type: String,
    pub description: String,
    pub echo_message: String,
    pub crisis: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorChange {
    pub status: String,
    pub warning: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NextChapter {
    pub id: String,
    pub name: String,
    pub subtitle: Option<String>,
}

/// Everything the server reports about one submitted decree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionResponse {
    pub turn: u32,
    pub decision_analysis: DecisionAnalysis,
    pub power_changes: Option<PowerDelta>,
    pub state: Option<GameState>,
    pub chapter_result: Option<ChapterResult>,
    pub advisor_responses: AdvisorResponses,
    pub warnings: Vec<String>,
    pub leverage_gained: Option<NarrativeNotice>,
    pub secret_leaked: Option<NarrativeNotice>,
    pub next_chapter_available: Option<NextChapter>,
    pub final_audit: Option<FinalAudit>,
    pub judgment: Option<JudgmentInfo>,
    pub causal_seed: Option<CausalSeedInfo>,
    pub echo_triggered: Option<EchoInfo>,
    /// Advisor key to change.
    pub advisor_changes: BTreeMap<String, AdvisorChange>,
    pub decree_consequences: Vec<DecreeConsequence>,
    /// Authoritative replacement for the deferred-consequence list, when sent.
    pub pending_consequences: Option<Vec<PendingConsequence>>,
    /// A realm event this decree triggered.
    pub event: Option<GameEvent>,
}

impl DecisionResponse {
    pub fn chapter_ended(&self) -> bool {
        self.chapter_result
            .as_ref()
            .is_some_and(|result| result.chapter_ended)
    }
}

// ============================================================================
// Audience / session
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceReply {
    pub advisor: Advisor,
    pub response: String,
    #[serde(default)]
    pub trust_change: f64,
    #[serde(default)]
    pub new_trust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    pub state: Option<GameState>,
    /// Most recent transcript lines the server kept.
    pub history: Vec<DialogueEntry>,
    /// Ids of events still waiting for a choice.
    pub pending_events: Vec<String>,
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventOutcome {
    /// Text of the choice the server applied.
    pub choice_made: String,
    pub impact: PowerDelta,
    pub warnings: Vec<String>,
    pub game_over: bool,
    pub game_over_narration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventResponse {
    pub event_id: String,
    pub result: EventOutcome,
    pub state: Option<GameState>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteSessionResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_response_without_state() {
        let json = r#"{
            "turn": 2,
            "advisor_responses": {"lion": "Strike now.", "balance": "Wait."},
            "chapter_result": {"chapter_ended": false, "victory": false}
        }"#;

        let response: DecisionResponse = serde_json::from_str(json).unwrap();
        assert!(response.state.is_none());
        assert!(response.event.is_none());
        assert_eq!(response.advisor_responses.response(Advisor::Lion), Some("Strike now."));
        assert_eq!(response.advisor_responses.response(Advisor::Fox), None);
        assert!(!response.chapter_ended());
        assert!(response.final_audit.is_none());
    }

    #[test]
    fn test_into_scene_starts_at_turn_zero() {
        let response: StartChapterResponse = serde_json::from_str(
            r#"{
                "chapter": {"id": "chapter_1", "name": "Ashes", "complexity": 2, "max_turns": 6},
                "dilemma": "The granary burns",
                "hide_values": true
            }"#,
        )
        .unwrap();

        let (scene, state) = response.into_scene();
        assert_eq!(scene.id, "chapter_1");
        assert_eq!(scene.max_turns, 6);
        assert_eq!(scene.current_turn, 0);
        assert!(scene.hide_values);
        assert!(state.is_none());
    }

    #[test]
    fn test_event_response_reads_outcome() {
        let response: EventResponse = serde_json::from_str(
            r#"{
                "event_id": "riot",
                "result": {
                    "choice_made": "Send the guard",
                    "impact": {"authority": 5, "fear": 10, "love": -15},
                    "warnings": ["The people fear you"]
                },
                "state": {"turn": 4}
            }"#,
        )
        .unwrap();

        assert_eq!(response.result.impact.love, -15.0);
        assert!(!response.result.game_over);
        assert!(response.result.game_over_narration.is_none());
        assert_eq!(response.state.map(|s| s.turn), Some(4));
    }
}
