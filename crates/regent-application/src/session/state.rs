//! Controller-owned session state and the view published to observers.

use regent_core::game::{
    Advisor, ChapterInfo, ChapterScene, DialogueEntry, FinalAudit, GameEvent, GamePhase,
    GameState, LensChoice, PendingConsequence, SelectedLens,
};
use regent_core::gateway::DecisionResponse;
use std::collections::BTreeMap;

/// Everything the controller knows about the current playthrough.
///
/// The persisted slices are listed on `StorageKey`; the remaining fields
/// live only for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub session_id: Option<String>,
    pub phase: GamePhase,
    /// Last authoritative snapshot, possibly carrying an optimistic trust patch.
    pub game_state: Option<GameState>,
    pub current_chapter: Option<ChapterScene>,
    /// Append-only transcript of the active chapter.
    pub dialogue: Vec<DialogueEntry>,
    pub chapters: Vec<ChapterInfo>,
    pub selected_lens: Option<SelectedLens>,
    pub pending_consequences: Vec<PendingConsequence>,
    pub intro: Option<String>,
    pub mountain_view: Option<String>,
    /// Per-turn notes held back until the chapter ends (quiet transcript).
    pub chapter_notes: Vec<String>,
    /// Realm event raised by the last decree, awaiting a choice.
    pub pending_event: Option<GameEvent>,

    pub lens_choices: BTreeMap<String, LensChoice>,
    pub initialization_scene: Option<String>,
    pub final_audit: Option<FinalAudit>,
    pub last_decision: Option<DecisionResponse>,
    /// Advisors whose trust was patched locally and not yet confirmed by a
    /// server snapshot.
    pub unconfirmed_trust: Vec<Advisor>,
}

impl SessionState {
    pub fn has_session(&self) -> bool {
        self.session_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Replaces the game state with a server snapshot.
    ///
    /// This is the reconciliation point for optimistic trust patches: any
    /// authoritative snapshot wins over them.
    pub fn apply_authoritative_state(&mut self, state: GameState) {
        self.game_state = Some(state);
        self.unconfirmed_trust.clear();
    }

    /// Locally sets one advisor's trust after a private audience.
    ///
    /// Only that advisor's trust changes. Uses `new_trust` when the server
    /// sent one, otherwise adds `trust_change`. No-op without a game state.
    pub fn apply_optimistic_trust(&mut self, advisor: Advisor, trust_change: f64, new_trust: Option<f64>) {
        let Some(state) = self.game_state.as_mut() else {
            return;
        };

        let relation = state.relations.get_mut(advisor);
        relation.trust = new_trust.unwrap_or(relation.trust + trust_change);

        if !self.unconfirmed_trust.contains(&advisor) {
            self.unconfirmed_trust.push(advisor);
        }
    }
}

/// Snapshot handed to presentation layers through `subscribe()`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionView {
    pub session: SessionState,
    pub is_loading: bool,
    /// The single error slot. Overwritten by the next failure.
    pub error: Option<String>,
    pub has_api_key: bool,
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimistic_patch_touches_one_advisor_until_reconciled() {
        let mut session = SessionState {
            game_state: Some(GameState::default()),
            ..Default::default()
        };
        session.game_state.as_mut().unwrap().relations.lion.trust = 50.0;
        session.game_state.as_mut().unwrap().credit_score = 80.0;

        session.apply_optimistic_trust(Advisor::Lion, 5.0, None);
        let patched = session.game_state.clone().unwrap();
        assert_eq!(patched.relations.lion.trust, 55.0);
        assert_eq!(patched.relations.fox.trust, 0.0);
        assert_eq!(patched.credit_score, 80.0);
        assert_eq!(session.unconfirmed_trust, vec![Advisor::Lion]);

        session.apply_optimistic_trust(Advisor::Lion, 5.0, Some(70.0));
        assert_eq!(session.game_state.as_ref().unwrap().relations.lion.trust, 70.0);
        assert_eq!(session.unconfirmed_trust.len(), 1);

        let mut authoritative = GameState::default();
        authoritative.relations.lion.trust = 52.0;
        session.apply_authoritative_state(authoritative);
        assert_eq!(session.game_state.as_ref().unwrap().relations.lion.trust, 52.0);
        assert!(session.unconfirmed_trust.is_empty());
    }

    #[test]
    fn test_optimistic_patch_without_state_is_noop() {
        let mut session = SessionState::default();
        session.apply_optimistic_trust(Advisor::Fox, 3.0, Some(10.0));
        assert!(session.game_state.is_none());
        assert!(session.unconfirmed_trust.is_empty());
    }
}
