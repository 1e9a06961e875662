//! Decree consequences and the cross-chapter accumulator.

use serde::{Deserialize, Serialize};

/// A side-effect of a decree as reported by the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecreeConsequence {
    pub severity: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub possible_outcomes: Vec<String>,
    pub deadline_turns: Option<u32>,
}

/// A consequence the player chose to defer past the chapter boundary.
///
/// Once recorded it survives chapter changes until the server reports it
/// resolved or the game restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConsequence {
    pub source_chapter: String,
    pub source_turn: u32,
    pub consequence: DecreeConsequence,
    /// Turns left before the consequence comes due, if it has a deadline.
    #[serde(default)]
    pub remaining_turns: Option<u32>,
}

impl PendingConsequence {
    /// Stamps a decree consequence with where it was deferred from.
    pub fn deferred(
        source_chapter: impl Into<String>,
        source_turn: u32,
        consequence: DecreeConsequence,
    ) -> Self {
        let remaining_turns = consequence.deadline_turns;
        Self {
            source_chapter: source_chapter.into(),
            source_turn,
            consequence,
            remaining_turns,
        }
    }
}
