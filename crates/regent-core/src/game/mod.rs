//! Game domain module.
//!
//! Client-side mirrors of the server's game model. Nothing in here computes
//! game outcomes; these types only hold what the server sent.
//!
//! # Module Structure
//!
//! - `phase`: UI phase state machine (`GamePhase`)
//! - `state`: Server-authoritative snapshot (`GameState`, `PowerVector`, `AdvisorRelation`)
//! - `advisor`: The three council personas (`Advisor`)
//! - `chapter`: Chapter list entries and the active scene (`ChapterInfo`, `ChapterScene`)
//! - `dialogue`: Transcript entries (`DialogueEntry`, `Speaker`)
//! - `consequence`: Decree side-effects and the deferred accumulator (`PendingConsequence`)
//! - `event`: Realm events awaiting a choice (`GameEvent`)
//! - `lens`: Observation lens choices (`LensChoice`, `SelectedLens`)
//! - `audit`: End-of-game audit (`FinalAudit`)

mod advisor;
mod audit;
mod chapter;
mod consequence;
mod dialogue;
mod event;
mod lens;
mod phase;
mod state;

pub use advisor::Advisor;
pub use audit::FinalAudit;
pub use chapter::{AdvisorSuggestion, ChapterInfo, ChapterScene, ChapterStatus, CouncilDebate};
pub use consequence::{DecreeConsequence, PendingConsequence};
pub use dialogue::{DialogueEntry, Speaker};
pub use event::{EventChoice, EventImpact, GameEvent};
pub use lens::{LensChoice, SelectedLens};
pub use phase::GamePhase;
pub use state::{AdvisorRelation, AdvisorRelations, GameState, PowerValue, PowerVector};
