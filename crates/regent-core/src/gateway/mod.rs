//! API gateway contract.
//!
//! The decision engine lives on the server. This module fixes the shape of
//! what the client sends and what it reads back, and the trait the
//! controller calls through. `regent-interaction` provides the HTTP
//! implementation; tests provide mocks.

mod request;
mod response;

pub use request::{
    AudienceRequest, DecisionRequest, EventChoiceRequest, NewGameRequest, SetLensRequest,
    StartChapterRequest,
};
pub use response::{
    AdvisorChange, AdvisorResponses, AudienceReply, CausalSeedInfo, ChapterDescriptor,
    ChapterResult, DecisionAnalysis, DecisionResponse, DeleteSessionResponse, EchoInfo,
    EventOutcome, EventResponse, JudgmentInfo, NarrativeNotice, NewGameResponse, NextChapter,
    PowerDelta, SessionSnapshot, SetLensResponse, StartChapterResponse,
};

use crate::error::Result;
use crate::game::FinalAudit;
use async_trait::async_trait;

/// Stateless calls into the game server.
///
/// Every method maps to exactly one HTTP request. Implementations convert
/// non-success responses into `RegentError::Api` carrying the server's
/// `detail` message when one is present.
#[async_trait]
pub trait GameGateway: Send + Sync {
    /// Creates a new game session.
    async fn new_game(&self, request: NewGameRequest) -> Result<NewGameResponse>;

    /// Fixes the observation lens for a session.
    async fn set_lens(&self, request: SetLensRequest) -> Result<SetLensResponse>;

    /// Enters a chapter.
    async fn start_chapter(&self, request: StartChapterRequest) -> Result<StartChapterResponse>;

    /// Submits one decree for the current turn.
    async fn submit_decision(&self, request: DecisionRequest) -> Result<DecisionResponse>;

    /// Private side-channel conversation with one advisor.
    async fn private_audience(&self, request: AudienceRequest) -> Result<AudienceReply>;

    /// Answers a realm event raised by an earlier decree.
    async fn handle_event(&self, request: EventChoiceRequest) -> Result<EventResponse>;

    /// Reads the server's current view of a session.
    async fn get_state(&self, session_id: &str) -> Result<SessionSnapshot>;

    /// Reads the final audit of a finished session.
    async fn get_audit(&self, session_id: &str) -> Result<FinalAudit>;

    /// Deletes a session on the server.
    async fn delete_session(&self, session_id: &str) -> Result<DeleteSessionResponse>;
}
