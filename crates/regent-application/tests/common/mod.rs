#![allow(dead_code)]

use async_trait::async_trait;
use regent_application::{ControllerOptions, GameSessionController};
use regent_core::config::{Credentials, TranscriptVerbosity};
use regent_core::error::{RegentError, Result};
use regent_core::game::{ChapterInfo, ChapterStatus, FinalAudit, GameState};
use regent_core::gateway::{
    AudienceReply, AudienceRequest, DecisionRequest, DecisionResponse, DeleteSessionResponse,
    EventChoiceRequest, EventResponse, GameGateway, NewGameRequest, NewGameResponse,
    SessionSnapshot, SetLensRequest, SetLensResponse, StartChapterRequest, StartChapterResponse,
};
use regent_core::storage::KeyValueStore;
use regent_infrastructure::MemoryKeyValueStore;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Scripted gateway. Each method pops the next queued result; an empty
/// queue is an error so unexpected calls fail loudly.
#[derive(Default)]
pub struct MockGateway {
    pub new_game: Mutex<VecDeque<Result<NewGameResponse>>>,
    pub set_lens: Mutex<VecDeque<Result<SetLensResponse>>>,
    pub start_chapter: Mutex<VecDeque<Result<StartChapterResponse>>>,
    pub decisions: Mutex<VecDeque<Result<DecisionResponse>>>,
    pub audiences: Mutex<VecDeque<Result<AudienceReply>>>,
    pub events: Mutex<VecDeque<Result<EventResponse>>>,
    pub states: Mutex<VecDeque<Result<SessionSnapshot>>>,
    pub audits: Mutex<VecDeque<Result<FinalAudit>>>,
    pub deletes: Mutex<VecDeque<Result<DeleteSessionResponse>>>,

    pub decision_requests: Mutex<Vec<DecisionRequest>>,
    pub event_requests: Mutex<Vec<EventChoiceRequest>>,
    pub deleted_sessions: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
    /// When set, `submit_decision` waits for a notification before answering.
    pub decision_gate: Mutex<Option<Arc<Notify>>>,
}

fn next<T>(queue: &Mutex<VecDeque<Result<T>>>, name: &str) -> Result<T> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(RegentError::internal(format!("unexpected call: {}", name))))
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn push_new_game(&self, response: NewGameResponse) {
        self.new_game.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_chapter(&self, response: StartChapterResponse) {
        self.start_chapter.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_decision(&self, response: DecisionResponse) {
        self.decisions.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_decision_error(&self, err: RegentError) {
        self.decisions.lock().unwrap().push_back(Err(err));
    }

    pub fn push_event(&self, response: EventResponse) {
        self.events.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_state(&self, snapshot: SessionSnapshot) {
        self.states.lock().unwrap().push_back(Ok(snapshot));
    }
}

#[async_trait]
impl GameGateway for MockGateway {
    async fn new_game(&self, _request: NewGameRequest) -> Result<NewGameResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next(&self.new_game, "new_game")
    }

    async fn set_lens(&self, _request: SetLensRequest) -> Result<SetLensResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next(&self.set_lens, "set_lens")
    }

    async fn start_chapter(&self, _request: StartChapterRequest) -> Result<StartChapterResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next(&self.start_chapter, "start_chapter")
    }

    async fn submit_decision(&self, request: DecisionRequest) -> Result<DecisionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.decision_requests.lock().unwrap().push(request);

        let gate = self.decision_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        next(&self.decisions, "submit_decision")
    }

    async fn private_audience(&self, _request: AudienceRequest) -> Result<AudienceReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next(&self.audiences, "private_audience")
    }

    async fn handle_event(&self, request: EventChoiceRequest) -> Result<EventResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.event_requests.lock().unwrap().push(request);
        next(&self.events, "handle_event")
    }

    async fn get_state(&self, _session_id: &str) -> Result<SessionSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next(&self.states, "get_state")
    }

    async fn get_audit(&self, _session_id: &str) -> Result<FinalAudit> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next(&self.audits, "get_audit")
    }

    async fn delete_session(&self, session_id: &str) -> Result<DeleteSessionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.deleted_sessions.lock().unwrap().push(session_id.to_string());
        next(&self.deletes, "delete_session")
    }
}

pub fn options(transcript: TranscriptVerbosity) -> ControllerOptions {
    ControllerOptions {
        transcript,
        skip_intro: false,
        fallback_credentials: Credentials::default(),
    }
}

pub fn state_with_turn(turn: u32) -> GameState {
    GameState {
        turn,
        credit_score: 100.0,
        ..Default::default()
    }
}

pub fn chapter_info(id: &str, status: ChapterStatus) -> ChapterInfo {
    ChapterInfo {
        id: id.into(),
        name: id.into(),
        subtitle: None,
        complexity: 1,
        status,
    }
}

pub fn new_game_response(session_id: &str, requires_lens: bool) -> NewGameResponse {
    NewGameResponse {
        session_id: session_id.into(),
        intro: "The old prince is dead.".into(),
        state: Some(state_with_turn(0)),
        chapters: vec![
            chapter_info("chapter_1", ChapterStatus::Available),
            chapter_info("chapter_2", ChapterStatus::Locked),
        ],
        requires_lens_selection: requires_lens,
        ..Default::default()
    }
}

pub fn chapter_response(id: &str) -> StartChapterResponse {
    serde_json::from_value(serde_json::json!({
        "chapter": {"id": id, "name": "Ashes", "complexity": 2, "max_turns": 5},
        "dilemma": "The granary burns.",
        "opening_narration": "Smoke rises over the capital.",
        "council_debate": {
            "lion": {"suggestion": "Hang the arsonists", "reasoning": "Fear is order"},
            "fox": {"suggestion": "Blame the guild", "reasoning": "Cheap"},
            "balance": {"suggestion": "Open the reserves", "reasoning": "Bread first"}
        },
        "state": {"turn": 0, "credit_score": 100.0}
    }))
    .unwrap()
}

/// A controller with an API key, backed by `store`.
pub async fn controller_with(
    gateway: Arc<MockGateway>,
    store: Arc<dyn KeyValueStore>,
    transcript: TranscriptVerbosity,
) -> GameSessionController {
    let controller = GameSessionController::load(gateway, store, options(transcript)).await;
    controller.set_api_key("sk-test").await;
    controller
}

/// A controller already playing `chapter_1` of session `s-1`.
pub async fn playing_controller(
    transcript: TranscriptVerbosity,
) -> (GameSessionController, Arc<MockGateway>, Arc<MemoryKeyValueStore>) {
    let gateway = MockGateway::new();
    let store = Arc::new(MemoryKeyValueStore::new());
    let controller = controller_with(gateway.clone(), store.clone(), transcript).await;

    gateway.push_new_game(new_game_response("s-1", false));
    assert!(controller.start_new_game().await);
    gateway.push_chapter(chapter_response("chapter_1"));
    assert!(controller.start_chapter("chapter_1").await);

    (controller, gateway, store)
}
