//! Game session controller.
//!
//! The single owner of client-side game state. Each operation checks its
//! preconditions locally, makes at most one gateway call, folds the response
//! into [`SessionState`], publishes a [`SessionView`] and writes the state
//! through to storage. Failures never escape: they land in the error slot.

use super::persistence::SessionPersistence;
use super::state::{SessionState, SessionView};
use super::transcript;
use regent_core::config::{Credentials, TranscriptVerbosity};
use regent_core::error::{RegentError, Result};
use regent_core::game::{
    Advisor, ChapterInfo, ChapterStatus, DecreeConsequence, GamePhase, PendingConsequence,
};
use regent_core::gateway::{
    AudienceReply, AudienceRequest, DecisionRequest, DecisionResponse, EventChoiceRequest,
    EventResponse, GameGateway, NewGameRequest, SetLensRequest, StartChapterRequest,
};
use regent_core::storage::KeyValueStore;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Construction-time settings.
#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    pub transcript: TranscriptVerbosity,
    /// Sent with every new-game request.
    pub skip_intro: bool,
    /// Used for credential fields the store does not have.
    pub fallback_credentials: Credentials,
}

struct Inner {
    session: SessionState,
    credentials: Credentials,
    in_flight: usize,
    error: Option<String>,
    /// Cancelled whenever the session is reset; responses from an older
    /// epoch are dropped.
    epoch: CancellationToken,
}

impl Inner {
    fn view(&self) -> SessionView {
        SessionView {
            session: self.session.clone(),
            is_loading: self.in_flight > 0,
            error: self.error.clone(),
            has_api_key: self.credentials.has_key(),
            model: self.credentials.model.clone(),
        }
    }

    fn rotate_epoch(&mut self) {
        self.epoch.cancel();
        self.epoch = CancellationToken::new();
    }

    fn require_key(&self) -> Result<Credentials> {
        if self.credentials.has_key() {
            Ok(self.credentials.clone())
        } else {
            Err(RegentError::precondition("Please set your API key first"))
        }
    }

    fn require_session(&self) -> Result<String> {
        self.session
            .session_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RegentError::precondition("No active game. Start a new game first"))
    }

    fn require_phase(&self, expected: GamePhase, action: &str) -> Result<()> {
        if self.session.phase == expected {
            Ok(())
        } else {
            Err(RegentError::precondition(format!(
                "Cannot {} during the {} phase",
                action, self.session.phase
            )))
        }
    }
}

/// One network-backed operation in progress.
struct Flight<'a, C> {
    ctx: C,
    token: CancellationToken,
    _loading: LoadingGuard<'a>,
}

/// Clears the loading flag when the operation finishes, however it finishes.
struct LoadingGuard<'a>(&'a GameSessionController);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.0.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        self.0.publish(&inner);
    }
}

/// Client-side controller for one player's game.
///
/// Constructed with its collaborators injected; presentation layers observe
/// it through [`GameSessionController::subscribe`].
///
/// `is_loading` is true while any operation is in flight. The controller
/// does not reject overlapping calls; callers gate on the flag.
pub struct GameSessionController {
    gateway: Arc<dyn GameGateway>,
    persistence: SessionPersistence,
    options: ControllerOptions,
    inner: Mutex<Inner>,
    /// Serializes write-through so the last save always reflects the latest state.
    save_lock: tokio::sync::Mutex<()>,
    view_tx: watch::Sender<SessionView>,
}

impl GameSessionController {
    /// Creates a controller, restoring any persisted session from `store`.
    ///
    /// Storage is only read here. Corrupt or missing slices fall back to
    /// their defaults; a stored phase without a session id becomes `Setup`.
    pub async fn load(
        gateway: Arc<dyn GameGateway>,
        store: Arc<dyn KeyValueStore>,
        options: ControllerOptions,
    ) -> Self {
        let persistence = SessionPersistence::new(store);
        let session = persistence.load().await;
        let credentials = persistence
            .load_credentials(options.fallback_credentials.clone())
            .await;

        tracing::info!(
            "[GameSessionController] Restored phase {} (session: {:?})",
            session.phase,
            session.session_id
        );

        let inner = Inner {
            session,
            credentials,
            in_flight: 0,
            error: None,
            epoch: CancellationToken::new(),
        };
        let (view_tx, _) = watch::channel(inner.view());

        Self {
            gateway,
            persistence,
            options,
            inner: Mutex::new(inner),
            save_lock: tokio::sync::Mutex::new(()),
            view_tx,
        }
    }

    // ============================================================================
    // Observation
    // ============================================================================

    /// Receives a fresh [`SessionView`] after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_tx.subscribe()
    }

    pub fn view(&self) -> SessionView {
        self.lock().view()
    }

    pub fn phase(&self) -> GamePhase {
        self.lock().session.phase
    }

    pub fn session_id(&self) -> Option<String> {
        self.lock().session.session_id.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    pub fn credentials(&self) -> Credentials {
        self.lock().credentials.clone()
    }

    pub fn transcript_verbosity(&self) -> TranscriptVerbosity {
        self.options.transcript
    }

    // ============================================================================
    // Configuration
    // ============================================================================

    /// Stores the API key under its permanent key.
    pub async fn set_api_key(&self, api_key: &str) {
        let api_key = api_key.trim().to_string();
        {
            let mut inner = self.lock();
            inner.credentials.api_key = api_key.clone();
            self.publish(&inner);
        }

        if let Err(err) = self.persistence.save_api_key(&api_key).await {
            tracing::warn!("[GameSessionController] Failed to store API key: {}", err);
        }
    }

    /// Stores the model name. A blank name clears it.
    pub async fn set_model(&self, model: &str) {
        let model = Some(model.trim().to_string()).filter(|m| !m.is_empty());
        {
            let mut inner = self.lock();
            inner.credentials.model = model.clone();
            self.publish(&inner);
        }

        if let Err(err) = self.persistence.save_model(model.as_deref()).await {
            tracing::warn!("[GameSessionController] Failed to store model: {}", err);
        }
    }

    pub fn clear_error(&self) {
        let mut inner = self.lock();
        inner.error = None;
        self.publish(&inner);
    }

    // ============================================================================
    // Session lifecycle
    // ============================================================================

    /// Starts a new game, replacing any current one.
    ///
    /// Fails fast without a network call when no API key is set. Requests
    /// still in flight for the previous session are cancelled. A response
    /// without a session id is an error and leaves the old session alone,
    /// apart from those cancelled requests. On success
    /// every persisted slice of the previous session is wiped before the new
    /// session is written, and the phase becomes `LensSelection` or
    /// `ChapterSelect` depending on the server.
    ///
    /// Returns `true` when the new session was established.
    pub async fn start_new_game(&self) -> bool {
        const OP: &str = "start_new_game";

        let Some(flight) = self.begin(OP, |inner| {
            let credentials = inner.require_key()?;
            inner.rotate_epoch();
            Ok(credentials)
        }) else {
            return false;
        };

        let request = NewGameRequest {
            api_key: flight.ctx.api_key.clone(),
            model: flight.ctx.model.clone(),
            skip_intro: self.options.skip_intro,
        };

        let response = match Self::call(&flight.token, self.gateway.new_game(request)).await {
            Ok(response) if response.session_id.trim().is_empty() => {
                let err = RegentError::api(None, "The server did not return a session id");
                self.fail(OP, &flight.token, err);
                return false;
            }
            Ok(response) => response,
            Err(err) => {
                self.fail(OP, &flight.token, err);
                return false;
            }
        };

        let _save = self.save_lock.lock().await;
        if flight.token.is_cancelled() {
            tracing::debug!("[GameSessionController] {} superseded before commit", OP);
            return false;
        }

        if let Err(err) = self.persistence.wipe().await {
            tracing::warn!("[GameSessionController] Failed to wipe previous session: {}", err);
        }

        let committed = self.commit(OP, &flight.token, |session| {
            let phase = if response.requires_lens_selection {
                GamePhase::LensSelection
            } else {
                GamePhase::ChapterSelect
            };

            *session = SessionState {
                session_id: Some(response.session_id),
                phase,
                game_state: response.state,
                chapters: response.chapters,
                lens_choices: response.lens_choices,
                intro: Some(response.intro).filter(|intro| !intro.is_empty()),
                initialization_scene: response.initialization_scene,
                ..SessionState::default()
            };

            tracing::info!(
                "[GameSessionController] New session {:?}, phase {}",
                session.session_id,
                session.phase
            );
        });

        if committed.is_some() {
            self.save_snapshot().await;
        }
        committed.is_some()
    }

    /// Full teardown back to `Setup`.
    ///
    /// Cancels in-flight requests, clears all game state and the error slot,
    /// and removes every persisted session slice. Credentials are kept.
    pub async fn exit_to_setup(&self) {
        let _save = self.save_lock.lock().await;
        {
            let mut inner = self.lock();
            inner.rotate_epoch();
            inner.session = SessionState::default();
            inner.error = None;
            self.publish(&inner);
        }

        if let Err(err) = self.persistence.wipe().await {
            tracing::warn!("[GameSessionController] Failed to wipe session storage: {}", err);
        }

        tracing::info!("[GameSessionController] Exited to setup");
    }

    /// Asks the server to delete the session, then exits to setup whatever
    /// the outcome of the delete.
    pub async fn abandon_session(&self) {
        const OP: &str = "abandon_session";

        let session_id = self.lock().session.session_id.clone();
        if let Some(session_id) = session_id {
            if let Some(flight) = self.begin(OP, |_| Ok(())) {
                match Self::call(&flight.token, self.gateway.delete_session(&session_id)).await {
                    Ok(response) => tracing::info!(
                        "[GameSessionController] Deleted session {}: {}",
                        session_id,
                        response.message
                    ),
                    Err(err) => tracing::warn!(
                        "[GameSessionController] Delete of session {} failed, exiting anyway: {}",
                        session_id,
                        err
                    ),
                }
            }
        }

        self.exit_to_setup().await;
    }

    /// Re-reads the authoritative game state for a restored session.
    ///
    /// Never changes phase. An empty local transcript is refilled from the
    /// server's history, and a held event the server no longer lists as
    /// pending is dropped. Returns `true` when the state was refreshed.
    pub async fn resume_session(&self) -> bool {
        const OP: &str = "resume_session";

        let Some(flight) = self.begin(OP, |inner| inner.require_session()) else {
            return false;
        };

        let snapshot = match Self::call(&flight.token, self.gateway.get_state(&flight.ctx)).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.fail(OP, &flight.token, err);
                return false;
            }
        };

        let committed = self.commit(OP, &flight.token, |session| {
            if let Some(state) = snapshot.state {
                session.apply_authoritative_state(state);
            }

            if session.dialogue.is_empty() && !snapshot.history.is_empty() {
                tracing::debug!(
                    "[GameSessionController] Restored {} transcript lines from the server",
                    snapshot.history.len()
                );
                session.dialogue = snapshot.history;
            }

            let stale = session
                .pending_event
                .as_ref()
                .is_some_and(|event| !snapshot.pending_events.contains(&event.id));
            if stale {
                tracing::debug!("[GameSessionController] Dropped event no longer pending");
                session.pending_event = None;
            }
        });

        self.write_through_if(committed.is_some()).await
    }

    /// Fetches the final audit and ends the playthrough.
    pub async fn load_final_audit(&self) -> bool {
        const OP: &str = "load_final_audit";

        let Some(flight) = self.begin(OP, |inner| inner.require_session()) else {
            return false;
        };

        let audit = match Self::call(&flight.token, self.gateway.get_audit(&flight.ctx)).await {
            Ok(audit) => audit,
            Err(err) => {
                self.fail(OP, &flight.token, err);
                return false;
            }
        };

        let committed = self.commit(OP, &flight.token, |session| {
            session.final_audit = Some(audit);
            session.phase = GamePhase::Ended;
        });

        self.write_through_if(committed.is_some()).await
    }

    // ============================================================================
    // Play
    // ============================================================================

    /// Fixes the observation lens for this session and moves to chapter
    /// selection. There is no way to change it afterwards.
    pub async fn select_observation_lens(&self, lens: &str) -> bool {
        const OP: &str = "select_observation_lens";

        let Some(flight) = self.begin(OP, |inner| {
            let session_id = inner.require_session()?;
            inner.require_phase(GamePhase::LensSelection, "choose a lens")?;
            let choice = inner.session.lens_choices.get(lens).cloned();
            Ok((session_id, choice))
        }) else {
            return false;
        };

        let (session_id, choice) = flight.ctx;
        let request = SetLensRequest {
            session_id,
            lens: lens.to_string(),
        };

        let response = match Self::call(&flight.token, self.gateway.set_lens(request)).await {
            Ok(response) => response,
            Err(err) => {
                self.fail(OP, &flight.token, err);
                return false;
            }
        };

        let committed = self.commit(OP, &flight.token, |session| {
            let mut selected = response.selected_lens;
            if selected.key.is_empty() {
                selected.key = lens.to_string();
            }

            session.dialogue.push(transcript::lens_selected(
                &selected,
                choice.as_ref(),
                &response.message,
            ));
            session.mountain_view = response.mountain_view.filter(|v| !v.is_empty());
            session.selected_lens = Some(selected);
            session.phase = GamePhase::ChapterSelect;
        });

        self.write_through_if(committed.is_some()).await
    }

    /// Enters a chapter from the chapter list.
    ///
    /// Replaces the active scene, restarts the transcript with the opening
    /// narration and council debate, and moves to `Playing`.
    pub async fn start_chapter(&self, chapter_id: &str) -> bool {
        const OP: &str = "start_chapter";

        let Some(flight) = self.begin(OP, |inner| {
            let credentials = inner.require_key()?;
            let session_id = inner.require_session()?;
            inner.require_phase(GamePhase::ChapterSelect, "start a chapter")?;

            let locked = inner
                .session
                .chapters
                .iter()
                .any(|c| c.id == chapter_id && !c.status.is_playable());
            if locked {
                return Err(RegentError::precondition(format!(
                    "Chapter {} is not available",
                    chapter_id
                )));
            }

            Ok((credentials, session_id))
        }) else {
            return false;
        };

        let (credentials, session_id) = flight.ctx;
        let request = StartChapterRequest {
            session_id,
            chapter_id: chapter_id.to_string(),
            api_key: credentials.api_key,
            model: credentials.model,
        };

        let response = match Self::call(&flight.token, self.gateway.start_chapter(request)).await {
            Ok(response) => response,
            Err(err) => {
                self.fail(OP, &flight.token, err);
                return false;
            }
        };

        let committed = self.commit(OP, &flight.token, |session| {
            let (mut scene, state) = response.into_scene();
            if scene.id.is_empty() {
                scene.id = chapter_id.to_string();
            }

            if let Some(state) = state {
                session.apply_authoritative_state(state);
            }
            set_chapter_status(&mut session.chapters, &scene.id, ChapterStatus::Active);

            session.dialogue = transcript::chapter_opening(&scene);
            session.chapter_notes.clear();
            session.last_decision = None;
            tracing::debug!(
                "[GameSessionController] Entered chapter {} ({} turns)",
                scene.id,
                scene.max_turns
            );
            session.current_chapter = Some(scene);
            session.phase = GamePhase::Playing;
        });

        self.write_through_if(committed.is_some()).await
    }

    /// Submits one decree for the current turn.
    ///
    /// Appends the decree and the advisors' replies to the transcript as one
    /// batch, replaces the game state only when the response carries one,
    /// and handles chapter end and the final audit. The phase stays
    /// `Playing` after a chapter ends; only a final audit moves it to
    /// `Ended`.
    ///
    /// Returns the full server response, or `None` when a precondition or
    /// the call failed (see the error slot).
    pub async fn submit_decision(
        &self,
        input: &str,
        followed_advisor: Option<Advisor>,
    ) -> Option<DecisionResponse> {
        const OP: &str = "submit_decision";

        let input = input.trim().to_string();
        let flight = self.begin(OP, |inner| {
            let credentials = inner.require_key()?;
            let session_id = inner.require_session()?;
            inner.require_phase(GamePhase::Playing, "issue a decree")?;
            if input.is_empty() {
                return Err(RegentError::precondition("A decree cannot be empty"));
            }
            Ok((credentials, session_id, inner.session.pending_consequences.clone()))
        })?;

        let (credentials, session_id, pending_consequences) = flight.ctx;
        let request = DecisionRequest {
            session_id,
            input: input.clone(),
            followed_advisor,
            api_key: credentials.api_key,
            model: credentials.model,
            pending_consequences,
        };

        let response = match Self::call(&flight.token, self.gateway.submit_decision(request)).await
        {
            Ok(response) => response,
            Err(err) => {
                self.fail(OP, &flight.token, err);
                return None;
            }
        };

        let verbosity = self.options.transcript;
        let committed = self.commit(OP, &flight.token, |session| {
            fold_decision(session, &input, &response, verbosity);
        });

        if self.write_through_if(committed.is_some()).await {
            Some(response)
        } else {
            None
        }
    }

    /// Private conversation with one advisor.
    ///
    /// Nothing is added to the main transcript; the caller keeps its own
    /// message list. The addressed advisor's trust is patched optimistically
    /// until the next authoritative snapshot replaces it.
    pub async fn private_audience(&self, advisor: Advisor, message: &str) -> Option<AudienceReply> {
        const OP: &str = "private_audience";

        let message = message.trim().to_string();
        let flight = self.begin(OP, |inner| {
            let credentials = inner.require_key()?;
            let session_id = inner.require_session()?;
            if message.is_empty() {
                return Err(RegentError::precondition("Say something to your advisor"));
            }
            Ok((credentials, session_id))
        })?;

        let (credentials, session_id) = flight.ctx;
        let request = AudienceRequest {
            session_id,
            advisor,
            message,
            api_key: credentials.api_key,
            model: credentials.model,
        };

        let reply = match Self::call(&flight.token, self.gateway.private_audience(request)).await {
            Ok(reply) => reply,
            Err(err) => {
                self.fail(OP, &flight.token, err);
                return None;
            }
        };

        let committed = self.commit(OP, &flight.token, |session| {
            session.apply_optimistic_trust(advisor, reply.trust_change, reply.new_trust);
        });

        if self.write_through_if(committed.is_some()).await {
            Some(reply)
        } else {
            None
        }
    }

    /// Answers the held realm event with one of its choices.
    ///
    /// Requires a session and a held event. The server's state replaces the
    /// local one and the event is cleared. Returns the server's answer.
    pub async fn handle_event_choice(&self, choice_id: &str) -> Option<EventResponse> {
        const OP: &str = "handle_event_choice";

        let choice_id = choice_id.trim().to_string();
        let flight = self.begin(OP, |inner| {
            let credentials = inner.require_key()?;
            let session_id = inner.require_session()?;
            let event = inner
                .session
                .pending_event
                .clone()
                .ok_or_else(|| RegentError::precondition("There is no event to answer"))?;
            if choice_id.is_empty() {
                return Err(RegentError::precondition("Pick one of the event's choices"));
            }
            Ok((credentials, session_id, event.id))
        })?;

        let (credentials, session_id, event_id) = flight.ctx;
        let request = EventChoiceRequest {
            session_id,
            event_id: event_id.clone(),
            choice_id,
            api_key: credentials.api_key,
            model: credentials.model,
        };

        let response = match Self::call(&flight.token, self.gateway.handle_event(request)).await {
            Ok(response) => response,
            Err(err) => {
                self.fail(OP, &flight.token, err);
                return None;
            }
        };

        let committed = self.commit(OP, &flight.token, |session| {
            if let Some(state) = &response.state {
                session.apply_authoritative_state(state.clone());
            }

            let turn = session.game_state.as_ref().map_or(0, |state| state.turn);
            session
                .dialogue
                .extend(transcript::event_resolved(turn, &response.result));

            if session.pending_event.as_ref().is_some_and(|e| e.id == event_id) {
                session.pending_event = None;
            }
            tracing::info!(
                "[GameSessionController] Event {} answered (game over: {})",
                event_id,
                response.result.game_over
            );
        });

        if self.write_through_if(committed.is_some()).await {
            Some(response)
        } else {
            None
        }
    }

    /// Leaves the active chapter for the chapter list.
    pub async fn back_to_chapter_select(&self) -> bool {
        self.leave_chapter("back_to_chapter_select").await
    }

    /// Same transition as [`Self::back_to_chapter_select`], used after a
    /// chapter has ended.
    pub async fn go_to_next_chapter(&self) -> bool {
        self.leave_chapter("go_to_next_chapter").await
    }

    /// Defers this chapter's decree consequences past the chapter boundary.
    ///
    /// Each one is stamped with the current chapter id and turn. No network
    /// call; the server sees them with the next decision.
    pub async fn skip_consequences(&self, consequences: Vec<DecreeConsequence>) -> bool {
        if consequences.is_empty() {
            return true;
        }

        {
            let mut inner = self.lock();
            let stamp = match &inner.session.current_chapter {
                Some(scene) => Some((scene.id.clone(), scene.current_turn)),
                None => inner.session.game_state.as_ref().and_then(|state| {
                    state
                        .current_chapter
                        .clone()
                        .map(|chapter| (chapter, state.turn))
                }),
            };

            let Some((chapter_id, turn)) = stamp else {
                inner.error = Some(
                    RegentError::precondition("No chapter to defer consequences from")
                        .user_message(),
                );
                self.publish(&inner);
                return false;
            };

            let count = consequences.len();
            inner.session.pending_consequences.extend(
                consequences
                    .into_iter()
                    .map(|c| PendingConsequence::deferred(chapter_id.clone(), turn, c)),
            );
            tracing::debug!(
                "[GameSessionController] Deferred {} consequences from {} turn {}",
                count,
                chapter_id,
                turn
            );
            self.publish(&inner);
        }

        self.write_through().await;
        true
    }

    // ============================================================================
    // Internals
    // ============================================================================

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.view_tx.send_replace(inner.view());
    }

    /// Runs the precondition check and, if it passes, marks an operation
    /// in flight under the current epoch.
    fn begin<C>(
        &self,
        op: &str,
        check: impl FnOnce(&mut Inner) -> Result<C>,
    ) -> Option<Flight<'_, C>> {
        let mut inner = self.lock();
        match check(&mut inner) {
            Ok(ctx) => {
                inner.in_flight += 1;
                inner.error = None;
                let token = inner.epoch.clone();
                self.publish(&inner);
                drop(inner);

                tracing::debug!("[GameSessionController] {} started", op);
                Some(Flight {
                    ctx,
                    token,
                    _loading: LoadingGuard(self),
                })
            }
            Err(err) => {
                tracing::warn!("[GameSessionController] {} rejected: {}", op, err);
                inner.error = Some(err.user_message());
                self.publish(&inner);
                None
            }
        }
    }

    async fn call<T>(
        token: &CancellationToken,
        request: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(RegentError::Cancelled),
            result = request => result,
        }
    }

    fn fail(&self, op: &str, token: &CancellationToken, err: RegentError) {
        if err.is_cancelled() || token.is_cancelled() {
            tracing::debug!("[GameSessionController] {} dropped after session reset", op);
            return;
        }

        tracing::warn!("[GameSessionController] {} failed: {}", op, err);
        let mut inner = self.lock();
        inner.error = Some(err.user_message());
        self.publish(&inner);
    }

    /// Applies `f` unless the epoch was cancelled since the operation began.
    fn commit<R>(
        &self,
        op: &str,
        token: &CancellationToken,
        f: impl FnOnce(&mut SessionState) -> R,
    ) -> Option<R> {
        let mut inner = self.lock();
        if token.is_cancelled() {
            tracing::debug!("[GameSessionController] {} response is stale, dropped", op);
            return None;
        }

        let out = f(&mut inner.session);
        self.publish(&inner);
        Some(out)
    }

    async fn write_through(&self) {
        let _save = self.save_lock.lock().await;
        self.save_snapshot().await;
    }

    async fn write_through_if(&self, committed: bool) -> bool {
        if committed {
            self.write_through().await;
        }
        committed
    }

    /// Saves the current state. Callers hold `save_lock`.
    async fn save_snapshot(&self) {
        let snapshot = self.lock().session.clone();
        if let Err(err) = self.persistence.save(&snapshot).await {
            tracing::warn!("[GameSessionController] Write-through failed: {}", err);
        }
    }

    async fn leave_chapter(&self, op: &str) -> bool {
        {
            let mut inner = self.lock();
            if inner.session.phase != GamePhase::Playing {
                tracing::debug!(
                    "[GameSessionController] {} ignored in phase {}",
                    op,
                    inner.session.phase
                );
                return false;
            }

            let session = &mut inner.session;
            if let Some(scene) = session.current_chapter.take() {
                let still_active = session
                    .chapters
                    .iter()
                    .any(|c| c.id == scene.id && c.status == ChapterStatus::Active);
                if still_active {
                    set_chapter_status(&mut session.chapters, &scene.id, ChapterStatus::Available);
                }
            }
            session.dialogue.clear();
            session.chapter_notes.clear();
            session.last_decision = None;
            session.phase = GamePhase::ChapterSelect;

            tracing::debug!("[GameSessionController] {} -> chapter_select", op);
            self.publish(&inner);
        }

        self.write_through().await;
        true
    }
}

/// Folds one decision response into the session.
fn fold_decision(
    session: &mut SessionState,
    input: &str,
    response: &DecisionResponse,
    verbosity: TranscriptVerbosity,
) {
    let mut batch = transcript::decision_batch(input, response);

    let notes = transcript::decision_notes(response);
    match verbosity {
        TranscriptVerbosity::Verbose => {
            batch.extend(transcript::note_entries(response.turn, &notes));
        }
        TranscriptVerbosity::Quiet => session.chapter_notes.extend(notes),
    }

    if let Some(state) = &response.state {
        session.apply_authoritative_state(state.clone());
    }

    let turn = response
        .chapter_result
        .as_ref()
        .and_then(|result| result.current_turn)
        .unwrap_or(response.turn);
    if let Some(scene) = session.current_chapter.as_mut() {
        scene.current_turn = turn;
    }

    if let Some(pending) = &response.pending_consequences {
        session.pending_consequences = pending.clone();
    }

    let ended = response
        .chapter_result
        .as_ref()
        .filter(|result| result.chapter_ended);

    if ended.is_some() || response.final_audit.is_some() {
        let held = std::mem::take(&mut session.chapter_notes);
        batch.extend(transcript::note_entries(response.turn, &held));
    }

    if let Some(result) = ended {
        batch.push(transcript::chapter_end(response.turn, result));

        // A defeat that still opens the next chapter counts as completed.
        if let Some(scene) = &session.current_chapter {
            let status = if result.victory || response.next_chapter_available.is_some() {
                ChapterStatus::Completed
            } else {
                ChapterStatus::Failed
            };
            set_chapter_status(&mut session.chapters, &scene.id, status);
        }

        if let Some(next) = &response.next_chapter_available {
            upsert_available(&mut session.chapters, next.id.clone(), next.name.clone(), next.subtitle.clone());
        }

        tracing::info!(
            "[GameSessionController] Chapter ended (victory: {}, next: {:?})",
            result.victory,
            response.next_chapter_available.as_ref().map(|n| &n.id)
        );
    }

    if let Some(event) = &response.event {
        batch.push(transcript::event_raised(response.turn, event));
        tracing::info!("[GameSessionController] Event raised: {}", event.id);
        session.pending_event = Some(event.clone());
    }

    session.dialogue.extend(batch);

    if let Some(audit) = &response.final_audit {
        session.final_audit = Some(audit.clone());
        session.phase = GamePhase::Ended;
        tracing::info!(
            "[GameSessionController] Final audit received: {}",
            audit.reputation
        );
    }

    session.last_decision = Some(response.clone());
}

fn set_chapter_status(chapters: &mut [ChapterInfo], chapter_id: &str, status: ChapterStatus) {
    if let Some(chapter) = chapters.iter_mut().find(|c| c.id == chapter_id) {
        chapter.status = status;
    }
}

/// Marks a chapter available, adding it to the list if it is new.
/// A completed chapter keeps its status.
fn upsert_available(chapters: &mut Vec<ChapterInfo>, id: String, name: String, subtitle: Option<String>) {
    match chapters.iter_mut().find(|c| c.id == id) {
        Some(chapter) if chapter.status == ChapterStatus::Completed => {}
        Some(chapter) => chapter.status = ChapterStatus::Available,
        None => chapters.push(ChapterInfo {
            id,
            name,
            subtitle,
            complexity: 0,
            status: ChapterStatus::Available,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(id: &str, status: ChapterStatus) -> ChapterInfo {
        ChapterInfo {
            id: id.into(),
            name: id.into(),
            subtitle: None,
            complexity: 1,
            status,
        }
    }

    #[test]
    fn test_upsert_available_adds_or_unlocks() {
        let mut chapters = vec![
            chapter("chapter_1", ChapterStatus::Completed),
            chapter("chapter_2", ChapterStatus::Locked),
        ];

        upsert_available(&mut chapters, "chapter_2".into(), "X".into(), None);
        upsert_available(&mut chapters, "chapter_3".into(), "Y".into(), None);
        upsert_available(&mut chapters, "chapter_1".into(), "Z".into(), None);

        assert_eq!(chapters[0].status, ChapterStatus::Completed);
        assert_eq!(chapters[1].status, ChapterStatus::Available);
        assert_eq!(chapters[2].id, "chapter_3");
        assert_eq!(chapters[2].status, ChapterStatus::Available);
    }

    #[test]
    fn test_quiet_notes_flush_at_chapter_end() {
        use regent_core::gateway::{ChapterResult, JudgmentInfo};

        let mut session = SessionState {
            phase: GamePhase::Playing,
            current_chapter: Some(regent_core::game::ChapterScene {
                id: "chapter_1".into(),
                ..Default::default()
            }),
            chapters: vec![chapter("chapter_1", ChapterStatus::Active)],
            ..Default::default()
        };

        let turn_one = DecisionResponse {
            turn: 1,
            judgment: Some(JudgmentInfo {
                player_strategy: "Patience".into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        fold_decision(&mut session, "Wait", &turn_one, TranscriptVerbosity::Quiet);
        assert_eq!(session.dialogue.len(), 1);
        assert_eq!(session.chapter_notes, vec!["Judgment: Patience".to_string()]);

        let turn_two = DecisionResponse {
            turn: 2,
            chapter_result: Some(ChapterResult {
                chapter_ended: true,
                victory: false,
                message: None,
                current_turn: None,
            }),
            ..Default::default()
        };
        fold_decision(&mut session, "Attack", &turn_two, TranscriptVerbosity::Quiet);

        let tail: Vec<&str> = session.dialogue[2..].iter().map(|e| e.content.as_str()).collect();
        assert_eq!(tail, vec!["Judgment: Patience", "Chapter lost."]);
        assert!(session.chapter_notes.is_empty());
        assert_eq!(session.chapters[0].status, ChapterStatus::Failed);
        assert_eq!(session.phase, GamePhase::Playing);
    }

    #[test]
    fn test_verbose_notes_follow_advisors_in_same_turn() {
        let mut session = SessionState::default();
        let response = DecisionResponse {
            turn: 4,
            warnings: vec!["Fear rises".into()],
            ..Default::default()
        };

        fold_decision(&mut session, "Hang the thief", &response, TranscriptVerbosity::Verbose);

        assert_eq!(session.dialogue.len(), 2);
        assert_eq!(session.dialogue[1].content, "Warning: Fear rises");
        assert!(session.chapter_notes.is_empty());
    }
}
