//! Explicit save/load of session slices into a key-value store.

use super::state::SessionState;
use regent_core::config::{API_KEY_STORAGE_KEY, Credentials, MODEL_STORAGE_KEY};
use regent_core::error::Result;
use regent_core::game::GamePhase;
use regent_core::storage::KeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::sync::Arc;
use strum::{AsRefStr, Display};

/// One storage key per persisted slice. All of them are wiped on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum StorageKey {
    #[strum(serialize = "regent_session_id")]
    SessionId,
    #[strum(serialize = "regent_game_state")]
    GameState,
    #[strum(serialize = "regent_current_chapter")]
    CurrentChapter,
    #[strum(serialize = "regent_dialogue_history")]
    DialogueHistory,
    #[strum(serialize = "regent_chapters")]
    Chapters,
    #[strum(serialize = "regent_game_phase")]
    GamePhase,
    #[strum(serialize = "regent_selected_lens")]
    SelectedLens,
    #[strum(serialize = "regent_pending_consequences")]
    PendingConsequences,
    #[strum(serialize = "regent_intro")]
    Intro,
    #[strum(serialize = "regent_mountain_view")]
    MountainView,
    #[strum(serialize = "regent_chapter_notes")]
    ChapterNotes,
    #[strum(serialize = "regent_pending_event")]
    PendingEvent,
}

impl StorageKey {
    pub const ALL: [StorageKey; 12] = [
        StorageKey::SessionId,
        StorageKey::GameState,
        StorageKey::CurrentChapter,
        StorageKey::DialogueHistory,
        StorageKey::Chapters,
        StorageKey::GamePhase,
        StorageKey::SelectedLens,
        StorageKey::PendingConsequences,
        StorageKey::Intro,
        StorageKey::MountainView,
        StorageKey::ChapterNotes,
        StorageKey::PendingEvent,
    ];
}

/// Mirrors `SessionState` slices into durable storage.
///
/// Absent or empty slices are removed rather than written. Loading never
/// fails: a slice that is missing, unreadable or corrupt falls back to its
/// default.
#[derive(Clone)]
pub struct SessionPersistence {
    store: Arc<dyn KeyValueStore>,
}

impl SessionPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Writes every slice of `state`.
    ///
    /// Keeps going after a failed slice and returns the last error.
    pub async fn save(&self, state: &SessionState) -> Result<()> {
        let session_id = state.session_id.as_deref().filter(|id| !id.is_empty());
        let phase = (state.phase != GamePhase::Setup).then(|| state.phase.to_string());

        let results = [
            self.write_text(StorageKey::SessionId, session_id).await,
            self.write_json(StorageKey::GameState, state.game_state.as_ref()).await,
            self.write_json(StorageKey::CurrentChapter, state.current_chapter.as_ref()).await,
            self.write_json(StorageKey::DialogueHistory, non_empty(&state.dialogue)).await,
            self.write_json(StorageKey::Chapters, non_empty(&state.chapters)).await,
            self.write_text(StorageKey::GamePhase, phase.as_deref()).await,
            self.write_json(StorageKey::SelectedLens, state.selected_lens.as_ref()).await,
            self.write_json(
                StorageKey::PendingConsequences,
                non_empty(&state.pending_consequences),
            )
            .await,
            self.write_text(StorageKey::Intro, state.intro.as_deref()).await,
            self.write_text(StorageKey::MountainView, state.mountain_view.as_deref()).await,
            self.write_json(StorageKey::ChapterNotes, non_empty(&state.chapter_notes)).await,
            self.write_json(StorageKey::PendingEvent, state.pending_event.as_ref()).await,
        ];

        tracing::debug!(
            "[SessionPersistence] Saved session {:?} in phase {}",
            session_id,
            state.phase
        );

        results.into_iter().filter_map(|r| r.err()).last().map_or(Ok(()), Err)
    }

    /// Reads every slice independently.
    pub async fn load(&self) -> SessionState {
        let session_id = self
            .read_text(StorageKey::SessionId)
            .await
            .filter(|id| !id.is_empty());

        let mut phase = match self.read_text(StorageKey::GamePhase).await {
            Some(text) => GamePhase::from_str(&text).unwrap_or_else(|_| {
                tracing::warn!("[SessionPersistence] Unknown stored phase '{}', using setup", text);
                GamePhase::Setup
            }),
            None => GamePhase::Setup,
        };

        if phase.requires_session() && session_id.is_none() {
            tracing::warn!(
                "[SessionPersistence] Stored phase {} has no session id, demoting to setup",
                phase
            );
            phase = GamePhase::Setup;
        }

        SessionState {
            session_id,
            phase,
            game_state: self.read_json(StorageKey::GameState).await,
            current_chapter: self.read_json(StorageKey::CurrentChapter).await,
            dialogue: self.read_json(StorageKey::DialogueHistory).await.unwrap_or_default(),
            chapters: self.read_json(StorageKey::Chapters).await.unwrap_or_default(),
            selected_lens: self.read_json(StorageKey::SelectedLens).await,
            pending_consequences: self
                .read_json(StorageKey::PendingConsequences)
                .await
                .unwrap_or_default(),
            intro: self.read_text(StorageKey::Intro).await,
            mountain_view: self.read_text(StorageKey::MountainView).await,
            chapter_notes: self.read_json(StorageKey::ChapterNotes).await.unwrap_or_default(),
            pending_event: self.read_json(StorageKey::PendingEvent).await,
            ..SessionState::default()
        }
    }

    /// Removes every session slice. Credential keys are left alone.
    pub async fn wipe(&self) -> Result<()> {
        let keys: Vec<&str> = StorageKey::ALL.iter().map(|k| k.as_ref()).collect();
        self.store.remove_many(&keys).await?;
        tracing::debug!("[SessionPersistence] Wiped {} session keys", keys.len());
        Ok(())
    }

    /// Reads the permanent credential keys.
    ///
    /// Fields the store does not have come from `fallback`.
    pub async fn load_credentials(&self, fallback: Credentials) -> Credentials {
        let api_key = self
            .read_raw(API_KEY_STORAGE_KEY)
            .await
            .filter(|k| !k.is_empty())
            .unwrap_or(fallback.api_key);
        let model = self
            .read_raw(MODEL_STORAGE_KEY)
            .await
            .filter(|m| !m.is_empty())
            .or(fallback.model);

        Credentials { api_key, model }
    }

    pub async fn save_api_key(&self, api_key: &str) -> Result<()> {
        self.write_raw(API_KEY_STORAGE_KEY, Some(api_key)).await
    }

    pub async fn save_model(&self, model: Option<&str>) -> Result<()> {
        self.write_raw(MODEL_STORAGE_KEY, model).await
    }

    // ============================================================================
    // Slice helpers
    // ============================================================================

    async fn read_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("[SessionPersistence] Failed to read {}: {}", key, err);
                None
            }
        }
    }

    async fn write_raw(&self, key: &str, value: Option<&str>) -> Result<()> {
        match value.filter(|v| !v.is_empty()) {
            Some(value) => self.store.set(key, value.to_string()).await,
            None => self.store.remove(key).await,
        }
    }

    async fn read_text(&self, key: StorageKey) -> Option<String> {
        self.read_raw(key.as_ref()).await.filter(|v| !v.is_empty())
    }

    async fn write_text(&self, key: StorageKey, value: Option<&str>) -> Result<()> {
        self.write_raw(key.as_ref(), value).await
    }

    async fn read_json<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let text = self.read_text(key).await?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("[SessionPersistence] Discarding corrupt {}: {}", key, err);
                None
            }
        }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: StorageKey, value: Option<&T>) -> Result<()> {
        let text = value.map(serde_json::to_string).transpose()?;
        self.write_text(key, text.as_deref()).await
    }
}

fn non_empty<T>(items: &[T]) -> Option<&[T]> {
    (!items.is_empty()).then_some(items)
}
