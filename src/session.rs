//! Conversation session state
//!
//! A session owns exactly one current turn, the synthesis availability
//! flag, and the registry of audio artifacts created during its lifetime.
//! Nothing here is shared across sessions.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::artifacts::{ArtifactHandle, ArtifactStore};

/// How the user's input entered the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Recorded live speech
    Spoken,
    /// Uploaded audio file
    Uploaded,
    /// Typed text
    Typed,
}

/// One complete input → output conversation exchange
#[derive(Debug, Clone)]
pub struct Turn {
    /// What the user said or typed (transcribed for audio modalities)
    pub input_text: String,
    /// The assistant's reply, or a descriptive placeholder when the
    /// completion call failed
    pub output_text: String,
    /// Synthesized speech for the reply, when synthesis ran and succeeded
    pub audio: Option<ArtifactHandle>,
    pub modality: Modality,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// A turn is displayable when both sides of the exchange are present
    #[must_use]
    pub fn is_displayable(&self) -> bool {
        !self.input_text.is_empty() && !self.output_text.is_empty()
    }
}

/// Whether speech synthesis may be attempted for a session
///
/// Flips to `Unavailable` when a synthesis call is rate-limited and stays
/// there until an explicit clear. It never recovers on its own, even if a
/// later call might succeed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsAvailability {
    #[default]
    Available,
    Unavailable,
}

impl TtsAvailability {
    /// True if synthesis may be attempted
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Per-session conversation state
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    turn: Option<Turn>,
    tts: TtsAvailability,
    artifacts: Vec<ArtifactHandle>,
}

impl Session {
    /// Create an empty session with synthesis available
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            turn: None,
            tts: TtsAvailability::Available,
            artifacts: Vec::new(),
        }
    }

    /// The current turn, if one has completed
    #[must_use]
    pub const fn turn(&self) -> Option<&Turn> {
        self.turn.as_ref()
    }

    /// Current synthesis availability
    #[must_use]
    pub const fn tts(&self) -> TtsAvailability {
        self.tts
    }

    /// Record a synthesis rate limit: the session is text-only until clear
    pub fn note_tts_rate_limit(&mut self) {
        if self.tts.is_available() {
            tracing::info!(session = %self.id, "TTS rate limited, text-only until clear");
        }
        self.tts = TtsAvailability::Unavailable;
    }

    /// Replace the current turn
    ///
    /// The prior turn's artifact stays registered; its release belongs to
    /// the registry lifecycle, not the turn swap.
    pub fn set_turn(&mut self, turn: Turn) {
        self.turn = Some(turn);
    }

    /// Register an artifact for release when the session is cleared
    pub fn register_artifact(&mut self, handle: ArtifactHandle) {
        self.artifacts.push(handle);
    }

    /// Number of artifacts currently registered
    #[must_use]
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Drop the conversation
    ///
    /// Releases every registered artifact in insertion order, unsets the
    /// current turn, and restores synthesis availability. Safe to call
    /// repeatedly; a second clear finds nothing to do.
    pub fn clear(&mut self, store: &ArtifactStore) {
        for handle in self.artifacts.drain(..) {
            store.release(&handle);
        }
        self.turn = None;
        self.tts = TtsAvailability::Available;
        tracing::debug!(session = %self.id, "session cleared");
    }
}

/// Shared handle to one session's state
///
/// The lock is held for a whole turn, so turns for one session never
/// interleave and a superseded in-flight result cannot land on a newer
/// turn.
pub type SharedSession = Arc<Mutex<Session>>;

/// Keyed session registry for a multi-session server
#[derive(Default)]
pub struct SessionManager {
    inner: std::sync::Mutex<HashMap<String, SharedSession>>,
}

impl SessionManager {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the session with the given ID, creating it on first use
    pub fn find_or_create(&self, id: &str) -> SharedSession {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(id))))
            .clone()
    }

    /// Look up an existing session
    #[must_use]
    pub fn get(&self, id: &str) -> Option<SharedSession> {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(input: &str, output: &str) -> Turn {
        Turn {
            input_text: input.to_string(),
            output_text: output.to_string(),
            audio: None,
            modality: Modality::Typed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn new_session_has_tts_available() {
        let session = Session::new("s1");
        assert!(session.tts().is_available());
        assert!(session.turn().is_none());
    }

    #[test]
    fn rate_limit_flips_availability_and_stays() {
        let mut session = Session::new("s1");

        session.note_tts_rate_limit();
        assert!(!session.tts().is_available());

        // Repeated notes and new turns change nothing
        session.note_tts_rate_limit();
        session.set_turn(turn("hi", "hello"));
        assert!(!session.tts().is_available());
    }

    #[test]
    fn clear_restores_availability() {
        let store = ArtifactStore::new().unwrap();
        let mut session = Session::new("s1");

        session.note_tts_rate_limit();
        session.clear(&store);
        assert!(session.tts().is_available());
    }

    #[test]
    fn set_turn_replaces_prior_turn() {
        let mut session = Session::new("s1");

        session.set_turn(turn("first", "one"));
        session.set_turn(turn("second", "two"));

        assert_eq!(session.turn().unwrap().input_text, "second");
    }

    #[test]
    fn clear_releases_registered_artifacts_in_order() {
        let store = ArtifactStore::new().unwrap();
        let mut session = Session::new("s1");

        let paths: Vec<_> = (0..3)
            .map(|i| {
                let handle = store.create(format!("audio{i}").as_bytes(), ".wav").unwrap();
                let path = handle.path().to_path_buf();
                session.register_artifact(handle);
                path
            })
            .collect();

        assert_eq!(session.artifact_count(), 3);
        session.clear(&store);

        assert_eq!(session.artifact_count(), 0);
        assert!(session.turn().is_none());
        assert!(paths.iter().all(|p| !p.exists()));
    }

    #[test]
    fn clear_twice_is_a_no_op() {
        let store = ArtifactStore::new().unwrap();
        let mut session = Session::new("s1");

        let handle = store.create(b"x", ".wav").unwrap();
        session.register_artifact(handle);
        session.set_turn(turn("hi", "hello"));

        session.clear(&store);
        session.clear(&store);

        assert!(session.tts().is_available());
        assert_eq!(session.artifact_count(), 0);
        assert!(session.turn().is_none());
    }

    #[test]
    fn displayable_requires_both_sides() {
        assert!(turn("hi", "hello").is_displayable());
        assert!(!turn("", "hello").is_displayable());
        assert!(!turn("hi", "").is_displayable());
    }

    #[test]
    fn manager_returns_same_session_for_same_id() {
        let manager = SessionManager::new();

        let a = manager.find_or_create("alpha");
        let b = manager.find_or_create("alpha");
        let other = manager.find_or_create("beta");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
        assert!(manager.get("alpha").is_some());
        assert!(manager.get("missing").is_none());
    }
}
