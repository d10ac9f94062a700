//! Conversation turn pipeline
//!
//! Drives one exchange from raw input to a finalized [`Turn`]: transcribe
//! for audio modalities, always complete, and synthesize only while the
//! session still has TTS available. Holds no cross-turn state of its own;
//! everything session-scoped is read from and written back to the
//! [`Session`] passed in.

use std::sync::Arc;

use chrono::Utc;

use crate::artifacts::{ArtifactHandle, ArtifactStore};
use crate::capability::{CapabilitySource, Outcome, SPEECH_INPUT_CAP};
use crate::session::{Modality, Session, Turn};
use crate::{Error, Result};

/// Raw input for one conversation turn
#[derive(Debug, Clone)]
pub enum TurnInput {
    /// Recorded speech (WAV bytes)
    Spoken(Vec<u8>),
    /// Uploaded audio file (WAV bytes)
    Uploaded(Vec<u8>),
    /// Typed text
    Typed(String),
}

impl TurnInput {
    /// The modality this input entered through
    #[must_use]
    pub const fn modality(&self) -> Modality {
        match self {
            Self::Spoken(_) => Modality::Spoken,
            Self::Uploaded(_) => Modality::Uploaded,
            Self::Typed(_) => Modality::Typed,
        }
    }
}

/// Drives conversation turns against a capability source
pub struct Orchestrator {
    source: Arc<dyn CapabilitySource>,
    artifacts: Arc<ArtifactStore>,
    max_speech_chars: usize,
}

impl Orchestrator {
    /// Create an orchestrator with the default speech input cap
    #[must_use]
    pub fn new(source: Arc<dyn CapabilitySource>, artifacts: Arc<ArtifactStore>) -> Self {
        Self {
            source,
            artifacts,
            max_speech_chars: SPEECH_INPUT_CAP,
        }
    }

    /// Override the maximum reply length sent to synthesis
    #[must_use]
    pub const fn with_speech_cap(mut self, max_chars: usize) -> Self {
        self.max_speech_chars = max_chars;
        self
    }

    /// Run one conversation turn and store the result on the session
    ///
    /// A failed transcription aborts the turn with nothing to display. A
    /// failed completion produces a placeholder reply with the user's text
    /// preserved. A rate-limited synthesis switches the session to
    /// text-only mode; any synthesis problem leaves the turn valid without
    /// audio.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for empty input and
    /// [`Error::Transcription`] when audio input cannot be transcribed.
    pub async fn run_turn(&self, input: TurnInput, session: &mut Session) -> Result<Turn> {
        let modality = input.modality();

        let input_text = match input {
            TurnInput::Typed(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(Error::Validation("no text submitted".to_string()));
                }
                text
            }
            TurnInput::Spoken(audio) | TurnInput::Uploaded(audio) => {
                if audio.is_empty() {
                    return Err(Error::Validation("empty audio data".to_string()));
                }
                self.transcribe_staged(&audio).await?
            }
        };

        let (output_text, completed) = match self.source.complete(&input_text).await {
            Outcome::Success(reply) => (reply, true),
            Outcome::RateLimited(message) | Outcome::Failure(message) => {
                tracing::warn!(error = %message, "completion failed");
                (format!("Error: {message}"), false)
            }
        };

        let audio = if completed && session.tts().is_available() {
            self.synthesize_reply(&output_text, session).await
        } else {
            None
        };

        let turn = Turn {
            input_text,
            output_text,
            audio,
            modality,
            created_at: Utc::now(),
        };

        tracing::info!(
            session = %session.id,
            modality = ?modality,
            has_audio = turn.audio.is_some(),
            "turn complete"
        );

        session.set_turn(turn.clone());
        Ok(turn)
    }

    /// Stage raw audio as an ephemeral artifact and transcribe it
    ///
    /// The staging file is released right after the transcription call,
    /// whatever its outcome. Rate limiting is not expected from
    /// transcription and is treated like any other failure.
    async fn transcribe_staged(&self, audio: &[u8]) -> Result<String> {
        let staged = self.artifacts.create(audio, ".wav")?;
        let result = self.artifacts.read(&staged);
        let outcome = match result {
            Ok(bytes) => self.source.transcribe(&bytes).await,
            Err(e) => Outcome::Failure(e.to_string()),
        };
        self.artifacts.release(&staged);

        match outcome {
            Outcome::Success(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(Error::Transcription("no speech recognized".to_string()));
                }
                Ok(text)
            }
            Outcome::RateLimited(message) | Outcome::Failure(message) => {
                Err(Error::Transcription(message))
            }
        }
    }

    /// Synthesize the reply and register the resulting artifact
    ///
    /// Returns `None` whenever the turn should proceed without audio.
    async fn synthesize_reply(
        &self,
        reply: &str,
        session: &mut Session,
    ) -> Option<ArtifactHandle> {
        match self.source.synthesize(reply, self.max_speech_chars).await {
            Outcome::Success(bytes) => match self.artifacts.create(&bytes, ".wav") {
                Ok(handle) => {
                    session.register_artifact(handle.clone());
                    Some(handle)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to store synthesized audio");
                    None
                }
            },
            Outcome::RateLimited(message) => {
                tracing::warn!(message = %message, "synthesis rate limited");
                session.note_tts_rate_limit();
                None
            }
            Outcome::Failure(message) => {
                tracing::warn!(error = %message, "synthesis failed, continuing without audio");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_maps_to_its_modality() {
        assert_eq!(TurnInput::Spoken(vec![0]).modality(), Modality::Spoken);
        assert_eq!(TurnInput::Uploaded(vec![0]).modality(), Modality::Uploaded);
        assert_eq!(
            TurnInput::Typed("hi".to_string()).modality(),
            Modality::Typed
        );
    }
}
