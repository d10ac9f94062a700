//! Remote AI capabilities: transcription, chat completion, speech synthesis
//!
//! Every remote call collapses into an [`Outcome`] before it reaches the
//! conversation pipeline, so rate limiting is distinguishable from plain
//! failure everywhere downstream.

pub mod groq;

pub use groq::GroqClient;

use async_trait::async_trait;

/// Maximum number of characters of reply text sent to speech synthesis
pub const SPEECH_INPUT_CAP: usize = 500;

/// Result of one remote capability call
///
/// There is no retry layer: each call is a single attempt and its outcome
/// is reported as-is. The conversation pipeline decides what a rate limit
/// or failure means for the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The call succeeded with a payload
    Success(T),
    /// The remote service reported rate limiting (HTTP 429)
    RateLimited(String),
    /// Transport error or any other non-success response
    Failure(String),
}

impl<T> Outcome<T> {
    /// True if this outcome is a rate-limit signal
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// True if this outcome carries a payload
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// A backend providing the three remote capabilities
///
/// The production implementation is [`GroqClient`]; tests substitute
/// scripted sources to drive the pipeline without a network.
#[async_trait]
pub trait CapabilitySource: Send + Sync {
    /// Transcribe audio bytes (WAV) to text
    async fn transcribe(&self, audio: &[u8]) -> Outcome<String>;

    /// Generate a single-turn chat reply for the given user text
    async fn complete(&self, prompt: &str) -> Outcome<String>;

    /// Synthesize speech for `text`, clipped to at most `max_chars`
    /// characters before the request is issued
    async fn synthesize(&self, text: &str, max_chars: usize) -> Outcome<Vec<u8>>;
}

/// Clip text to at most `max_chars` characters on a char boundary
///
/// Synthesis input is bounded; callers must not assume the full reply is
/// spoken.
#[must_use]
pub fn clip_speech_input(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_short_text_unchanged() {
        assert_eq!(clip_speech_input("hello", 500), "hello");
    }

    #[test]
    fn clip_limits_to_max_chars() {
        let long = "a".repeat(800);
        assert_eq!(clip_speech_input(&long, 500).chars().count(), 500);
    }

    #[test]
    fn clip_respects_char_boundaries() {
        let text = "héllo wörld ünïcode";
        let clipped = clip_speech_input(text, 7);
        assert_eq!(clipped, "héllo w");
        assert_eq!(clipped.chars().count(), 7);
    }

    #[test]
    fn clip_exact_length_unchanged() {
        assert_eq!(clip_speech_input("abcde", 5), "abcde");
    }

    #[test]
    fn outcome_predicates() {
        let ok: Outcome<String> = Outcome::Success("hi".to_string());
        let limited: Outcome<String> = Outcome::RateLimited("slow down".to_string());
        let failed: Outcome<String> = Outcome::Failure("boom".to_string());

        assert!(ok.is_success());
        assert!(!ok.is_rate_limited());
        assert!(limited.is_rate_limited());
        assert!(!failed.is_success());
        assert!(!failed.is_rate_limited());
    }
}
