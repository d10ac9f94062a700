//! Groq API client
//!
//! One OpenAI-compatible endpoint provides all three capabilities:
//! Whisper transcription, chat completion, and PlayAI speech synthesis.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use super::{CapabilitySource, Outcome, clip_speech_input};
use crate::{Error, Result};

/// Default Groq OpenAI-compatible API base URL
pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Response from the Whisper transcription API
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Response from the chat completions API
#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(serde::Deserialize)]
struct ChatMessage {
    content: String,
}

/// Error envelope returned by the Groq API
#[derive(serde::Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(serde::Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Sampling parameters for chat completions
#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            max_tokens: 1024,
            top_p: 0.95,
        }
    }
}

/// Model and endpoint settings for the Groq client
#[derive(Debug, Clone)]
pub struct GroqSettings {
    /// API base URL
    pub api_base: String,

    /// Transcription model (e.g. "whisper-large-v3-turbo")
    pub stt_model: String,

    /// Chat completion model
    pub chat_model: String,

    /// Speech synthesis model
    pub tts_model: String,

    /// Speech synthesis voice identifier
    pub tts_voice: String,

    /// Chat sampling parameters
    pub completion: CompletionParams,
}

impl Default for GroqSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            stt_model: "whisper-large-v3-turbo".to_string(),
            chat_model: "deepseek-r1-distill-llama-70b".to_string(),
            tts_model: "playai-tts".to_string(),
            tts_voice: "Aaliyah-PlayAI".to_string(),
            completion: CompletionParams::default(),
        }
    }
}

/// Client for the Groq remote capabilities
pub struct GroqClient {
    client: reqwest::Client,
    api_key: SecretString,
    settings: GroqSettings,
}

impl GroqClient {
    /// Create a new Groq client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(api_key: SecretString, settings: GroqSettings) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Auth("Groq API key required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            settings,
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }

    async fn transcribe_inner(&self, audio: &[u8]) -> Outcome<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting transcription");

        let part = match reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")
        {
            Ok(part) => part,
            Err(e) => return Outcome::Failure(e.to_string()),
        };

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.settings.stt_model.clone())
            .text("response_format", "verbose_json");

        let response = match self
            .client
            .post(format!("{}/audio/transcriptions", self.settings.api_base))
            .header("Authorization", self.bearer())
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "transcription request failed");
                return Outcome::Failure(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "transcription API error");
            return error_outcome(status, &body);
        }

        match response.json::<TranscriptionResponse>().await {
            Ok(result) => {
                tracing::info!(transcript = %result.text, "transcription complete");
                Outcome::Success(result.text)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to parse transcription response");
                Outcome::Failure(e.to_string())
            }
        }
    }

    async fn complete_inner(&self, prompt: &str) -> Outcome<String> {
        #[derive(serde::Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<RequestMessage<'a>>,
            temperature: f64,
            max_tokens: u32,
            top_p: f64,
        }

        #[derive(serde::Serialize)]
        struct RequestMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        tracing::debug!(prompt_chars = prompt.chars().count(), "starting completion");

        // Single-turn: no conversation history is sent
        let request = ChatRequest {
            model: &self.settings.chat_model,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.settings.completion.temperature,
            max_tokens: self.settings.completion.max_tokens,
            top_p: self.settings.completion.top_p,
        };

        let response = match self
            .client
            .post(format!("{}/chat/completions", self.settings.api_base))
            .header("Authorization", self.bearer())
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "completion request failed");
                return Outcome::Failure(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "completion API error");
            return error_outcome(status, &body);
        }

        match response.json::<ChatResponse>().await {
            Ok(result) => match result.choices.into_iter().next() {
                Some(choice) => Outcome::Success(choice.message.content),
                None => Outcome::Failure("completion returned no choices".to_string()),
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to parse completion response");
                Outcome::Failure(e.to_string())
            }
        }
    }

    async fn synthesize_inner(&self, text: &str, max_chars: usize) -> Outcome<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            voice: &'a str,
            input: &'a str,
            response_format: &'a str,
        }

        let input = clip_speech_input(text, max_chars);
        tracing::debug!(input_chars = input.chars().count(), "starting synthesis");

        let request = SpeechRequest {
            model: &self.settings.tts_model,
            voice: &self.settings.tts_voice,
            input,
            response_format: "wav",
        };

        let response = match self
            .client
            .post(format!("{}/audio/speech", self.settings.api_base))
            .header("Authorization", self.bearer())
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "synthesis request failed");
                return Outcome::Failure(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "synthesis API error");
            return error_outcome(status, &body);
        }

        match response.bytes().await {
            Ok(audio) => {
                tracing::info!(audio_bytes = audio.len(), "synthesis complete");
                Outcome::Success(audio.to_vec())
            }
            Err(e) => Outcome::Failure(e.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl CapabilitySource for GroqClient {
    async fn transcribe(&self, audio: &[u8]) -> Outcome<String> {
        self.transcribe_inner(audio).await
    }

    async fn complete(&self, prompt: &str) -> Outcome<String> {
        self.complete_inner(prompt).await
    }

    async fn synthesize(&self, text: &str, max_chars: usize) -> Outcome<Vec<u8>> {
        self.synthesize_inner(text, max_chars).await
    }
}

/// Collapse a non-success HTTP response into an outcome
///
/// 429 carries the remote message when the error envelope parses; every
/// other status becomes a failure with the status and body as diagnostics.
fn error_outcome<T>(status: StatusCode, body: &str) -> Outcome<T> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .map_or_else(|_| "rate limit exceeded".to_string(), |b| b.error.message);
        Outcome::RateLimited(message)
    } else {
        Outcome::Failure(format!("API error {status}: {body}"))
    }
}
