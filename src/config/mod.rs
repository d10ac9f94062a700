//! Configuration management for Parley gateway

pub mod file;

use secrecy::SecretString;

use crate::capability::SPEECH_INPUT_CAP;
use crate::capability::groq::GroqSettings;
use crate::{Error, Result};

/// Default API server port
pub const DEFAULT_PORT: u16 = 18990;

/// Parley gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Groq API key (required; absence is fatal at startup)
    pub api_key: SecretString,

    /// Remote endpoint and model settings
    pub remote: GroqSettings,

    /// Max reply characters sent to speech synthesis
    pub speech_input_cap: usize,

    /// HTTP API server port
    pub port: u16,
}

impl Config {
    /// Load configuration: defaults, then the optional TOML file overlay,
    /// then the environment
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when `GROQ_API_KEY` is absent or empty.
    pub fn load() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .map(SecretString::from);
        let api_base = std::env::var("PARLEY_API_BASE").ok();

        Self::build(file::load_config_file(), api_key, api_base)
    }

    /// Assemble configuration from its resolved parts
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when no API key was resolved.
    pub fn build(
        overlay: file::ParleyConfigFile,
        api_key: Option<SecretString>,
        api_base_override: Option<String>,
    ) -> Result<Self> {
        let api_key = api_key.ok_or_else(|| Error::Auth("GROQ_API_KEY not set".to_string()))?;

        let mut remote = GroqSettings::default();
        if let Some(api_base) = overlay.remote.api_base {
            remote.api_base = api_base;
        }
        if let Some(api_base) = api_base_override {
            remote.api_base = api_base;
        }
        if let Some(model) = overlay.remote.stt_model {
            remote.stt_model = model;
        }
        if let Some(model) = overlay.remote.chat_model {
            remote.chat_model = model;
        }
        if let Some(model) = overlay.voice.tts_model {
            remote.tts_model = model;
        }
        if let Some(voice) = overlay.voice.tts_voice {
            remote.tts_voice = voice;
        }
        if let Some(temperature) = overlay.completion.temperature {
            remote.completion.temperature = temperature;
        }
        if let Some(max_tokens) = overlay.completion.max_tokens {
            remote.completion.max_tokens = max_tokens;
        }
        if let Some(top_p) = overlay.completion.top_p {
            remote.completion.top_p = top_p;
        }

        Ok(Self {
            api_key,
            remote,
            speech_input_cap: overlay.voice.speech_input_cap.unwrap_or(SPEECH_INPUT_CAP),
            port: overlay.server.port.unwrap_or(DEFAULT_PORT),
        })
    }
}
