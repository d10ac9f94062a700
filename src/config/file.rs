//! TOML configuration file loading
//!
//! Supports `~/.config/omni/parley/config.toml` as a persistent config
//! source. All fields are optional; the file is a partial overlay on top
//! of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ParleyConfigFile {
    /// Remote API endpoint and models
    #[serde(default)]
    pub remote: RemoteFileConfig,

    /// Chat completion sampling parameters
    #[serde(default)]
    pub completion: CompletionFileConfig,

    /// Speech synthesis configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Remote API configuration
#[derive(Debug, Default, Deserialize)]
pub struct RemoteFileConfig {
    /// API base URL (OpenAI-compatible)
    pub api_base: Option<String>,

    /// Transcription model (e.g. "whisper-large-v3-turbo")
    pub stt_model: Option<String>,

    /// Chat completion model
    pub chat_model: Option<String>,
}

/// Chat completion sampling parameters
#[derive(Debug, Default, Deserialize)]
pub struct CompletionFileConfig {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
}

/// Speech synthesis configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// TTS model (e.g. "playai-tts")
    pub tts_model: Option<String>,

    /// TTS voice identifier
    pub tts_voice: Option<String>,

    /// Max reply characters sent to synthesis
    pub speech_input_cap: Option<usize>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ParleyConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ParleyConfigFile {
    let Some(path) = config_file_path() else {
        return ParleyConfigFile::default();
    };

    if !path.exists() {
        return ParleyConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ParleyConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ParleyConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/omni/parley/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("omni")
            .join("parley")
            .join("config.toml")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_parses_to_defaults() {
        let config: ParleyConfigFile = toml::from_str("").unwrap();
        assert!(config.remote.api_base.is_none());
        assert!(config.voice.tts_voice.is_none());
        assert!(config.server.port.is_none());
    }

    #[test]
    fn partial_file_fills_only_named_fields() {
        let config: ParleyConfigFile = toml::from_str(
            r#"
            [remote]
            chat_model = "llama-3.3-70b-versatile"

            [voice]
            tts_voice = "Celeste-PlayAI"
            speech_input_cap = 400
            "#,
        )
        .unwrap();

        assert_eq!(
            config.remote.chat_model.as_deref(),
            Some("llama-3.3-70b-versatile")
        );
        assert!(config.remote.api_base.is_none());
        assert_eq!(config.voice.tts_voice.as_deref(), Some("Celeste-PlayAI"));
        assert_eq!(config.voice.speech_input_cap, Some(400));
        assert!(config.completion.temperature.is_none());
    }
}
