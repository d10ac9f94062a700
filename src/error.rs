//! Error types for Parley gateway

use thiserror::Error;

/// Result type alias for Parley operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Parley gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Missing or invalid credential (fatal at startup)
    #[error("auth error: {0}")]
    Auth(String),

    /// Empty or unsupported input
    #[error("invalid input: {0}")]
    Validation(String),

    /// Transcription failed; the turn is aborted with no partial result
    #[error("transcription error: {0}")]
    Transcription(String),

    /// Artifact storage error
    #[error("artifact error: {0}")]
    Artifact(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
