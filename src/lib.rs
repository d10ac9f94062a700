//! Parley Gateway - Conversation gateway for voice and text AI assistants
//!
//! This library provides the core functionality for the Parley gateway:
//! - One-turn conversation pipeline (transcribe, complete, synthesize)
//! - Per-session state with a text-only degraded mode under TTS rate limits
//! - Transient audio artifact lifecycle
//! - HTTP API for UI layers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    UI layer                          │
//! │   Record voice  │  Upload audio  │  Type text       │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                Parley Gateway                        │
//! │   Orchestrator │ Sessions │ Artifacts │ HTTP API    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │           Groq API (OpenAI-compatible)               │
//! │   Whisper STT  │  Chat LLM  │  PlayAI TTS           │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod artifacts;
pub mod capability;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod session;

pub use artifacts::{ArtifactHandle, ArtifactStore};
pub use capability::{CapabilitySource, GroqClient, Outcome, SPEECH_INPUT_CAP};
pub use config::Config;
pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, TurnInput};
pub use session::{Modality, Session, SessionManager, Turn, TtsAvailability};
