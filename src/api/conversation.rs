//! Conversation API endpoints
//!
//! The UI layer's door into the core: one endpoint per input modality,
//! all converging on the same turn pipeline, plus the current-conversation
//! view, synthesized-audio download, and clear.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::orchestrator::TurnInput;
use crate::session::{Modality, Session, Turn};

/// Build conversation router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/{session_id}", get(view))
        .route("/{session_id}/spoken", post(spoken))
        .route("/{session_id}/uploaded", post(uploaded))
        .route("/{session_id}/typed", post(typed))
        .route("/{session_id}/audio", get(audio))
        .route("/{session_id}/clear", post(clear))
        .with_state(state)
}

/// Typed input request
#[derive(Debug, Deserialize)]
pub struct TypedRequest {
    pub text: String,
}

/// One finalized turn, shaped for rendering
#[derive(Debug, Serialize)]
pub struct TurnView {
    pub input_text: String,
    pub output_text: String,
    pub modality: Modality,
    pub has_audio: bool,
    pub displayable: bool,
}

impl TurnView {
    fn new(turn: &Turn) -> Self {
        Self {
            input_text: turn.input_text.clone(),
            output_text: turn.output_text.clone(),
            modality: turn.modality,
            has_audio: turn.audio.is_some(),
            displayable: turn.is_displayable(),
        }
    }
}

/// Current conversation state, shaped for rendering
///
/// `tts_available: false` is the informational text-only-mode notice; it
/// is never an error.
#[derive(Debug, Serialize)]
pub struct ConversationView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn: Option<TurnView>,
    pub tts_available: bool,
}

impl ConversationView {
    fn new(session: &Session) -> Self {
        Self {
            turn: session.turn().map(TurnView::new),
            tts_available: session.tts().is_available(),
        }
    }
}

/// Submit recorded speech
async fn spoken(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Result<Json<ConversationView>, ApiError> {
    run_turn(&state, &session_id, TurnInput::Spoken(body.to_vec())).await
}

/// Submit an uploaded audio file
async fn uploaded(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Result<Json<ConversationView>, ApiError> {
    run_turn(&state, &session_id, TurnInput::Uploaded(body.to_vec())).await
}

/// Submit typed text
async fn typed(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<String>,
    Json(request): Json<TypedRequest>,
) -> Result<Json<ConversationView>, ApiError> {
    run_turn(&state, &session_id, TurnInput::Typed(request.text)).await
}

/// Drive one turn through the pipeline while holding the session lock
async fn run_turn(
    state: &ApiState,
    session_id: &str,
    input: TurnInput,
) -> Result<Json<ConversationView>, ApiError> {
    let session = state.sessions.find_or_create(session_id);
    let mut session = session.lock().await;

    state.orchestrator.run_turn(input, &mut session).await?;
    Ok(Json(ConversationView::new(&session)))
}

/// Get the current conversation state
async fn view(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<String>,
) -> Json<ConversationView> {
    let session = state.sessions.find_or_create(&session_id);
    let session = session.lock().await;
    Json(ConversationView::new(&session))
}

/// Download the current turn's synthesized audio
///
/// Returns audio in WAV format
async fn audio(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or(ApiError::NotFound("unknown session"))?;
    let session = session.lock().await;

    let handle = session
        .turn()
        .and_then(|turn| turn.audio.as_ref())
        .ok_or(ApiError::NotFound("no audio for current turn"))?;

    let bytes = state
        .artifacts
        .read(handle)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "audio/wav")], bytes).into_response())
}

/// Clear the conversation
///
/// Releases all session artifacts, resets synthesis availability, and
/// unsets the current turn. Clearing an unknown or already-empty session
/// succeeds with nothing to do.
async fn clear(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<String>,
) -> Json<ConversationView> {
    let session = state.sessions.find_or_create(&session_id);
    let mut session = session.lock().await;

    session.clear(&state.artifacts);
    Json(ConversationView::new(&session))
}

/// Conversation API errors
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(&'static str),
    TranscriptionFailed(String),
    Internal(String),
}

impl From<crate::Error> for ApiError {
    fn from(err: crate::Error) -> Self {
        match err {
            crate::Error::Validation(msg) => Self::BadRequest(msg),
            crate::Error::Transcription(msg) => Self::TranscriptionFailed(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.to_string()),
            Self::TranscriptionFailed(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "transcription_failed", msg)
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}
