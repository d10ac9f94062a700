//! HTTP API server for Parley gateway

pub mod conversation;
pub mod health;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::artifacts::ArtifactStore;
use crate::capability::CapabilitySource;
use crate::capability::groq::GroqSettings;
use crate::orchestrator::Orchestrator;
use crate::session::SessionManager;

/// Shared state for API handlers
pub struct ApiState {
    pub orchestrator: Orchestrator,
    pub sessions: SessionManager,
    pub artifacts: Arc<ArtifactStore>,
    /// Remote settings, exposed read-only for status reporting
    pub remote: GroqSettings,
}

impl ApiState {
    /// Build shared state around a capability source
    ///
    /// # Errors
    ///
    /// Returns error if the artifact store cannot be created
    pub fn new(
        source: Arc<dyn CapabilitySource>,
        remote: GroqSettings,
        speech_input_cap: usize,
    ) -> Result<Self> {
        let artifacts = Arc::new(ArtifactStore::new()?);
        let orchestrator = Orchestrator::new(source, Arc::clone(&artifacts))
            .with_speech_cap(speech_input_cap);

        Ok(Self {
            orchestrator,
            sessions: SessionManager::new(),
            artifacts,
            remote,
        })
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Create a server over prebuilt state
    #[must_use]
    pub const fn new(state: Arc<ApiState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Build the router with all routes
    fn router(&self) -> Router {
        let router = Router::new()
            .nest("/api/conversation", conversation::router(self.state.clone()))
            .merge(health::router())
            .merge(health::status_router(self.state.clone()));

        // CORS layer for cross-origin requests from the UI layer
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
