//! gwa-relay library interface
//!
//! Exposes the application state and router for the binary and for
//! integration tests.

pub mod api;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::models::{Session, WorkflowState};
use crate::services::{ExtractionClient, GeminiClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The single assessment session for this service instance
    pub session: Arc<RwLock<Session>>,
    /// Generative model client
    pub gemini: Arc<GeminiClient>,
    /// PDF extraction collaborator client
    pub extractor: Arc<ExtractionClient>,
    /// Single-permit guard: at most one workflow transition in flight
    transition_guard: Arc<Mutex<()>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(gemini: GeminiClient, extractor: ExtractionClient) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::new())),
            gemini: Arc::new(gemini),
            extractor: Arc::new(extractor),
            transition_guard: Arc::new(Mutex::new(())),
            startup_time: Utc::now(),
        }
    }

    /// Claim the transition guard without waiting.
    ///
    /// Returns 409 Conflict when another transition is already running, so
    /// a double-submit never issues a second upstream call.
    pub fn acquire_transition_guard(&self) -> ApiResult<MutexGuard<'_, ()>> {
        self.transition_guard.try_lock().map_err(|_| {
            ApiError::Conflict("Another workflow step is already in progress".to_string())
        })
    }

    /// Reject the request unless the session is at the expected step
    pub async fn require_step(&self, expected: WorkflowState) -> ApiResult<()> {
        let session = self.session.read().await;
        if session.state == expected {
            Ok(())
        } else {
            Err(ApiError::Conflict(format!(
                "Workflow is at step {} but this operation requires step {}",
                session.state.step(),
                expected.step()
            )))
        }
    }
}

/// Build application router
///
/// CORS is wide open because the browser frontend is served from a
/// different origin; TraceLayer gives request-level logs.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::workflow_routes())
        .merge(api::session_routes())
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
