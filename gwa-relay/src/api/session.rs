//! Session inspection and reset endpoints
//!
//! GET /api/session, POST /api/session/reset

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::{ImageAnalysisRecord, Session, WorkflowState};
use crate::AppState;

/// Session snapshot returned to the UI
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub state: WorkflowState,
    /// 1-based step number matching the four-step UI
    pub step: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_analysis: Option<ImageAnalysisRecord>,
    pub report_text: String,
    pub verdict: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.session_id,
            state: session.state,
            step: session.state.step(),
            image_analysis: session.image_analysis.clone(),
            report_text: session.report_text.clone(),
            verdict: session.verdict.clone(),
            started_at: session.started_at,
            completed_at: session.completed_at,
        }
    }
}

/// GET /api/session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let session = state.session.read().await;
    Json(SessionSnapshot::from(&*session))
}

/// POST /api/session/reset
///
/// Discard the current run and start a new one. Rejected with 409 while a
/// workflow transition is in flight.
pub async fn reset_session(State(state): State<AppState>) -> ApiResult<Json<SessionSnapshot>> {
    let _guard = state.acquire_transition_guard()?;

    let mut session = state.session.write().await;
    let old_id = session.session_id;
    session.reset();
    tracing::info!(
        old_session_id = %old_id,
        session_id = %session.session_id,
        "Session reset; new run started"
    );

    Ok(Json(SessionSnapshot::from(&*session)))
}

/// Build session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/session/reset", post(reset_session))
}
