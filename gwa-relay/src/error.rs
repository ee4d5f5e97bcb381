//! Error types for gwa-relay
//!
//! Every handler failure is converted into a structured
//! `{ "error": { "code", "message" } }` body with a matching status code;
//! nothing propagates past the handler boundary as a panic. An unusable
//! answer from an upstream service (`RESPONSE_UNPARSEABLE`) is reported
//! distinctly from a transport failure (`UPSTREAM_FAILED`) so callers can
//! tell "the service answered garbage" from "the service did not answer".

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::SessionError;
use crate::services::{ExtractError, GeminiError, ReplyParseError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required upload absent (400) - caught before any network call
    #[error("Missing input: {0}")]
    InputMissing(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - wrong workflow step, or a transition already in flight
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream model or extraction service failed (502)
    #[error("Upstream call failed: {0}")]
    UpstreamFailed(String),

    /// Upstream answered, but the reply was unusable (502)
    #[error("Upstream reply unparseable: {0}")]
    ResponseUnparseable(String),

    /// Upstream call exceeded its deadline (504)
    #[error("Upstream deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::InputMissing(msg) => (StatusCode::BAD_REQUEST, "INPUT_MISSING", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::UpstreamFailed(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_FAILED", msg),
            ApiError::ResponseUnparseable(msg) => {
                (StatusCode::BAD_GATEWAY, "RESPONSE_UNPARSEABLE", msg)
            }
            ApiError::DeadlineExceeded(msg) => {
                (StatusCode::GATEWAY_TIMEOUT, "DEADLINE_EXCEEDED", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<GeminiError> for ApiError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::DeadlineExceeded(_) => ApiError::DeadlineExceeded(err.to_string()),
            GeminiError::ParseError(_) | GeminiError::EmptyReply => {
                ApiError::ResponseUnparseable(err.to_string())
            }
            GeminiError::NetworkError(_) | GeminiError::ApiError(_, _) => {
                ApiError::UpstreamFailed(err.to_string())
            }
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::DeadlineExceeded(_) => ApiError::DeadlineExceeded(err.to_string()),
            ExtractError::ParseError(_) => ApiError::ResponseUnparseable(err.to_string()),
            ExtractError::NetworkError(_) | ExtractError::ApiError(_, _) => {
                ApiError::UpstreamFailed(err.to_string())
            }
        }
    }
}

impl From<ReplyParseError> for ApiError {
    fn from(err: ReplyParseError) -> Self {
        ApiError::ResponseUnparseable(err.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::WrongState { .. } => ApiError::Conflict(err.to_string()),
            SessionError::EmptyPayload(_) => ApiError::ResponseUnparseable(err.to_string()),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkflowState;
    use http_body_util::BodyExt;
    use std::time::Duration;

    async fn status_and_code(err: ApiError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json["error"]["code"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn gemini_errors_map_to_the_documented_taxonomy() {
        let (status, code) = status_and_code(ApiError::from(GeminiError::DeadlineExceeded(
            Duration::from_secs(60),
        )))
        .await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(code, "DEADLINE_EXCEEDED");

        for err in [
            GeminiError::ParseError("bad json".to_string()),
            GeminiError::EmptyReply,
        ] {
            let (status, code) = status_and_code(ApiError::from(err)).await;
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(code, "RESPONSE_UNPARSEABLE");
        }

        for err in [
            GeminiError::NetworkError("connection refused".to_string()),
            GeminiError::ApiError(500, "internal".to_string()),
        ] {
            let (status, code) = status_and_code(ApiError::from(err)).await;
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(code, "UPSTREAM_FAILED");
        }
    }

    #[tokio::test]
    async fn extract_errors_map_like_model_errors() {
        let (status, code) = status_and_code(ApiError::from(ExtractError::DeadlineExceeded(
            Duration::from_secs(60),
        )))
        .await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(code, "DEADLINE_EXCEEDED");

        let (status, code) =
            status_and_code(ApiError::from(ExtractError::ParseError("x".to_string()))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "RESPONSE_UNPARSEABLE");

        for err in [
            ExtractError::NetworkError("unreachable".to_string()),
            ExtractError::ApiError(400, "no file".to_string()),
        ] {
            let (status, code) = status_and_code(ApiError::from(err)).await;
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(code, "UPSTREAM_FAILED");
        }
    }

    #[tokio::test]
    async fn session_and_parse_errors_map_to_conflict_and_unparseable() {
        let (status, code) = status_and_code(ApiError::from(SessionError::WrongState {
            expected: WorkflowState::AwaitingVerdict,
            expected_step: 3,
            actual: WorkflowState::AwaitingImage,
            actual_step: 1,
        }))
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "CONFLICT");

        let (status, code) =
            status_and_code(ApiError::from(SessionError::EmptyPayload("verdict"))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "RESPONSE_UNPARSEABLE");

        let (status, code) = status_and_code(ApiError::from(ReplyParseError::Empty)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "RESPONSE_UNPARSEABLE");
    }

    #[tokio::test]
    async fn request_errors_render_their_status() {
        let (status, code) =
            status_and_code(ApiError::InputMissing("no image".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "INPUT_MISSING");

        let (status, code) =
            status_and_code(ApiError::BadRequest("too many images".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "BAD_REQUEST");

        let (status, code) = status_and_code(ApiError::Conflict("busy".to_string())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "CONFLICT");

        let (status, code) = status_and_code(ApiError::Internal("boom".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
    }
}
