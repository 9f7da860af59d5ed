//! Error types for the compliance server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use compliance_engine::ComplianceError;
use serde::Serialize;
use thiserror::Error;

use crate::transcript::TranscriptError;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Term list unavailable: {0}")]
    TermList(#[from] ComplianceError),

    #[error("Transcript not found: {0}")]
    TranscriptNotFound(String),

    #[error("Transcript fetch failed: {0}")]
    TranscriptFetch(String),

    #[error("Transcript fetch timed out after {0}ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Client-facing text for [`ServerError::TermList`]
pub const TERM_LIST_UNAVAILABLE: &str = "Compliance word list is unavailable";

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let mut message = self.to_string();
        let (status, code) = match &self {
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ServerError::TermList(e) => {
                // The detail names a server-side path; keep it in the log
                tracing::error!("Term list error: {}", e);
                message = TERM_LIST_UNAVAILABLE.to_string();
                (StatusCode::INTERNAL_SERVER_ERROR, "TERM_LIST_UNAVAILABLE")
            }
            ServerError::TranscriptNotFound(_) => (StatusCode::NOT_FOUND, "TRANSCRIPT_NOT_FOUND"),
            ServerError::TranscriptFetch(_) => (StatusCode::BAD_GATEWAY, "TRANSCRIPT_FETCH_FAILED"),
            ServerError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<TranscriptError> for ServerError {
    fn from(err: TranscriptError) -> Self {
        match err {
            TranscriptError::NotAvailable(video_id) => ServerError::TranscriptNotFound(video_id),
            other => ServerError::TranscriptFetch(other.to_string()),
        }
    }
}
