//! Request-time errors surfaced by the HTTP façade.
//!
//! Background phase failures never appear here; they are only observable
//! through the job status record, since the upload request has already
//! returned 202 by the time they happen.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors returned synchronously to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing upload data.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// The requested target language is not supported.
    #[error("invalid target language: {0}")]
    UnsupportedLanguage(String),

    /// Status lookup for an unknown task id.
    #[error("task not found: {0}")]
    JobNotFound(String),

    /// Unexpected server-side failure at request time.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUpload(_) | Self::UnsupportedLanguage(_) => StatusCode::BAD_REQUEST,
            Self::JobNotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
