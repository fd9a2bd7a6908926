//! Error types for namesake-matcher

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use namesake_common::api::NameField;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Matching engine errors
#[derive(Debug, Error)]
pub enum MatcherError {
    /// Name unusable for encoding (empty or blank)
    #[error("Invalid {field} name: {reason}")]
    Encoding { field: NameField, reason: String },

    /// Persisting one half of a name failed; the in-memory entry was reverted
    #[error("Failed to persist {field} name '{name}': {source}")]
    AddFailed {
        field: NameField,
        name: String,
        #[source]
        source: StoreError,
    },

    /// Malformed add request (unpaired lists, empty names)
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or wrong admin token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Corpus not loaded yet, or store unreachable (503)
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Add of pair `index` failed on `field` (503)
    #[error("Failed to add pair {index}: {message}")]
    AddFailed {
        index: usize,
        field: NameField,
        name: String,
        message: String,
    },
}

impl ApiError {
    /// Map an engine error raised while adding pair `index`
    pub fn from_add(index: usize, err: MatcherError) -> Self {
        match err {
            MatcherError::AddFailed {
                field,
                name,
                source,
            } => ApiError::AddFailed {
                index,
                field,
                name,
                message: source.to_string(),
            },
            other => ApiError::from(other),
        }
    }
}

impl From<MatcherError> for ApiError {
    fn from(err: MatcherError) -> Self {
        match err {
            MatcherError::Encoding { .. } | MatcherError::Validation(_) => {
                ApiError::BadRequest(err.to_string())
            }
            MatcherError::AddFailed { .. } => {
                ApiError::Unavailable(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": { "code": "BAD_REQUEST", "message": msg } }),
            ),
            ApiError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": { "code": "UNAUTHORIZED", "message": msg } }),
            ),
            ApiError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": { "code": "UNAVAILABLE", "message": msg } }),
            ),
            ApiError::AddFailed {
                index,
                field,
                name,
                message,
            } => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "error": {
                        "code": "ADD_FAILED",
                        "message": message,
                        "pair": index,
                        "field": field,
                        "name": name,
                    }
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
