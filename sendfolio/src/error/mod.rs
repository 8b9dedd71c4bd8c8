//! Application error type and HTTP response mapping
//!
//! Pre-dispatch failures map to specific 4xx responses; anything escaping
//! the dispatch loop (attachment load, audit write, lookups) maps to a 500
//! with a generic message, with the underlying detail logged rather than
//! returned to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::audit::AuditError;
use crate::email::EmailError;
use crate::store::StoreError;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Request is missing required input (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced resource does not exist for this user (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// No authenticated caller on the request (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Failure in the dispatch pipeline outside the per-recipient loop
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Audit persistence failure
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),

    /// Lookup store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    /// Create a validation error from a string message
    #[must_use]
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not-found error from a string message
    #[must_use]
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        Self::NotFound(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Email(_) | Self::Audit(_) | Self::Store(_) => {
                error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}
