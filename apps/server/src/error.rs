//! # API Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  tally_core::ValidationError ──┐                                        │
//! │  tally_core::EngineError ──────┼──► ApiError ──► HTTP status + JSON     │
//! │  tally_db::DbError ────────────┘                                        │
//! │                                                                         │
//! │  Body: { "code": "...", "message": "..." }                              │
//! │  Validation adds: "errors": [ { "kind": ... }, ... ]                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use tally_core::{EngineError, ValidationError};
use tally_db::DbError;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed domain validation. Carries every problem found so the
    /// client can render them all at once.
    #[error("validation failed")]
    Validation(Vec<ValidationError>),

    /// Malformed request outside the domain validators (e.g. unparseable
    /// money amount).
    #[error("{0}")]
    BadRequest(String),

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The bill's current state makes the operation impossible (empty
    /// participant set, negative tip).
    #[error("{0}")]
    Conflict(String),

    /// Database temporarily unavailable.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Anything else. Details are logged, not leaked.
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ApiError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Stable machine-readable code for the response body.
    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_failed",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unavailable(_) => "unavailable",
            ApiError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!(detail = %detail, "internal error");
        }

        let body = match &self {
            ApiError::Validation(errors) => json!({
                "code": self.code(),
                "message": self.to_string(),
                "errors": errors,
            }),
            _ => json!({
                "code": self.code(),
                "message": self.to_string(),
            }),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::NotFound { entity, id },
            DbError::PoolExhausted => ApiError::Unavailable("connection pool exhausted".into()),
            DbError::ConnectionFailed(msg) => ApiError::Unavailable(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Conflict(err.to_string())
    }
}

/// Result type for request handlers.
pub type ApiResult<T> = Result<T, ApiError>;
