//! API error type and its HTTP mapping.
//!
//! Every error surfaces to clients as `{"error": "..."}` with the
//! matching status code. Internal details are logged, never returned.

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde_json::json;

use taskd_storage::StorageError;

/// Errors produced by request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Invalid request payload or parameters (400).
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credential (401).
    #[error("authentication required")]
    Unauthorized,

    /// Entity does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness conflict (409).
    #[error("{0}")]
    Conflict(String),

    /// Infrastructure failure (500). The message is logged, not returned.
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref detail) = self {
            tracing::error!(detail = %detail, "internal error");
        }
        let body = json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => Self::NotFound(format!("{entity} {id} not found")),
            StorageError::AlreadyExists { entity, key } => {
                Self::Conflict(format!("{entity} {key} already exists"))
            }
            StorageError::InvalidInput { message } => Self::Validation(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<taskd_auth::AuthError> for ApiError {
    fn from(_: taskd_auth::AuthError) -> Self {
        Self::Unauthorized
    }
}
