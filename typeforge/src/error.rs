use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::quota::QuotaError;
use crate::validator::Rejection;

/// All errors a request handler can surface.
///
/// Anti-cheat rejections deliberately collapse into one generic outward
/// message; the precise reason is logged server-side only, so a client
/// probing the boundary learns nothing about the thresholds. Quota errors
/// are ordinary user-facing state and keep their specific messages.
#[derive(Debug, Error)]
pub enum AppError {
    /// A plausibility gate refused the submission (HTTP 400).
    #[error("invalid input detected")]
    Rejected(#[from] Rejection),

    /// Daily-quota or rate-limit refusal (HTTP 403 / 429).
    #[error("{0}")]
    Quota(#[from] QuotaError),

    /// The payload failed basic schema checks before any business logic ran
    /// (HTTP 400).
    #[error("malformed request body")]
    Malformed(String),

    /// Database failure (HTTP 500).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else that should never reach a client verbatim (HTTP 500).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Rejected(reason) => {
                // The internal reason stays in the logs only
                tracing::warn!("attempt rejected: {reason}");
                (StatusCode::BAD_REQUEST, "invalid input detected".to_string())
            }
            AppError::Quota(ref error) => {
                let status = match error {
                    QuotaError::WrongSnippet | QuotaError::Exhausted => StatusCode::FORBIDDEN,
                    QuotaError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                };
                (status, error.to_string())
            }
            AppError::Malformed(ref detail) => {
                tracing::debug!("malformed request body: {detail}");
                (StatusCode::BAD_REQUEST, "malformed request body".to_string())
            }
            AppError::Database(ref error) => {
                tracing::error!("Database error: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}
