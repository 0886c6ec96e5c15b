use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Handler-level failures, rendered to the client as `{"error": message}`.
///
/// `InvalidCredentials` carries the same message for an unknown email and a
/// wrong password so callers cannot enumerate registered identities.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Email already in use")]
    DuplicateIdentity,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("database error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateIdentity => StatusCode::CONFLICT,
            ApiError::InvalidCredentials | ApiError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
