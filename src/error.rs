use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::middleware::auth::AuthError;

/// Gateway error taxonomy with the HTTP status each variant maps to.
///
/// Every variant is terminal for the request that produced it; nothing here
/// is retried. Clients only ever see the short message in the JSON envelope,
/// the cause is logged server-side.
///
/// An upstream that answers with an error status is *not* an `AppError`:
/// its status and body are relayed unchanged.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Failed to read request body: {0}")]
    InvalidBody(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(#[from] AuthError),

    #[error("Rate limit exceeded for client {0}")]
    RateLimited(String),

    #[error("Inference service unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Failed to build upstream request: {0}")]
    RequestBuild(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Minimal error envelope returned to callers.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl AppError {
    /// Status code and client-facing message for this error.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
            AppError::InvalidBody(_) => (StatusCode::BAD_REQUEST, "invalid request body"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded"),
            AppError::UpstreamUnreachable(_) => {
                (StatusCode::BAD_GATEWAY, "inference service unreachable")
            }
            AppError::RequestBuild(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to build request")
            }
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Full cause stays in the logs
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
