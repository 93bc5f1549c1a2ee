//! Health endpoint.
//!
//! `GET /health` always answers 200 with a fixed payload while the process is
//! serving; any other method gets 405.
//!
//! # Response Body
//!
//! ```json
//! {
//!   "status": "ok",
//!   "service": "gateway",
//!   "version": "0.1.0"
//! }
//! ```

use axum::Json;
use axum::http::Method;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::models::HealthResponse;

/// Health check endpoint.
pub async fn health_check(method: Method) -> Response {
    if method != Method::GET {
        return AppError::MethodNotAllowed.into_response();
    }

    Json(HealthResponse::current()).into_response()
}
