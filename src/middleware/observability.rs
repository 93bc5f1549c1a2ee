//! Per-request logging and metrics.
//!
//! Wraps every routed request (everything except CORS pre-flights, which are
//! answered before reaching this layer). After the inner service completes it:
//!
//! 1. emits one `info` record with `method`, `path`, `status`, `duration_ms`,
//!    `request_id` and `client_ip`
//! 2. increments `gateway_requests_total{method,path,status}`
//! 3. observes `gateway_request_latency_seconds{path}`
//!
//! The status is read from the response actually produced, so rejections
//! (401, 429, 502, ...) and timeouts are counted as what the caller saw.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

use super::ip::extract_client_id;
use super::request_id::{REQUEST_ID_HEADER, display_request_id};
use crate::state::AppState;

/// Axum middleware recording one log line and one metrics sample per request.
///
/// Install with `axum::middleware::from_fn_with_state(state, observe)`.
pub async fn observe(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let client_ip = extract_client_id(&req).into_owned();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status().as_u16();
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .map(display_request_id)
        .unwrap_or_default();

    state
        .metrics
        .record_request(&method, &path, status, duration);

    info!(
        method = %method,
        path = %path,
        status,
        duration_ms = duration.as_millis() as u64,
        request_id = %request_id,
        client_ip = %client_ip,
        "request"
    );

    response
}
