//! Prometheus scrape endpoint.
//!
//! No authentication or rate limiting is applied to this route.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;

use crate::metrics::EXPOSITION_CONTENT_TYPE;
use crate::state::AppState;

/// Render the metrics registry in text exposition format.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        state.metrics.render(),
    )
}
