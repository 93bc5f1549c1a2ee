//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (outermost first)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │      CORS        │ ← 204 for OPTIONS, headers on everything else
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  Observability   │ ← log line + metrics per request
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │    Timeouts      │ ← body read ceiling, response ceiling (408)
//! └────────┬─────────┘
//!          │
//!          ▼
//!      Handler
//! ```
//!
//! # Routes
//!
//! - `/health` - Fixed health payload (GET only)
//! - `/metrics` - Prometheus exposition
//! - `/v1/chat` - Reverse proxy to the inference service (POST only)
//!
//! Routes use `any` and check the method themselves so that rejections go
//! through the same JSON error envelope (and, for chat, carry the request ID).

use axum::Router;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::any;
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};
use tracing::info;

use crate::handlers;
use crate::middleware::{CorsLayer, observe};
use crate::state::AppState;

/// Build the application router with all routes and middleware configured.
pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    if config.rate_limiting_enabled() {
        info!(rps = config.rate_limit_rps, "Rate limiting enabled");
    } else {
        info!("Rate limiting disabled (RATE_LIMIT_RPS <= 0)");
    }

    Router::new()
        .route("/health", any(handlers::health_check))
        .route("/metrics", any(handlers::metrics))
        .route("/v1/chat", any(handlers::proxy_chat))
        // Applied bottom to top: the last layer runs first
        .layer(RequestBodyTimeoutLayer::new(config.read_timeout))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.write_timeout,
        ))
        .layer(from_fn_with_state(state.clone(), observe))
        .layer(CorsLayer::new())
        .with_state(state)
}
