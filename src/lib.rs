//! # Chat Gateway
//!
//! Request-handling core of the API gateway in front of the chat inference
//! service:
//!
//! - **Security**: Optional HS256 bearer authentication, per-client rate limiting
//! - **Proxying**: Content-agnostic relay of `POST /v1/chat` to the inference backend
//! - **Observability**: Correlation IDs, structured request logs, Prometheus metrics
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (CORS → Observability → Timeouts)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (health, metrics, chat)                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Chat pipeline (Rate Limit → Auth → Request ID → Upstream)  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Inference service (opaque HTTP peer)                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chat_gateway::{AppState, Config, build_router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let addr = config.server_addr();
//!     let state = AppState::new(config)?;
//!     let app = build_router(state);
//!
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Security Configuration
//!
//! Enable bearer authentication:
//! ```bash
//! JWT_SECRET=your-secret cargo run
//! ```
//!
//! Change the per-client budget (0 disables limiting):
//! ```bash
//! RATE_LIMIT_RPS=20 cargo run
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
pub use metrics::MetricsRegistry;
pub use routes::build_router;
pub use state::AppState;
