//! Shared application state for Axum handlers.
//!
//! Everything mutable that outlives a request is created here once and handed
//! to handlers and middleware by handle:
//!
//! - **Rate limiter**: per-client fixed-window counters
//! - **Token validator**: prebuilt HS256 decoding key (or disabled)
//! - **Metrics registry**: request counters and latency histograms
//! - **HTTP client**: pooled upstream client with a fixed timeout
//!
//! # Thread Safety
//!
//! All components are behind `Arc` or are cheaply clonable handles
//! (`reqwest::Client`), so cloning the state per request is cheap.

use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::metrics::MetricsRegistry;
use crate::middleware::auth::TokenValidator;
use crate::middleware::rate_limit::FixedWindowLimiter;

/// Shared application state for Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Per-client admission control
    pub rate_limiter: Arc<FixedWindowLimiter>,
    /// Bearer credential verification
    pub token_validator: Arc<TokenValidator>,
    /// Request metrics
    pub metrics: Arc<MetricsRegistry>,
    /// Client used for upstream calls
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the metrics registry or HTTP client
    /// cannot be constructed.
    pub fn new(config: Config) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        let metrics = MetricsRegistry::new()
            .map_err(|e| AppError::Config(format!("Failed to build metrics registry: {e}")))?;

        Ok(Self {
            rate_limiter: Arc::new(FixedWindowLimiter::new(config.rate_limit_rps)),
            token_validator: Arc::new(TokenValidator::new(config.jwt_secret.as_deref())),
            metrics: Arc::new(metrics),
            http_client,
            config: Arc::new(config),
        })
    }
}
