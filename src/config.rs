//! Gateway configuration loaded from environment variables.
//!
//! # Configuration Hierarchy
//!
//! All configuration is loaded from environment variables with defaults suited
//! to the compose deployment. A `.env` file is honoured when present.
//!
//! Every option is defaulted independently and malformed values never fail
//! startup: an empty or unparsable value silently falls back to its default.
//!
//! # Recognised Variables
//!
//! - `INFERENCE_BASE_URL`: Base URL of the inference backend (default: `http://inference:8000`)
//! - `JWT_SECRET`: HS256 shared secret; unset or empty disables authentication
//! - `RATE_LIMIT_RPS`: Requests per second per client (default: 5, `<= 0` disables limiting)
//! - `PORT`: Listen port (default: 8080)
//! - `HOST`: Listen address (default: `0.0.0.0`)

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default upstream the gateway proxies chat requests to.
pub const DEFAULT_INFERENCE_BASE_URL: &str = "http://inference:8000";

/// Default per-client requests-per-second budget.
pub const DEFAULT_RATE_LIMIT_RPS: i64 = 5;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Ceiling on a single upstream call (connect + full response).
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Ceiling on reading the inbound request body.
pub const READ_TIMEOUT: Duration = Duration::from_secs(15);

/// Ceiling on producing the response for an inbound request.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(60);

/// Immutable startup parameters.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env();
/// println!("Proxying to {}", config.upstream_chat_url());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 8080)
    pub port: u16,

    /// Maximum time to wait for the inbound request body
    pub read_timeout: Duration,

    /// Maximum time to produce a response for an inbound request
    pub write_timeout: Duration,

    // =========================================================================
    // Upstream Configuration
    // =========================================================================
    /// Base URL of the inference backend, without the `/v1/chat` suffix
    pub inference_base_url: String,

    /// Timeout applied to each upstream call; there are no retries
    pub upstream_timeout: Duration,

    // =========================================================================
    // Security Configuration
    // =========================================================================
    /// HS256 secret for bearer tokens (None = authentication disabled)
    pub jwt_secret: Option<String>,

    /// Requests per second limit per client (0 or negative disables limiting)
    pub rate_limit_rps: i64,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Self {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests pass a map instead of touching the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            host: non_empty(lookup("HOST")).unwrap_or(defaults.host),
            port: parse_or(lookup("PORT"), defaults.port),
            inference_base_url: non_empty(lookup("INFERENCE_BASE_URL"))
                .unwrap_or(defaults.inference_base_url),
            // The secret is used as-is; only an empty value counts as unset
            jwt_secret: lookup("JWT_SECRET").filter(|s| !s.is_empty()),
            rate_limit_rps: parse_or(lookup("RATE_LIMIT_RPS"), defaults.rate_limit_rps),
            ..defaults
        }
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Full URL of the upstream chat endpoint.
    pub fn upstream_chat_url(&self) -> String {
        format!("{}/v1/chat", self.inference_base_url.trim_end_matches('/'))
    }

    /// Check if rate limiting is enabled.
    pub fn rate_limiting_enabled(&self) -> bool {
        self.rate_limit_rps > 0
    }

    /// Check if bearer token authentication is enabled.
    pub fn auth_enabled(&self) -> bool {
        self.jwt_secret.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            read_timeout: READ_TIMEOUT,
            write_timeout: WRITE_TIMEOUT,
            inference_base_url: DEFAULT_INFERENCE_BASE_URL.to_string(),
            upstream_timeout: UPSTREAM_TIMEOUT,
            jwt_secret: None,
            rate_limit_rps: DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

/// Trimmed value, or `None` when missing or blank.
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse a variable, falling back to `default` when missing, blank, or malformed.
fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    non_empty(raw)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_config_values() {
        let config = config_from(&[]);

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.inference_base_url, "http://inference:8000");
        assert_eq!(config.rate_limit_rps, 5);
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn test_values_from_environment() {
        let config = config_from(&[
            ("INFERENCE_BASE_URL", "http://backend:9000"),
            ("JWT_SECRET", "s3cret"),
            ("RATE_LIMIT_RPS", "20"),
            ("PORT", "9999"),
        ]);

        assert_eq!(config.inference_base_url, "http://backend:9000");
        assert_eq!(config.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.rate_limit_rps, 20);
        assert_eq!(config.port, 9999);
    }

    #[test]
    fn test_malformed_numbers_fall_back_to_defaults() {
        let config = config_from(&[("RATE_LIMIT_RPS", "lots"), ("PORT", "99999")]);

        assert_eq!(config.rate_limit_rps, 5);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_values_are_trimmed() {
        let config = config_from(&[("RATE_LIMIT_RPS", " 7 "), ("INFERENCE_BASE_URL", "  ")]);

        assert_eq!(config.rate_limit_rps, 7);
        assert_eq!(config.inference_base_url, DEFAULT_INFERENCE_BASE_URL);
    }

    #[test]
    fn test_empty_secret_disables_auth() {
        let config = config_from(&[("JWT_SECRET", "")]);
        assert!(!config.auth_enabled());

        let config = config_from(&[("JWT_SECRET", "key")]);
        assert!(config.auth_enabled());
    }

    #[test]
    fn test_rate_limiting_enabled() {
        assert!(Config::default().rate_limiting_enabled());

        let config = config_from(&[("RATE_LIMIT_RPS", "0")]);
        assert!(!config.rate_limiting_enabled());

        let config = config_from(&[("RATE_LIMIT_RPS", "-3")]);
        assert_eq!(config.rate_limit_rps, -3);
        assert!(!config.rate_limiting_enabled());
    }

    #[test]
    fn test_upstream_chat_url() {
        let config = Config {
            inference_base_url: "http://inference:8000/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.upstream_chat_url(), "http://inference:8000/v1/chat");

        assert_eq!(
            Config::default().upstream_chat_url(),
            "http://inference:8000/v1/chat"
        );
    }

    #[test]
    fn test_server_addr_format() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            ..Config::default()
        };

        assert_eq!(config.server_addr(), "127.0.0.1:3000");
    }
}
