use serde::Serialize;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "gateway";

/// Health check response.
///
/// The payload is fixed; the gateway does not probe the inference backend.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process is serving
    pub status: &'static str,
    /// Service name
    pub service: &'static str,
    /// Service version
    pub version: &'static str,
}

impl HealthResponse {
    /// Health payload for this build.
    pub fn current() -> Self {
        Self {
            status: "ok",
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
