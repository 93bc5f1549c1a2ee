//! Prometheus metrics for gateway observability.
//!
//! The registry is an explicit object created at startup and shared through
//! [`AppState`](crate::state::AppState). Its recorder is never installed as
//! the global `metrics` recorder; every update runs under
//! [`metrics::with_local_recorder`], so separate registries (one per test
//! router, say) never see each other's samples.
//!
//! # Available Metrics
//!
//! ## Counters
//! - `gateway_requests_total` - Total requests (labels: method, path, status)
//!
//! ## Histograms
//! - `gateway_request_latency_seconds` - Request latency (label: path), using
//!   the Prometheus default buckets
//!
//! # Exposition
//!
//! [`MetricsRegistry::render`] produces the Prometheus text format served by
//! `GET /metrics`.

use std::time::Duration;

use metrics::{Unit, counter, describe_counter, describe_histogram, histogram, with_local_recorder};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};

/// Metric names as constants for consistency.
pub mod names {
    pub const REQUESTS_TOTAL: &str = "gateway_requests_total";
    pub const REQUEST_LATENCY_SECONDS: &str = "gateway_request_latency_seconds";
}

/// Standard Prometheus client latency buckets, in seconds.
pub const LATENCY_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Content type of the text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Request counters and latency histograms for the lifetime of the process.
pub struct MetricsRegistry {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Build a registry with latency buckets configured.
    ///
    /// # Errors
    ///
    /// Returns `BuildError` if the bucket configuration is rejected.
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(names::REQUEST_LATENCY_SECONDS.to_string()),
                &LATENCY_BUCKETS,
            )?
            .build_recorder();
        let handle = recorder.handle();

        with_local_recorder(&recorder, || {
            describe_counter!(names::REQUESTS_TOTAL, "Total gateway requests");
            describe_histogram!(
                names::REQUEST_LATENCY_SECONDS,
                Unit::Seconds,
                "Gateway request latency in seconds"
            );
        });

        Ok(Self { recorder, handle })
    }

    /// Record one completed request.
    pub fn record_request(&self, method: &str, path: &str, status: u16, duration: Duration) {
        with_local_recorder(&self.recorder, || {
            counter!(
                names::REQUESTS_TOTAL,
                "method" => method.to_string(),
                "path" => path.to_string(),
                "status" => status.to_string()
            )
            .increment(1);
            histogram!(names::REQUEST_LATENCY_SECONDS, "path" => path.to_string())
                .record(duration.as_secs_f64());
        });
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_renders() {
        let registry = MetricsRegistry::new().unwrap();
        assert!(!registry.render().contains("gateway_requests_total{"));
    }

    #[test]
    fn test_record_request_updates_counter_and_histogram() {
        let registry = MetricsRegistry::new().unwrap();

        registry.record_request("POST", "/v1/chat", 200, Duration::from_millis(30));
        registry.record_request("POST", "/v1/chat", 200, Duration::from_millis(40));
        registry.record_request("POST", "/v1/chat", 429, Duration::from_millis(1));

        let output = registry.render();
        assert!(output.contains("gateway_requests_total{"));
        assert!(output.contains(r#"status="429""#));
        assert!(output.contains(r#"method="POST""#));
        assert!(output.contains("gateway_request_latency_seconds_bucket{"));
        assert!(output.contains(r#"le="0.005""#));
        assert!(output.contains("gateway_request_latency_seconds_count"));
    }

    #[test]
    fn test_registries_are_isolated() {
        let first = MetricsRegistry::new().unwrap();
        let second = MetricsRegistry::new().unwrap();

        first.record_request("GET", "/health", 200, Duration::from_millis(1));

        assert!(first.render().contains(r#"path="/health""#));
        assert!(!second.render().contains(r#"path="/health""#));
    }
}
