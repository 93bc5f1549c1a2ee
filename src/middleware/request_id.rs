//! Correlation identifiers for proxied requests.
//!
//! # Features
//!
//! - Reuses a caller-supplied `X-Request-Id` verbatim
//! - Otherwise generates a UUIDv4 from 128 OS-random bits
//! - Falls back to a nanosecond timestamp if the OS RNG fails, rather than
//!   failing the request
//!
//! The resolved identifier is sent to the inference backend and echoed on the
//! response, so one value joins the gateway log line with backend logs.
//!
//! ```bash
//! curl -H "X-Request-Id: my-correlation-id" -d '{}' http://localhost:8080/v1/chat
//! ```

use std::borrow::Cow;

use axum::http::header::HeaderValue;
use axum::http::{HeaderMap, HeaderName};
use chrono::Utc;
use rand::TryRngCore;
use rand::rngs::OsRng;
use tracing::warn;
use uuid::Builder;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Reuse the caller's request ID byte-for-byte or generate a new one.
///
/// Any non-empty header value is kept, including non-ASCII (obs-text) bytes.
pub fn resolve_request_id(headers: &HeaderMap) -> HeaderValue {
    match headers.get(REQUEST_ID_HEADER) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => new_request_id(),
    }
}

/// Generate a UUIDv4 string (version nibble 4, RFC 4122 variant bits).
pub fn generate_request_id() -> String {
    let mut bytes = [0u8; 16];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => Builder::from_random_bytes(bytes).into_uuid().to_string(),
        Err(e) => {
            warn!(error = %e, "OS randomness unavailable, using timestamp request ID");
            fallback_request_id()
        }
    }
}

/// Lossy text form of a request ID for log fields.
pub fn display_request_id(value: &HeaderValue) -> Cow<'_, str> {
    String::from_utf8_lossy(value.as_bytes())
}

/// Set the request ID header, replacing any existing value.
pub fn set_request_id(headers: &mut HeaderMap, request_id: &HeaderValue) {
    headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), request_id.clone());
}

// Generated IDs are hex digits and hyphens, or decimal digits
fn new_request_id() -> HeaderValue {
    HeaderValue::try_from(generate_request_id())
        .unwrap_or_else(|_| HeaderValue::from(fallback_nanos()))
}

fn fallback_request_id() -> String {
    fallback_nanos().to_string()
}

fn fallback_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use uuid::{Uuid, Variant, Version};

    #[test]
    fn test_existing_request_id_reused() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("existing-id-123"));

        assert_eq!(resolve_request_id(&headers), "existing-id-123");
    }

    #[test]
    fn test_non_ascii_request_id_reused_verbatim() {
        let caller = HeaderValue::from_bytes(b"trace-\xe9t\xe9").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, caller);

        let resolved = resolve_request_id(&headers);

        assert_eq!(resolved.as_bytes(), b"trace-\xe9t\xe9");
        assert_eq!(display_request_id(&resolved), "trace-\u{fffd}t\u{fffd}");
    }

    #[test]
    fn test_empty_request_id_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(""));

        let id = resolve_request_id(&headers);
        assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_generated_id_is_uuid_v4() {
        let id = generate_request_id();
        let uuid = Uuid::parse_str(&id).unwrap();

        assert_eq!(uuid.get_version(), Some(Version::Random));
        assert_eq!(uuid.get_variant(), Variant::RFC4122);
        // 8-4-4-4-12 hex layout with the version nibble in place
        assert_eq!(id.len(), 36);
        assert_eq!(id.as_bytes()[14], b'4');
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(generate_request_id(), generate_request_id());
    }

    #[test]
    fn test_fallback_is_numeric() {
        let id = fallback_request_id();
        assert!(id.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_set_request_id_overwrites() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("from-upstream"));

        set_request_id(&mut headers, &HeaderValue::from_static("resolved"));

        assert_eq!(headers.get_all(REQUEST_ID_HEADER).iter().count(), 1);
        assert_eq!(headers.get(REQUEST_ID_HEADER).unwrap(), "resolved");
    }
}
