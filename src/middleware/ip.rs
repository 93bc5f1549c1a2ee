//! Client identifier extraction.
//!
//! The identifier keys the per-client rate limit and appears in every request
//! log line.
//!
//! # Resolution Order
//!
//! 1. First entry of `X-Forwarded-For` (trimmed)
//! 2. Peer address from axum's `ConnectInfo<SocketAddr>` extension
//! 3. [`UNKNOWN_CLIENT`]
//!
//! # Security Warning: IP Spoofing Risk
//!
//! `X-Forwarded-For` is client-controlled. Unless the gateway sits behind a
//! proxy that overwrites the header, callers can rotate it to dodge the rate
//! limit.
//!
//! ## The "unknown" Fallback
//!
//! All requests without an identifiable source share the `"unknown"` key and
//! therefore one rate-limit budget.

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;

/// Fallback identifier when no client address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Header set by reverse proxies carrying the original client address.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Extract the client identifier for a request.
///
/// Returns `Cow::Borrowed` for the `"unknown"` fallback so the common
/// unidentified case does not allocate.
#[inline]
pub fn extract_client_id<B>(req: &Request<B>) -> Cow<'static, str> {
    // Format: "client, proxy1, proxy2" - we want the first (client) entry
    if let Some(forwarded) = req.headers().get(FORWARDED_FOR_HEADER)
        && let Ok(value) = forwarded.to_str()
        && let Some(first) = value.split(',').next().map(str::trim)
        && !first.is_empty()
    {
        return Cow::Owned(first.to_string());
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return Cow::Owned(addr.ip().to_string());
    }

    Cow::Borrowed(UNKNOWN_CLIENT)
}
