//! Chat reverse proxy: `POST /v1/chat` to `{INFERENCE_BASE_URL}/v1/chat`.
//!
//! # Pipeline
//!
//! ```text
//! Received ─► method ─► rate ─► auth ─► body ─► build ─► dispatch ─► relay
//!               │         │       │       │       │         │
//!              405       429     401     400     500       502
//! ```
//!
//! Checks run cheapest first, and nothing touches the upstream until the rate
//! and auth checks have passed. The upstream is called exactly once, bounded
//! by the client timeout; retries are the caller's business.
//!
//! # Transparency
//!
//! The gateway never parses the request or response payload. A reachable
//! upstream's status, headers and body are relayed as-is (only
//! `Transfer-Encoding` is dropped, since the body is re-framed), with
//! `X-Request-Id` reasserted to the resolved correlation ID.
//!
//! # Known Gaps
//!
//! - The request body is buffered in full with no size cap.
//! - A client disconnect does not cancel the in-flight upstream call.

use axum::body::{Body, Bytes, to_bytes};
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, TRANSFER_ENCODING};
use axum::http::{HeaderMap, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use tracing::{Instrument, debug, info_span};

use crate::error::{AppError, AppResult};
use crate::middleware::ip::extract_client_id;
use crate::middleware::request_id::{
    REQUEST_ID_HEADER, display_request_id, resolve_request_id, set_request_id,
};
use crate::state::AppState;

/// Content type sent upstream when the caller did not specify one.
const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Proxy a chat request to the inference backend.
///
/// Every response, including rejections, carries the resolved `X-Request-Id`.
/// Rejections are logged once, by [`AppError`], inside a span carrying the
/// request ID and client.
pub async fn proxy_chat(State(state): State<AppState>, req: Request) -> Response {
    let request_id = resolve_request_id(req.headers());
    let client_ip = extract_client_id(&req).into_owned();
    let span = info_span!(
        "chat",
        request_id = %display_request_id(&request_id),
        client_ip = %client_ip
    );

    let result = forward(&state, req, &request_id, &client_ip)
        .instrument(span.clone())
        .await;
    let mut response = match result {
        Ok(response) => response,
        Err(err) => span.in_scope(|| err.into_response()),
    };

    set_request_id(response.headers_mut(), &request_id);
    response
}

async fn forward(
    state: &AppState,
    req: Request,
    request_id: &HeaderValue,
    client_ip: &str,
) -> AppResult<Response> {
    if req.method() != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    if !state.rate_limiter.allow(client_ip) {
        return Err(AppError::RateLimited(client_ip.to_string()));
    }

    state.token_validator.validate(req.headers())?;

    let (parts, body) = req.into_parts();
    let body = to_bytes(body, usize::MAX)
        .await
        .map_err(|e| AppError::InvalidBody(e.to_string()))?;

    let upstream_req = build_upstream_request(state, &parts.headers, body, request_id)?;

    debug!(url = %upstream_req.url(), "Dispatching to inference service");
    let upstream = state
        .http_client
        .execute(upstream_req)
        .await
        .map_err(|e| AppError::UpstreamUnreachable(e.to_string()))?;

    Ok(relay_response(upstream))
}

/// Build the single upstream POST carrying the caller's body bytes.
fn build_upstream_request(
    state: &AppState,
    headers: &HeaderMap,
    body: Bytes,
    request_id: &HeaderValue,
) -> AppResult<reqwest::Request> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let mut builder = state
        .http_client
        .post(state.config.upstream_chat_url())
        .header(CONTENT_TYPE, content_type)
        .header(REQUEST_ID_HEADER, request_id.clone())
        .body(body);

    if let Some(auth) = headers.get(AUTHORIZATION) {
        builder = builder.header(AUTHORIZATION, auth.clone());
    }

    builder
        .build()
        .map_err(|e| AppError::RequestBuild(e.to_string()))
}

/// Turn the upstream response into ours without inspecting the payload.
fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = upstream.headers().clone();

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;

    let relayed = response.headers_mut();
    for (name, value) in &headers {
        if *name != TRANSFER_ENCODING {
            relayed.append(name, value.clone());
        }
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::http::StatusCode;

    fn state(config: Config) -> AppState {
        AppState::new(config).unwrap()
    }

    #[test]
    fn test_upstream_request_forwards_headers_and_body() {
        let state = state(Config {
            inference_base_url: "http://inference:8000".to_string(),
            ..Config::default()
        });
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        headers.insert("x-unrelated", HeaderValue::from_static("dropped"));

        let req = build_upstream_request(
            &state,
            &headers,
            Bytes::from_static(br#"{"query":"hi"}"#),
            &HeaderValue::from_static("req-1"),
        )
        .unwrap();

        assert_eq!(req.method(), reqwest::Method::POST);
        assert_eq!(req.url().as_str(), "http://inference:8000/v1/chat");
        assert_eq!(req.headers().get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(
            req.headers().get(CONTENT_TYPE).unwrap(),
            "application/json; charset=utf-8"
        );
        assert_eq!(req.headers().get(REQUEST_ID_HEADER).unwrap(), "req-1");
        assert!(req.headers().get("x-unrelated").is_none());
        assert_eq!(
            req.body().and_then(|b| b.as_bytes()).unwrap(),
            br#"{"query":"hi"}"#
        );
    }

    #[test]
    fn test_upstream_request_keeps_non_ascii_request_id() {
        let state = state(Config::default());
        let request_id = HeaderValue::from_bytes(b"trace-\xe9t\xe9").unwrap();

        let req =
            build_upstream_request(&state, &HeaderMap::new(), Bytes::new(), &request_id).unwrap();

        assert_eq!(
            req.headers().get(REQUEST_ID_HEADER).unwrap().as_bytes(),
            b"trace-\xe9t\xe9"
        );
    }

    #[test]
    fn test_upstream_request_defaults_content_type() {
        let state = state(Config::default());

        let req = build_upstream_request(
            &state,
            &HeaderMap::new(),
            Bytes::new(),
            &HeaderValue::from_static("req-2"),
        )
        .unwrap();

        assert_eq!(req.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_invalid_upstream_url_is_build_error() {
        let state = state(Config {
            inference_base_url: "not a url".to_string(),
            ..Config::default()
        });

        let err = build_upstream_request(
            &state,
            &HeaderMap::new(),
            Bytes::new(),
            &HeaderValue::from_static("req-3"),
        )
        .unwrap_err();

        assert!(matches!(err, AppError::RequestBuild(_)));
        assert_eq!(
            err.status_and_message().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
