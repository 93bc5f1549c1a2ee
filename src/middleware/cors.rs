//! Permissive CORS policy with pre-flight short-circuit.
//!
//! Every response gets:
//!
//! - `Access-Control-Allow-Origin: *`
//! - `Access-Control-Allow-Methods: GET, POST, OPTIONS`
//! - `Access-Control-Allow-Headers: Content-Type, Authorization, X-Request-Id`
//!
//! Any `OPTIONS` request is treated as a pre-flight probe and answered with
//! `204 No Content` without reaching the inner service.

use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    HeaderValue,
};
use axum::http::{HeaderMap, Method, Request, Response, StatusCode};
use tower::{Layer, Service};

static ALLOW_ORIGIN: HeaderValue = HeaderValue::from_static("*");
static ALLOW_METHODS: HeaderValue = HeaderValue::from_static("GET, POST, OPTIONS");
static ALLOW_HEADERS: HeaderValue =
    HeaderValue::from_static("Content-Type, Authorization, X-Request-Id");

/// CORS layer for Tower middleware stack.
#[derive(Clone, Default)]
pub struct CorsLayer;

impl CorsLayer {
    /// Create a new CORS layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for CorsLayer {
    type Service = CorsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorsService { inner }
    }
}

/// CORS service wrapper.
#[derive(Clone)]
pub struct CorsService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for CorsService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if req.method() == Method::OPTIONS {
            return Box::pin(async move {
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::NO_CONTENT;
                apply_cors_headers(response.headers_mut());
                Ok(response)
            });
        }

        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut response = inner.call(req).await?;
            apply_cors_headers(response.headers_mut());
            Ok(response)
        })
    }
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN.clone());
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS.clone());
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS.clone());
}
