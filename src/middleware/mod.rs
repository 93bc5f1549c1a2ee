//! HTTP middleware and request-pipeline components.
//!
//! - **CORS**: Permissive policy, `OPTIONS` answered with 204 up front
//! - **Observability**: One log line and one metrics sample per request
//! - **Rate Limiting**: Per-client fixed one-second window
//! - **Bearer Authentication**: HS256 JWT validation when a secret is set
//! - **Request ID**: Correlation ID reuse or UUIDv4 generation
//!
//! # Architecture
//!
//! ```text
//! Request → CORS → Observability → Router ─┬─ /health, /metrics
//!             ↓                             └─ /v1/chat: Rate → Auth → Request ID → upstream
//!        204 pre-flight                                   ↓      ↓
//!                                                        429    401
//! ```
//!
//! Rate limiting, authentication and request IDs are only applied on the chat
//! route, so they are plain components called by the proxy handler rather
//! than layers.

pub mod auth;
pub mod cors;
pub mod ip;
pub mod observability;
pub mod rate_limit;
pub mod request_id;

pub use auth::{AuthError, TokenValidator, validate_token};
pub use cors::CorsLayer;
pub use ip::{UNKNOWN_CLIENT, extract_client_id};
pub use observability::observe;
pub use rate_limit::FixedWindowLimiter;
pub use request_id::{
    REQUEST_ID_HEADER, display_request_id, generate_request_id, resolve_request_id,
};
