//! Bearer token (JWT) authentication.
//!
//! # Accepted Credentials
//!
//! `Authorization: Bearer <token>` where `<token>` is a JWT signed with
//! HS256 under the configured `JWT_SECRET`. Any other algorithm is rejected,
//! including other HMAC widths and asymmetric algorithms, so an attacker cannot
//! switch the verifier onto a different key family.
//!
//! `exp` and `nbf` are enforced when present, with no clock leeway, but
//! neither is required. Audience is not checked.
//!
//! # Disabled Mode
//!
//! With no secret configured the validator passes every request. The gateway
//! logs a single warning at startup when this happens.
//!
//! ```bash
//! JWT_SECRET=change-me cargo run
//! curl -H "Authorization: Bearer $TOKEN" -d '{"query":"hi"}' http://localhost:8080/v1/chat
//! ```

use std::collections::HashMap;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use thiserror::Error;

/// The only signing algorithm accepted.
pub const ACCEPTED_ALGORITHM: Algorithm = Algorithm::HS256;

/// Why a bearer credential was rejected.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,

    #[error("invalid authorization header")]
    MalformedHeader,

    #[error("unexpected signing method")]
    UnsupportedAlgorithm,

    #[error("token expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("signature does not verify")]
    BadSignature,

    #[error("invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                AuthError::UnsupportedAlgorithm
            }
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::ImmatureSignature => AuthError::NotYetValid,
            ErrorKind::InvalidSignature => AuthError::BadSignature,
            _ => AuthError::InvalidToken(err),
        }
    }
}

/// Validate the bearer credential in `headers` against `secret`.
///
/// Succeeds silently; every failure mode maps to an [`AuthError`].
pub fn validate_token(headers: &HeaderMap, secret: &str) -> Result<(), AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    verify(headers, &key, &validation())
}

/// Bearer token validator built once from configuration.
///
/// Holds the decoding key so it is not rebuilt per request.
#[derive(Clone)]
pub struct TokenValidator {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl TokenValidator {
    /// Create a validator; `None` disables authentication.
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            key: secret.map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation: validation(),
        }
    }

    /// Check if authentication is enabled.
    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Validate the request's credential, or pass when disabled.
    pub fn validate(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        match &self.key {
            Some(key) => verify(headers, key, &self.validation),
            None => Ok(()),
        }
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(ACCEPTED_ALGORITHM);
    validation.required_spec_claims.clear();
    validation.leeway = 0;
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation
}

fn verify(headers: &HeaderMap, key: &DecodingKey, validation: &Validation) -> Result<(), AuthError> {
    let token = bearer_token(headers)?;
    decode::<HashMap<String, serde_json::Value>>(token, key, validation)?;
    Ok(())
}

/// Pull `<token>` out of `Authorization: Bearer <token>`.
///
/// The scheme is case-insensitive and the header must hold exactly two
/// whitespace-separated fields.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    if value.trim().is_empty() {
        return Err(AuthError::MissingHeader);
    }

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}
