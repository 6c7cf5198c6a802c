//! Admin session management: a single shared secret gates the admin API, and
//! a successful login is carried forward as a signed, short-lived cookie.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::http::HeaderMap;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::state::SharedState;

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "admin_session";
/// How long an admin session stays valid.
pub const SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

const SESSION_SUBJECT: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    iat: u64,
    exp: u64,
}

/// Check the submitted password against the shared secret and mint a session
/// token on match.
pub fn login(state: &SharedState, password: &str) -> Result<String, ServiceError> {
    if password != state.config().admin_password {
        return Err(ServiceError::Unauthorized("invalid password".into()));
    }
    mint_token(&state.config().session_secret)
}

/// Whether the request carries a valid, unexpired session cookie.
pub fn is_authorized(state: &SharedState, headers: &HeaderMap) -> bool {
    session_cookie(headers)
        .map(|token| verify_token(&state.config().session_secret, &token).is_ok())
        .unwrap_or(false)
}

/// Sign a fresh session token.
pub fn mint_token(secret: &str) -> Result<String, ServiceError> {
    let now = unix_now();
    let claims = SessionClaims {
        sub: SESSION_SUBJECT.to_string(),
        iat: now,
        exp: now + SESSION_TTL.as_secs(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| ServiceError::Unauthorized(format!("failed to sign session token: {err}")))
}

/// Validate a session token's signature, expiry and subject.
pub fn verify_token(secret: &str, token: &str) -> Result<(), ServiceError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp"]);
    let decoded = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|err| ServiceError::Unauthorized(format!("invalid session token: {err}")))?;

    if decoded.claims.sub != SESSION_SUBJECT {
        return Err(ServiceError::Unauthorized(
            "session token subject is not allowed".into(),
        ));
    }
    Ok(())
}

/// `Set-Cookie` value installing the session token.
pub fn session_cookie_header(token: &str) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_TTL.as_secs()
    )
}

/// `Set-Cookie` value clearing the session.
pub fn clear_session_cookie_header() -> String {
    format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// Extract the session token from the request's `Cookie` header, if present.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
