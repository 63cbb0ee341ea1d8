use std::time::{Duration, SystemTime};

use axum::http::{HeaderMap, header::COOKIE};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::ServiceError,
    state::{AdminSession, SharedState},
};

/// Cookie carrying the admin session token.
pub const SESSION_COOKIE: &str = "scoreboard_session";

/// Message shown on the login form after a rejected attempt.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Check the operator credentials and open a new session, returning its token.
pub fn login(state: &SharedState, username: &str, password: &str) -> Result<String, ServiceError> {
    if !state.config().accepts_credentials(username, password) {
        warn!(username, "rejected admin login");
        return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let ttl = state.config().session_ttl;
    state.sessions().retain(|_, session| !is_expired(session, ttl));

    let token = Uuid::new_v4().simple().to_string();
    state.sessions().insert(
        token.clone(),
        AdminSession {
            username: username.to_string(),
            created_at: SystemTime::now(),
        },
    );
    info!(username, "admin logged in");
    Ok(token)
}

/// Forget the session, if any. Unknown tokens are ignored.
pub fn logout(state: &SharedState, token: Option<&str>) {
    if let Some((_, session)) = token.and_then(|token| state.sessions().remove(token)) {
        info!(username = %session.username, "admin logged out");
    }
}

/// Whether `token` names a live session. An expired session is dropped on sight.
pub fn is_authenticated(state: &SharedState, token: Option<&str>) -> bool {
    let Some(token) = token else {
        return false;
    };
    let expired = match state.sessions().get(token) {
        Some(session) => is_expired(&session, state.config().session_ttl),
        None => return false,
    };
    if expired {
        if let Some((_, session)) = state.sessions().remove(token) {
            info!(username = %session.username, "admin session expired");
        }
        return false;
    }
    true
}

fn is_expired(session: &AdminSession, ttl: Duration) -> bool {
    session
        .created_at
        .elapsed()
        .is_ok_and(|age| age >= ttl)
}

/// Extract the session token from the request's `Cookie` headers.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value establishing the session.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value that removes the session cookie from the browser.
pub fn cleared_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}
