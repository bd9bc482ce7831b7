//! Resolving an inbound request's cookie to a live session.

use axum::http::HeaderMap;
use chrono::Utc;
use tracing::debug;

use super::session::{is_expired, AuthenticatedSession, SessionStore};

/// Cookie carrying the session id, as issued by the login endpoint.
pub const SESSION_COOKIE: &str = "sessionId";

/// Pull a single cookie value out of the `Cookie` header, if present.
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name {
                return Some(v[1..].to_string());
            }
        }
    }
    None
}

/// Resolve the request's `sessionId` cookie against the store.
///
/// `None` covers every unauthenticated shape the same way: no cookie, empty
/// value, unknown id, or expired session. An expired entry is deleted on the
/// way out (lazy eviction); nothing else is touched, and the user directory
/// is never consulted here.
pub fn authenticate(store: &SessionStore, headers: &HeaderMap) -> Option<AuthenticatedSession> {
    let session_id = parse_cookie(headers, SESSION_COOKIE)?;
    if session_id.is_empty() {
        return None;
    }
    let session = store.get(&session_id)?;
    if is_expired(&session, Utc::now()) {
        store.delete(&session_id);
        debug!(sid = %session_id, "evicted expired session");
        return None;
    }
    Some(AuthenticatedSession { session_id, session })
}
