//! Session records, the shared session store, and the lifecycle manager.
//!
//! Sessions live only in process memory; a restart logs everyone out, which is
//! acceptable because re-login is cheap. There is no background sweeper:
//! expired entries are removed lazily when authentication next touches them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

/// One authenticated login: an opaque id bound to a username and an absolute
/// expiry instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub session_id: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Pairing of id and record produced by a successful authentication.
/// Transient: exists only while a single request is being handled.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub session_id: String,
    pub session: Session,
}

/// Shared map of live sessions keyed by session id.
///
/// A cheap-to-clone handle; every clone sees the same underlying map. The
/// store is injected into request state rather than held as a process global,
/// so tests can run against their own instance.
#[derive(Debug, Clone, Default)]
pub struct SessionStore(Arc<RwLock<HashMap<String, Session>>>);

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite by session id.
    pub fn put(&self, session: Session) {
        self.0.write().insert(session.session_id.clone(), session);
    }

    /// Absence is a normal outcome, never an error.
    pub fn get(&self, session_id: &str) -> Option<Session> {
        self.0.read().get(session_id).cloned()
    }

    /// Idempotent: deleting an unknown id is a no-op.
    pub fn delete(&self, session_id: &str) {
        self.0.write().remove(session_id);
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }
}

fn gen_id() -> String {
    // 256-bit random token, base64url without padding
    let mut buf = [0u8; 32];
    let _ = getrandom::getrandom(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

/// `true` iff the session has expired as of `now`. Expiry is inclusive: a
/// session is dead the instant `now` reaches `expires_at`.
pub fn is_expired(session: &Session, now: DateTime<Utc>) -> bool {
    now >= session.expires_at
}

/// Creates, renews, and deletes sessions against a [`SessionStore`].
///
/// The TTL is deliberately short (2 minutes by default) so that a stolen
/// cookie has a small blast radius; callers extend a session's life by
/// explicitly renewing it, so idle sessions die on their own.
#[derive(Debug, Clone)]
pub struct SessionManager {
    pub ttl: Duration,
}

pub const DEFAULT_TTL_MINUTES: u64 = 2;

impl Default for SessionManager {
    fn default() -> Self {
        Self { ttl: Duration::from_secs(DEFAULT_TTL_MINUTES * 60) }
    }
}

impl SessionManager {
    pub fn with_ttl_minutes(minutes: u64) -> Self {
        Self { ttl: Duration::from_secs(minutes * 60) }
    }

    /// Issue a fresh session for `username` and store it. The id is a
    /// cryptographically random token, never a counter.
    pub fn create(&self, store: &SessionStore, username: &str) -> Session {
        let session = Session {
            session_id: gen_id(),
            username: username.to_string(),
            expires_at: Utc::now() + self.ttl,
        };
        store.put(session.clone());
        debug!(user = username, sid = %session.session_id, ttl_secs = self.ttl.as_secs(), "session.create");
        session
    }

    /// Replace `old_session_id` with a brand new session for `username`:
    /// fresh id, fresh expiry, and no stale entry left behind.
    pub fn renew(&self, store: &SessionStore, old_session_id: &str, username: &str) -> Session {
        store.delete(old_session_id);
        let session = self.create(store, username);
        debug!(user = username, old_sid = old_session_id, new_sid = %session.session_id, "session.renew");
        session
    }

    /// Logout path. Idempotent like the store delete beneath it.
    pub fn delete(&self, store: &SessionStore, session_id: &str) {
        store.delete(session_id);
        debug!(sid = session_id, "session.delete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn expiry_boundary_is_inclusive() {
        let t0 = Utc::now();
        let ttl = TimeDelta::minutes(2);
        let s = Session {
            session_id: "s".into(),
            username: "alice".into(),
            expires_at: t0 + ttl,
        };
        assert!(!is_expired(&s, t0));
        assert!(!is_expired(&s, t0 + ttl - TimeDelta::milliseconds(1)));
        assert!(is_expired(&s, t0 + ttl));
        assert!(is_expired(&s, t0 + ttl + TimeDelta::seconds(30)));
    }

    #[test]
    fn created_sessions_have_unique_ids() {
        let store = SessionStore::new();
        let sm = SessionManager::default();
        let a = sm.create(&store, "alice");
        let b = sm.create(&store, "alice");
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn create_sets_expiry_to_now_plus_ttl() {
        let store = SessionStore::new();
        let sm = SessionManager::with_ttl_minutes(2);
        let before = Utc::now();
        let s = sm.create(&store, "alice");
        let after = Utc::now();
        assert!(s.expires_at >= before + TimeDelta::minutes(2));
        assert!(s.expires_at <= after + TimeDelta::minutes(2));
    }

    #[test]
    fn renew_swaps_the_entry() {
        let store = SessionStore::new();
        let sm = SessionManager::default();
        let old = sm.create(&store, "alice");
        let new = sm.renew(&store, &old.session_id, "alice");
        assert_ne!(old.session_id, new.session_id);
        assert!(store.get(&old.session_id).is_none());
        assert_eq!(store.get(&new.session_id), Some(new));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = SessionStore::new();
        let sm = SessionManager::default();
        let s = sm.create(&store, "alice");
        sm.delete(&store, &s.session_id);
        assert!(store.get(&s.session_id).is_none());
        // deleting again must not panic or error
        sm.delete(&store, &s.session_id);
        sm.delete(&store, "never-existed");
        assert!(store.is_empty());
    }
}
