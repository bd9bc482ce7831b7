//! Admin authorization gate, layered on top of request authentication.

use axum::http::HeaderMap;
use tracing::{error, warn};

use crate::error::AppError;
use crate::users::{Role, UserDirectory};

use super::authenticate::authenticate;
use super::session::{AuthenticatedSession, SessionStore};

/// Admit the request only if it carries a live session whose user holds the
/// `admin` role.
///
/// Outcomes map one-to-one onto the HTTP boundary: `Unauthenticated` (401)
/// for no/invalid/expired session or a session whose user no longer exists,
/// `Forbidden` (403) for a non-admin role, `Internal` (500) when the user
/// directory itself fails. Directory failures are logged here with detail;
/// the caller only ever sees the mapped status.
pub fn require_admin(
    store: &SessionStore,
    users: &dyn UserDirectory,
    headers: &HeaderMap,
) -> Result<AuthenticatedSession, AppError> {
    let Some(auth) = authenticate(store, headers) else {
        return Err(AppError::Unauthenticated);
    };
    let user = match users.get_user(&auth.session.username) {
        Ok(Some(u)) => u,
        Ok(None) => {
            // session outlived its user record; treat as stale
            warn!(user = %auth.session.username, "session references unknown user");
            return Err(AppError::Unauthenticated);
        }
        Err(e) => {
            error!(user = %auth.session.username, "user lookup failed: {e}");
            return Err(AppError::Internal);
        }
    };
    if user.role() != Role::Admin {
        return Err(AppError::Forbidden);
    }
    Ok(auth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::SessionManager;
    use crate::users::{InMemoryUserDirectory, User};
    use anyhow::anyhow;
    use axum::http::HeaderValue;

    struct FailingDirectory;

    impl UserDirectory for FailingDirectory {
        fn get_user(&self, _username: &str) -> anyhow::Result<Option<User>> {
            Err(anyhow!("connection lost"))
        }
        fn put_user(&self, _user: User) -> anyhow::Result<()> {
            Err(anyhow!("connection lost"))
        }
        fn delete_user(&self, _username: &str) -> anyhow::Result<()> {
            Err(anyhow!("connection lost"))
        }
    }

    fn directory_with(username: &str, role: Option<Role>) -> InMemoryUserDirectory {
        let dir = InMemoryUserDirectory::new();
        dir.put_user(User {
            username: username.into(),
            email: format!("{}@example.com", username),
            password: "pw".into(),
            role,
        })
        .unwrap();
        dir
    }

    fn session_headers(store: &SessionStore, username: &str) -> HeaderMap {
        let s = SessionManager::default().create(store, username);
        let mut h = HeaderMap::new();
        h.insert(
            "cookie",
            HeaderValue::from_str(&format!("sessionId={}", s.session_id)).unwrap(),
        );
        h
    }

    #[test]
    fn no_session_is_unauthenticated() {
        let store = SessionStore::new();
        let dir = directory_with("alice", Some(Role::Admin));
        let out = require_admin(&store, &dir, &HeaderMap::new());
        assert_eq!(out.unwrap_err(), AppError::Unauthenticated);
    }

    #[test]
    fn stale_session_for_deleted_user_is_unauthenticated() {
        let store = SessionStore::new();
        let dir = InMemoryUserDirectory::new();
        let h = session_headers(&store, "ghost");
        let out = require_admin(&store, &dir, &h);
        assert_eq!(out.unwrap_err(), AppError::Unauthenticated);
    }

    #[test]
    fn plain_user_role_is_forbidden() {
        let store = SessionStore::new();
        let dir = directory_with("bob", Some(Role::User));
        let h = session_headers(&store, "bob");
        assert_eq!(require_admin(&store, &dir, &h).unwrap_err(), AppError::Forbidden);
    }

    #[test]
    fn missing_role_field_is_forbidden() {
        let store = SessionStore::new();
        let dir = directory_with("carol", None);
        let h = session_headers(&store, "carol");
        assert_eq!(require_admin(&store, &dir, &h).unwrap_err(), AppError::Forbidden);
    }

    #[test]
    fn admin_role_is_allowed_through() {
        let store = SessionStore::new();
        let dir = directory_with("alice", Some(Role::Admin));
        let h = session_headers(&store, "alice");
        let auth = require_admin(&store, &dir, &h).expect("admin allowed");
        assert_eq!(auth.session.username, "alice");
    }

    #[test]
    fn directory_failure_maps_to_internal() {
        let store = SessionStore::new();
        let h = session_headers(&store, "alice");
        let out = require_admin(&store, &FailingDirectory, &h);
        assert_eq!(out.unwrap_err(), AppError::Internal);
    }
}
