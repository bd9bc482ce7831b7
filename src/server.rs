//!
//! suppstack HTTP server
//! ---------------------
//! Axum-based HTTP surface for the session subsystem.
//!
//! Responsibilities:
//! - Login/logout endpoints issuing and clearing the `sessionId` cookie.
//! - Explicit session renewal and a login-state probe for the frontend.
//! - Admin-gated user management guarded by `auth::require_admin`.
//!
//! Login deliberately answers 200 whether or not the credentials matched;
//! the only signal is the presence of the cookie. Changing that contract is
//! a product decision, not a code cleanup.

use std::net::SocketAddr;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::auth::{
    authenticate, check_credentials, require_admin, Session, SessionManager, SessionStore,
    SESSION_COOKIE,
};
use crate::error::AppError;
use crate::users::{SharedUserDirectory, User};

/// Shared server state injected into all handlers.
///
/// The session store and manager are owned here and cloned into each request;
/// the user directory is the external collaborator behind its trait object.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub manager: SessionManager,
    pub users: SharedUserDirectory,
}

impl AppState {
    pub fn new(users: SharedUserDirectory, manager: SessionManager) -> Self {
        Self { sessions: SessionStore::new(), manager, users }
    }
}

/// Mount all routes onto a router carrying `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "suppstack ok" }))
        .route("/session/login", post(login))
        .route("/session/logout", get(logout))
        .route("/session/renew", post(renew))
        .route("/session/me", get(me))
        .route("/admin/users", post(upsert_user))
        .route("/admin/users/{username}", delete(remove_user))
        .with_state(state)
}

/// Start the HTTP server on the given port.
pub async fn run_with_port(http_port: u16, state: AppState) -> anyhow::Result<()> {
    let app = router(state);
    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn http_date(t: DateTime<Utc>) -> String {
    // IMF-fixdate per RFC 7231
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn set_session_cookie(session: &Session) -> HeaderValue {
    // HttpOnly cookie scoped to path /, expiring together with the session
    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly; Path=/; Expires={}",
        SESSION_COOKIE,
        session.session_id,
        http_date(session.expires_at)
    ))
    .unwrap()
}

fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; Path=/",
        SESSION_COOKIE
    ))
    .unwrap()
}

/// POST /session/login
///
/// 200 either way; a cookie is set only when the credentials matched. Empty
/// username or password counts as a failed attempt, not a distinct error.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Response, AppError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Ok((StatusCode::OK, Json(json!({"status": "ok"}))).into_response());
    }
    match check_credentials(state.users.as_ref(), &payload.username, &payload.password) {
        Ok(true) => {
            let session = state.manager.create(&state.sessions, &payload.username);
            info!(user = %payload.username, "login succeeded");
            let mut headers = HeaderMap::new();
            headers.insert("Set-Cookie", set_session_cookie(&session));
            Ok((StatusCode::OK, headers, Json(json!({"status": "ok"}))).into_response())
        }
        Ok(false) => {
            info!(user = %payload.username, "login failed");
            Ok((StatusCode::OK, Json(json!({"status": "ok"}))).into_response())
        }
        Err(e) => {
            error!("login error: {e}");
            Err(AppError::Internal)
        }
    }
}

/// GET /session/logout — 302 back to `/` with the cookie cleared; 401 when
/// there is no live session to log out of.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let Some(auth) = authenticate(&state.sessions, &headers) else {
        return Err(AppError::Unauthenticated);
    };
    state.manager.delete(&state.sessions, &auth.session_id);
    info!(user = %auth.session.username, "logout");
    let mut h = HeaderMap::new();
    h.insert("Location", HeaderValue::from_static("/"));
    h.insert("Set-Cookie", clear_session_cookie());
    Ok((StatusCode::FOUND, h).into_response())
}

/// POST /session/renew — swap the current session for a fresh id and expiry.
/// Renewal is explicit: nothing extends a session as a side effect.
pub async fn renew(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let Some(auth) = authenticate(&state.sessions, &headers) else {
        return Err(AppError::Unauthenticated);
    };
    let session = state
        .manager
        .renew(&state.sessions, &auth.session_id, &auth.session.username);
    let mut h = HeaderMap::new();
    h.insert("Set-Cookie", set_session_cookie(&session));
    Ok((StatusCode::OK, h, Json(json!({"status": "ok"}))).into_response())
}

/// GET /session/me — login-state probe for the frontend.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let Some(auth) = authenticate(&state.sessions, &headers) else {
        return Err(AppError::Unauthenticated);
    };
    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "username": auth.session.username,
            "expires_at": auth.session.expires_at,
        })),
    )
        .into_response())
}

/// POST /admin/users — insert or overwrite one user record. Admin only.
pub async fn upsert_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(user): Json<User>,
) -> Result<Response, AppError> {
    let admin = require_admin(&state.sessions, state.users.as_ref(), &headers)?;
    if user.username.is_empty() || user.password.is_empty() {
        return Err(AppError::UserInput("username and password are required".into()));
    }
    let username = user.username.clone();
    if let Err(e) = state.users.put_user(user) {
        error!(user = %username, "user upsert failed: {e}");
        return Err(AppError::Internal);
    }
    info!(admin = %admin.session.username, user = %username, "user upserted");
    Ok((StatusCode::OK, Json(json!({"status": "ok"}))).into_response())
}

/// DELETE /admin/users/{username} — remove one user record. Admin only.
pub async fn remove_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let admin = require_admin(&state.sessions, state.users.as_ref(), &headers)?;
    if let Err(e) = state.users.delete_user(&username) {
        error!(user = %username, "user delete failed: {e}");
        return Err(AppError::Internal);
    }
    info!(admin = %admin.session.username, user = %username, "user deleted");
    Ok((StatusCode::OK, Json(json!({"status": "ok"}))).into_response())
}
