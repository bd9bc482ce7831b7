use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use suppstack::auth::{SessionManager, DEFAULT_TTL_MINUTES};
use suppstack::server::{run_with_port, AppState};
use suppstack::users::{ensure_default_admin, InMemoryUserDirectory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let http_port: u16 = std::env::var("SUPPSTACK_HTTP_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(7070);
    let ttl_minutes: u64 = std::env::var("SUPPSTACK_SESSION_TTL_MIN")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TTL_MINUTES);
    let admin_user = std::env::var("SUPPSTACK_ADMIN_USER").unwrap_or_else(|_| "admin".to_string());
    let admin_password =
        std::env::var("SUPPSTACK_ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());

    info!(
        target: "suppstack",
        "suppstack starting: http_port={}, session_ttl_min={}, admin_user='{}'",
        http_port, ttl_minutes, admin_user
    );

    let users = Arc::new(InMemoryUserDirectory::new());
    ensure_default_admin(users.as_ref(), &admin_user, &admin_password)?;

    let state = AppState::new(users, SessionManager::with_ttl_minutes(ttl_minutes));
    run_with_port(http_port, state).await
}
