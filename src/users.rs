//! User records and the directory collaborator they live behind.
//!
//! The shop's user collection is external to the auth core; the core only
//! ever fetches, inserts, or deletes one document by username. Keeping that
//! surface behind a trait lets the server inject the real directory and the
//! tests inject doubles (including failing ones).

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// One user document. `role` is optional for backward compatibility with
/// records written before roles existed; absent means `user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    // Stored in the clear, matching the legacy collection. A known weakness,
    // not to be changed without a product decision.
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl User {
    /// Effective role, with the legacy default applied.
    pub fn role(&self) -> Role {
        self.role.unwrap_or(Role::User)
    }
}

/// Fetch/insert/delete-one-document-by-key view of the user collection.
pub trait UserDirectory: Send + Sync {
    fn get_user(&self, username: &str) -> Result<Option<User>>;
    fn put_user(&self, user: User) -> Result<()>;
    fn delete_user(&self, username: &str) -> Result<()>;
}

pub type SharedUserDirectory = Arc<dyn UserDirectory>;

/// Default directory: a process-local map keyed by username.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory(RwLock<HashMap<String, User>>);

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn get_user(&self, username: &str) -> Result<Option<User>> {
        Ok(self.0.read().get(username).cloned())
    }

    fn put_user(&self, user: User) -> Result<()> {
        self.0.write().insert(user.username.clone(), user);
        Ok(())
    }

    fn delete_user(&self, username: &str) -> Result<()> {
        self.0.write().remove(username);
        Ok(())
    }
}

/// Seed an admin account on first boot so the admin endpoints are reachable
/// before any other user exists. Does nothing if the username is taken.
pub fn ensure_default_admin(dir: &dyn UserDirectory, username: &str, password: &str) -> Result<()> {
    if dir.get_user(username)?.is_some() {
        return Ok(());
    }
    dir.put_user(User {
        username: username.to_string(),
        email: format!("{}@localhost", username),
        password: password.to_string(),
        role: Some(Role::Admin),
    })?;
    info!(user = username, "seeded default admin user");
    Ok(())
}
