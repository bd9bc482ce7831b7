//! Login credential verification against the user directory.

use anyhow::Result;

use crate::users::UserDirectory;

/// Compare a submitted username/password pair against the stored record.
///
/// Unknown usernames and wrong passwords both come back as `Ok(false)`;
/// a failed login is a normal outcome, not an error. Only a failing
/// directory call surfaces as `Err`. Comparison is against the stored
/// plaintext password, matching the legacy collection.
pub fn check_credentials(
    users: &dyn UserDirectory,
    username: &str,
    password: &str,
) -> Result<bool> {
    match users.get_user(username)? {
        Some(user) => Ok(user.password == password),
        None => Ok(false),
    }
}
