//! Session-cookie authentication core: store, lifecycle, request
//! authentication, credential checks, and the admin gate.
//! Keep the public surface thin and split implementation across sub-modules.

mod authenticate;
mod credentials;
mod gate;
mod session;

pub use authenticate::{authenticate, parse_cookie, SESSION_COOKIE};
pub use credentials::check_credentials;
pub use gate::require_admin;
pub use session::{
    is_expired, AuthenticatedSession, Session, SessionManager, SessionStore, DEFAULT_TTL_MINUTES,
};
