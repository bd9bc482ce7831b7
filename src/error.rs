//! Application error model shared by the HTTP handlers and the auth gate.
//!
//! Authentication and authorization failures are expected control-flow
//! outcomes, so they are plain enum variants carried in `Result`, never
//! panics or downcast chains. Only genuinely unexpected conditions (a failing
//! user-directory call) land in `Internal`, and their detail is logged at the
//! point of detection rather than sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    UserInput(String),

    /// No credential, unknown id, or expired session. The client is never
    /// told which of those it was.
    #[error("unauthorized")]
    Unauthenticated,

    /// Valid session, insufficient role.
    #[error("forbidden")]
    Forbidden,

    /// Collaborator failure; detail stays server-side.
    #[error("internal error")]
    Internal,
}

impl AppError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            AppError::UserInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn status_label(&self) -> &'static str {
        match self {
            AppError::UserInput(_) => "error",
            AppError::Unauthenticated => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::Internal => "error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            AppError::UserInput(msg) => json!({"status": "error", "error": msg}),
            _ => json!({"status": self.status_label()}),
        };
        (self.http_status(), Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(AppError::UserInput("x".into()).http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthenticated.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Internal.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthenticated_body_is_generic() {
        // the body must not distinguish missing vs expired vs unknown
        let resp = AppError::Unauthenticated.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
