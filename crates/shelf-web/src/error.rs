//! Error types for the web crate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shelf_store::StoreError;
use thiserror::Error;

/// Errors a handler can return.
///
/// Failed lookups by id are not mapped to 404: like any other unhandled
/// failure they surface as a generic server error.
#[derive(Debug, Error)]
pub enum ShelfError {
    /// The request needs a logged-in user.
    #[error("authentication required")]
    NotAuthenticated,

    /// The CSRF cookie and form token are missing or differ.
    #[error("CSRF verification failed")]
    CsrfFailed,

    /// A cookie the handler reads unconditionally is not set.
    #[error("cookie '{0}' is not set")]
    MissingCookie(&'static str),

    /// A record exists but is not visible to the caller.
    #[error("{entity} {id} not found")]
    Lookup { entity: &'static str, id: String },

    /// Store error, including lookups of missing records.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ShelfError {
    pub fn status(&self) -> StatusCode {
        match self {
            ShelfError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ShelfError::CsrfFailed => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ShelfError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ShelfError::NotAuthenticated => "Authentication required".to_string(),
            ShelfError::CsrfFailed => {
                "Forbidden (403)\nCSRF verification failed. Request aborted.".to_string()
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                "Server Error (500)".to_string()
            }
        };

        (status, body).into_response()
    }
}
