//! Web-layer error type
//!
//! Two terminal outcomes surface to the client: a 404 when an identifier
//! does not resolve, and a 500 for everything unexpected. Authorization
//! denials and validation failures are not errors here; handlers recover
//! them into redirects and re-rendered forms.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// Terminal page error
#[derive(Debug)]
pub enum PageError {
    /// The requested record does not exist
    NotFound,
    /// Anything else; the chain goes to the log, not the client
    Internal(anyhow::Error),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound => (
                StatusCode::NOT_FOUND,
                Html("<h1>404</h1><p>Not found.</p>".to_string()),
            )
                .into_response(),
            PageError::Internal(err) => {
                tracing::error!(error = ?err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h1>500</h1><p>Something went wrong.</p>".to_string()),
                )
                    .into_response()
            }
        }
    }
}

impl From<anyhow::Error> for PageError {
    fn from(err: anyhow::Error) -> Self {
        PageError::Internal(err)
    }
}
