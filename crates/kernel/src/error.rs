//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// A structural lookup that found nothing.
///
/// The in-memory indexes return these instead of a bare `None` so callers
/// can tell a broken cross-reference apart from an empty result. All of
/// them surface as 404-equivalent failures at dispatch time.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no page for '{page_link}' and no {language}/notfound or {language}/welcome fallback")]
    Page { language: String, page_link: String },

    #[error("page references unknown item {0}")]
    Item(i64),

    #[error("item references unknown template {0}")]
    Template(i64),

    #[error("no controller registered for '{0}'")]
    Controller(String),
}

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Lookup(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
