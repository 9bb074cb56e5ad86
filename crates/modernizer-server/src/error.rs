use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use modernizer_core::ModernizerError;

use crate::bridge::PoolExhausted;

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 400 Bad Request errors
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 400 through the `anyhow::Error` chain for
/// failures that never reach [`ModernizerError`] (e.g. malformed JSON).
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. Always rendered as `{"error": msg}`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<BadRequestError>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        if self.0.downcast_ref::<PoolExhausted>().is_some() {
            return StatusCode::SERVICE_UNAVAILABLE;
        }
        match self.0.downcast_ref::<ModernizerError>() {
            Some(
                ModernizerError::InvalidRequest(_)
                | ModernizerError::InvalidAuthKind(_)
                | ModernizerError::UnsupportedUrl(_),
            ) => StatusCode::BAD_REQUEST,
            Some(
                ModernizerError::FileNotFound(_)
                | ModernizerError::UnknownRepository(_)
                | ModernizerError::ConfigNotFound(_),
            ) => StatusCode::NOT_FOUND,
            Some(ModernizerError::PathTraversal | ModernizerError::NotAFile(_)) => {
                StatusCode::BAD_REQUEST
            }
            Some(
                ModernizerError::CloneFailed(_)
                | ModernizerError::Io(_)
                | ModernizerError::Yaml(_)
                | ModernizerError::Json(_),
            )
            | None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(%status, error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
