use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{auth::AuthError, repository::RepoError};

/// ApiError
///
/// Rejections from the JSON API. Every variant answers with a bare status code and
/// an empty body; internal causes are logged and never sent to the caller.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No signed-in user.
    #[error("not signed in")]
    Unauthorized,
    /// Signed in, but the system of record does not grant the required role.
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(cause) => tracing::error!(cause = %cause, "request failed"),
            ApiError::BadRequest(reason) => tracing::debug!(reason = %reason, "bad request"),
            _ => {}
        }
        self.status().into_response()
    }
}
