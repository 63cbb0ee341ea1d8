use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde::Serialize;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The scoreboard document or visit log could not be written.
    #[error("storage unavailable")]
    Unavailable(#[from] StorageError),
    /// Submitted admin credentials were rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Programmatic caller without an admin session.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Browser without an admin session; sent back to the login form.
    #[error("login required")]
    LoginRequired,
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::LoginRequired => return Redirect::to("/admin/login").into_response(),
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            status: "failure",
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
