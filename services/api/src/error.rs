//! services/api/src/error.rs
//!
//! Defines the primary error types for the API service: `ApiError` for startup
//! failures and `AppError` for failures inside a request.

use crate::config::ConfigError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use docqa_core::ports::PortError;
use serde_json::json;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying database migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Email already registered")]
    DuplicateUser,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Not authenticated")]
    MissingToken,
    #[error("Could not validate credentials")]
    InvalidToken,
    #[error("User not found")]
    UnknownUser,
    #[error("{0}")]
    BadRequest(String),
    #[error("The language model is currently unavailable. Please try again later.")]
    ModelUnavailable,
    #[error("The language model did not respond in time. Please try again later.")]
    ModelTimeout,
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateUser | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::InvalidToken
            | AppError::UnknownUser => StatusCode::UNAUTHORIZED,
            AppError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ModelTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PortError> for AppError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::DuplicateUser(_) => AppError::DuplicateUser,
            PortError::Unauthorized => AppError::InvalidCredentials,
            PortError::InvalidInput(msg) => AppError::BadRequest(msg),
            PortError::ModelUnavailable(msg) => {
                error!("Model unavailable: {}", msg);
                AppError::ModelUnavailable
            }
            PortError::ModelTimeout(secs) => {
                error!("Model call timed out after {}s", secs);
                AppError::ModelTimeout
            }
            PortError::NotFound(msg) | PortError::Unexpected(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Internal(detail) = &self {
            error!("Internal error while handling request: {}", detail);
        }
        let body = Json(json!({ "detail": self.to_string() }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
