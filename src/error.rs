//! Error types for the Hello Books server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes reported alongside the HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchEntity = 4,
    BadValue = 5,
    Duplicate = 6,
    BookNotAvailable = 7,
    AlreadyLoggedIn = 8,
    BookNotBorrowed = 9,
    Forbidden = 10,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing, invalid, expired or revoked token, or an identity mismatch
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authenticated, but the account lacks administrator rights
    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate title: {0}")]
    DuplicateTitle(String),

    #[error("Not available: {0}")]
    NotAvailable(String),

    #[error("Already active: {0}")]
    AlreadyActive(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Return attempted on a book with no open loan
    #[error("Not borrowed: {0}")]
    NotBorrowed(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and error code for this error
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchEntity),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::DuplicateTitle(_) | AppError::Conflict(_) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate)
            }
            AppError::NotAvailable(_) => (StatusCode::CONFLICT, ErrorCode::BookNotAvailable),
            AppError::AlreadyActive(_) => (StatusCode::CONFLICT, ErrorCode::AlreadyLoggedIn),
            AppError::NotBorrowed(_) => (StatusCode::CONFLICT, ErrorCode::BookNotBorrowed),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::DuplicateTitle(msg)
            | AppError::NotAvailable(msg)
            | AppError::AlreadyActive(msg)
            | AppError::Conflict(msg)
            | AppError::NotBorrowed(msg) => msg,
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
