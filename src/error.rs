use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::constants::ERR_INVALID_CREDENTIALS;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Stored decimal is malformed: {0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// Bad email or password. Deliberately does not say which.
    #[error("{}", ERR_INVALID_CREDENTIALS)]
    AuthFailure,

    #[error("Missing or invalid access token")]
    Unauthorized,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Drone not found")]
    DroneNotFound,

    #[error("Drone belongs to another account")]
    PermissionDenied,

    #[error("An account with this email already exists")]
    DuplicateCredential,
}

impl AppError {
    /// True when a sqlx error is a UNIQUE constraint violation
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
    }
}

/// Malformed or incomplete request bodies are validation failures
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected JSON body: {}", rejection.body_text());
        AppError::Validation(rejection.body_text())
    }
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Migration(ref e) => {
                tracing::error!("Migration error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::PasswordHash(ref e) => {
                tracing::error!("Password hashing error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Decimal(ref e) => {
                tracing::error!("Decimal decode error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::TaskJoin(ref e) => {
                tracing::error!("Task join error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthFailure => (StatusCode::UNAUTHORIZED, ERR_INVALID_CREDENTIALS.to_string()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid access token".to_string(),
            ),
            AppError::AccountNotFound => (StatusCode::NOT_FOUND, "Account not found".to_string()),
            AppError::DroneNotFound => (StatusCode::NOT_FOUND, "Drone not found".to_string()),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                "You do not own this drone".to_string(),
            ),
            AppError::DuplicateCredential => (
                StatusCode::CONFLICT,
                "An account with this email already exists".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
