//! Error types for the reflection server

use hyper::StatusCode;
use thiserror::Error;

/// Main error type shared by repositories, services and handlers
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Users are not friends")]
    NotFriends,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRange(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFriends => StatusCode::FORBIDDEN,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Json(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Database(_) | Self::Internal(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message suitable for a client-facing error body
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidInput(msg)
            | Self::InvalidRange(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Auth(msg) => msg.clone(),
            Self::NotFriends => "users are not friends".to_string(),
            Self::Json(e) => format!("invalid JSON: {}", e),
            _ => self.to_string(),
        }
    }
}
