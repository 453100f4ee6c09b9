//! Service-layer errors.

use db::DbError;
use job_queue::QueueError;
use task_core::ValidationError;
use thiserror::Error;

/// Errors from the task and user services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    NotFound(String),
    #[error("no tasks found")]
    NoTasks,
    #[error("{0}")]
    Conflict(String),
    #[error("password hashing failed: {0}")]
    Password(String),
    #[error("database error: {0}")]
    Database(DbError),
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(message) => ServiceError::NotFound(message),
            DbError::Conflict(message) => ServiceError::Conflict(message),
            other => ServiceError::Database(other),
        }
    }
}

/// Errors from authentication and token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("unauthorized")]
    Unauthorized,
    #[error("username already taken: {0}")]
    UsernameTaken(String),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("configured token lifetime is out of range")]
    ExpiryOutOfRange,
    #[error("password hashing failed: {0}")]
    Password(String),
    #[error("database error: {0}")]
    Database(#[from] DbError),
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthError::Password(err.to_string())
    }
}

/// Errors starting a task manager.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Database(#[from] DbError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}
