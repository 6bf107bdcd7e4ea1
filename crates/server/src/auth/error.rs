//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur while authenticating a caller.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No identity could be established from the presented credential.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Wrong email or password at login.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Signing a new token failed.
    #[error("token signing failed: {0}")]
    TokenIssue(#[source] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
