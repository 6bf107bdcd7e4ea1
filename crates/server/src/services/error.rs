//! Service-level error kinds.

use thiserror::Error;

use grocery_core::{EmailError, NameError, QuantityError};

use crate::auth::AuthError;
use crate::db::RepositoryError;

/// Errors returned by every service operation.
///
/// The first five variants are terminal outcomes for the caller. The last
/// two are infrastructure failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No identity could be resolved for the caller.
    #[error("authentication required")]
    Unauthenticated,

    /// A referenced resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource exists but is owned by another account.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Structurally invalid input, rejected before any write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A unique display name or email is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage failure.
    #[error("repository error: {0}")]
    Repository(RepositoryError),

    /// Authentication machinery failure (hashing, signing).
    #[error("auth error: {0}")]
    Auth(AuthError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("resource".to_string()),
            RepositoryError::MissingParent(msg) => Self::NotFound(msg),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Repository(other),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated | AuthError::InvalidCredentials => Self::Unauthenticated,
            AuthError::WeakPassword(msg) => Self::Validation(msg),
            AuthError::Repository(e) => Self::from(e),
            other => Self::Auth(other),
        }
    }
}

impl From<NameError> for ServiceError {
    fn from(err: NameError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<EmailError> for ServiceError {
    fn from(err: EmailError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<QuantityError> for ServiceError {
    fn from(err: QuantityError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_conflicts_surface_as_conflict() {
        let err = ServiceError::from(RepositoryError::Conflict("email already exists".into()));
        assert!(matches!(err, ServiceError::Conflict(msg) if msg == "email already exists"));
    }

    #[test]
    fn test_missing_parent_is_not_found() {
        let err = ServiceError::from(RepositoryError::MissingParent("list 7".into()));
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_credential_failures_are_unauthenticated() {
        assert!(matches!(
            ServiceError::from(AuthError::InvalidCredentials),
            ServiceError::Unauthenticated
        ));
        assert!(matches!(
            ServiceError::from(AuthError::WeakPassword("short".into())),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            ServiceError::from(AuthError::PasswordHash),
            ServiceError::Auth(_)
        ));
    }
}
