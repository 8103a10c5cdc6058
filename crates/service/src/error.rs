//! The error surface callers of the service see.

use thiserror::Error;

use tripbook_auth::{AuthzError, PasswordError, TokenError};
use tripbook_core::DomainError;
use tripbook_directory::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Login rejected. Never says whether the account exists, whether the
    /// password was wrong or whether the account is deactivated.
    #[error("authentication failed")]
    AuthFailed,

    /// Missing, expired or invalid session assertion.
    #[error("unauthorized")]
    Unauthorized,

    /// The engine denied the action; the reason is safe to surface.
    #[error("denied: {0}")]
    Denied(#[from] AuthzError),

    /// The record does not exist, or exists outside the caller's scope.
    #[error("not found")]
    NotFound,

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("role '{0}' is not registered")]
    RoleNotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    /// Unexpected internal failure. Nothing the caller did caused this.
    #[error("internal failure: {0}")]
    Fatal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => Self::DuplicateEmail(email),
            StoreError::NotFound => Self::NotFound,
            StoreError::Domain(domain) => domain.into(),
            StoreError::Unavailable(msg) => Self::Fatal(msg),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound => Self::NotFound,
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid => Self::Unauthorized,
            TokenError::Signing(msg) => Self::Fatal(msg),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        Self::Fatal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_their_service_shapes() {
        assert_eq!(
            ServiceError::from(StoreError::NotFound),
            ServiceError::NotFound
        );
        assert_eq!(
            ServiceError::from(StoreError::DuplicateEmail("x@y.z".into())),
            ServiceError::DuplicateEmail("x@y.z".into())
        );
        assert!(matches!(
            ServiceError::from(StoreError::unavailable("lock poisoned")),
            ServiceError::Fatal(_)
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Domain(DomainError::validation("bad"))),
            ServiceError::Validation(_)
        ));
        assert_eq!(
            ServiceError::from(StoreError::Domain(DomainError::NotFound)),
            ServiceError::NotFound
        );
    }

    #[test]
    fn token_failures_collapse_to_unauthorized() {
        assert_eq!(
            ServiceError::from(TokenError::Expired),
            ServiceError::Unauthorized
        );
        assert_eq!(
            ServiceError::from(TokenError::Invalid),
            ServiceError::Unauthorized
        );
    }
}
