//! Password hashing (Argon2id) and credential policy.
//!
//! Plaintext passwords exist only as transient parameters here; they are
//! never stored, logged or embedded in errors.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use thiserror::Error;

use tripbook_core::{DomainError, DomainResult};

/// Minimum accepted length for a new password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// The stored hash could not be parsed. Indicates data corruption, not
    /// a wrong password.
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Hash a plaintext password with Argon2id and a fresh random salt.
///
/// Uses the library defaults, which track the OWASP recommended parameters.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check a plaintext password against a stored hash.
///
/// A mismatch is `Ok(false)`; only an unreadable hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
    }
}

/// Policy gate for passwords chosen at registration or change.
pub fn validate_new_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let hash = hash_password("wheels-up-2024").unwrap();
        assert_eq!(verify_password("wheels-up-2024", &hash), Ok(true));
    }

    #[test]
    fn wrong_password_is_a_clean_mismatch() {
        let hash = hash_password("wheels-up-2024").unwrap();
        assert_eq!(verify_password("wheels-down-2024", &hash), Ok(false));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("same-input").unwrap();
        let second = hash_password("same-input").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_mismatch() {
        let err = verify_password("anything", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, PasswordError::MalformedHash(_)));
    }

    #[test]
    fn short_passwords_fail_policy() {
        assert!(validate_new_password("seven77").is_err());
        assert!(validate_new_password("eight888").is_ok());
    }
}
