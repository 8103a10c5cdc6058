//! Stateless session assertions (HS256 JWT).
//!
//! A login yields one short-lived access assertion and one long-lived
//! refresh assertion. Nothing about them is persisted; possession of a
//! validly signed, unexpired token IS the session. Deployments that need
//! revocation put a deny-list in front of [`TokenIssuer::verify_access`].

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tripbook_core::UserId;

/// Distinguishes the two assertion flavors inside the signed payload, so a
/// refresh token can never pass an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssertionKind {
    Access,
    Refresh,
}

/// The signed claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Subject: the account the session belongs to.
    pub sub: UserId,
    pub kind: AssertionKind,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// The pair handed out at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("assertion has expired")]
    Expired,

    /// Bad signature, malformed payload or wrong assertion kind. Deliberately
    /// not more specific than that.
    #[error("invalid assertion")]
    Invalid,

    #[error("assertion could not be signed: {0}")]
    Signing(String),
}

/// Signs and verifies session assertions with a single shared secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issue a fresh access/refresh pair for `subject`.
    pub fn issue(
        &self,
        subject: UserId,
        now: DateTime<Utc>,
    ) -> Result<AssertionPair, TokenError> {
        Ok(AssertionPair {
            access: self.sign(subject, AssertionKind::Access, now, self.access_ttl)?,
            refresh: self.sign(subject, AssertionKind::Refresh, now, self.refresh_ttl)?,
        })
    }

    /// Verify an access assertion and return its subject.
    pub fn verify_access(&self, assertion: &str) -> Result<UserId, TokenError> {
        self.decode(assertion, AssertionKind::Access)
    }

    /// Verify a refresh assertion and return its subject.
    pub fn verify_refresh(&self, assertion: &str) -> Result<UserId, TokenError> {
        self.decode(assertion, AssertionKind::Refresh)
    }

    /// Exchange a valid refresh assertion for a new access assertion.
    ///
    /// The refresh assertion itself stays valid until its own expiry.
    pub fn refresh(
        &self,
        refresh_assertion: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let subject = self.verify_refresh(refresh_assertion)?;
        self.sign(subject, AssertionKind::Access, now, self.access_ttl)
    }

    fn sign(
        &self,
        subject: UserId,
        kind: AssertionKind,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let claims = AssertionClaims {
            sub: subject,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn decode(&self, assertion: &str, expected: AssertionKind) -> Result<UserId, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data =
            jsonwebtoken::decode::<AssertionClaims>(assertion, &self.decoding, &validation)
                .map_err(|e| match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                })?;

        if data.claims.kind != expected {
            return Err(TokenError::Invalid);
        }
        Ok(data.claims.sub)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            b"unit-test-secret",
            Duration::minutes(15),
            Duration::days(7),
        )
    }

    #[test]
    fn issued_access_assertion_verifies_to_its_subject() {
        let issuer = issuer();
        let subject = UserId::new();
        let pair = issuer.issue(subject, Utc::now()).unwrap();

        assert_eq!(issuer.verify_access(&pair.access), Ok(subject));
        assert_eq!(issuer.verify_refresh(&pair.refresh), Ok(subject));
    }

    #[test]
    fn kinds_do_not_cross() {
        let issuer = issuer();
        let pair = issuer.issue(UserId::new(), Utc::now()).unwrap();

        assert_eq!(
            issuer.verify_access(&pair.refresh),
            Err(TokenError::Invalid)
        );
        assert_eq!(
            issuer.verify_refresh(&pair.access),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn expiry_is_reported_as_expired() {
        // Issue far enough in the past to clear the decoder's leeway.
        let issuer = issuer();
        let pair = issuer
            .issue(UserId::new(), Utc::now() - Duration::hours(2))
            .unwrap();

        assert_eq!(issuer.verify_access(&pair.access), Err(TokenError::Expired));
    }

    #[test]
    fn tampering_invalidates_the_signature() {
        let issuer = issuer();
        let pair = issuer.issue(UserId::new(), Utc::now()).unwrap();

        let mut forged = pair.access.clone();
        let swap = if forged.ends_with('a') { 'b' } else { 'a' };
        forged.pop();
        forged.push(swap);

        assert_eq!(issuer.verify_access(&forged), Err(TokenError::Invalid));
        assert_eq!(
            issuer.verify_access("definitely.not.a.token"),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let ours = issuer();
        let theirs = TokenIssuer::new(
            b"some-other-secret",
            Duration::minutes(15),
            Duration::days(7),
        );
        let pair = theirs.issue(UserId::new(), Utc::now()).unwrap();

        assert_eq!(ours.verify_access(&pair.access), Err(TokenError::Invalid));
    }

    #[test]
    fn refresh_mints_a_working_access_assertion() {
        let issuer = issuer();
        let subject = UserId::new();
        let pair = issuer.issue(subject, Utc::now()).unwrap();

        let access = issuer.refresh(&pair.refresh, Utc::now()).unwrap();
        assert_eq!(issuer.verify_access(&access), Ok(subject));
    }

    #[test]
    fn expired_refresh_cannot_mint_access() {
        let issuer = TokenIssuer::new(
            b"unit-test-secret",
            Duration::minutes(15),
            Duration::minutes(1),
        );
        let pair = issuer
            .issue(UserId::new(), Utc::now() - Duration::hours(2))
            .unwrap();

        assert_eq!(
            issuer.refresh(&pair.refresh, Utc::now()),
            Err(TokenError::Expired)
        );
    }
}
