//! `tripbook-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it decides,
//! it does not fetch. The service layer resolves principals and applies the
//! scope filters this crate hands back.

pub mod authorize;
pub mod password;
pub mod permissions;
pub mod registry;
pub mod roles;
pub mod tokens;

pub use authorize::{authorize, AuthzError, OrgContext, Principal, ScopeFilter};
pub use password::{
    hash_password, validate_new_password, verify_password, PasswordError, MIN_PASSWORD_LENGTH,
};
pub use permissions::{Permission, UnknownPermission};
pub use registry::{BootstrapSummary, RoleCatalogConfig, RoleCatalogEntry, RoleRegistry};
pub use roles::Role;
pub use tokens::{AssertionClaims, AssertionKind, AssertionPair, TokenError, TokenIssuer};
