//! Storage contract for accounts and organizations.

use thiserror::Error;

use tripbook_auth::ScopeFilter;
use tripbook_core::{DomainError, DomainResult, OrganizationId, UserId};

use crate::{Organization, User};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Another account already holds this email (case-insensitive).
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// The requested record does not exist. Also returned for records that
    /// exist outside the caller's scope; the two cases are indistinguishable
    /// on purpose.
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backing store cannot serve requests (e.g. a poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// What a cascade delete removed, for audit logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeDeletion {
    pub organization: Organization,
    pub removed_users: Vec<UserId>,
}

/// Persistence seam for the directory.
///
/// Mutations take a closure so that read-modify-write cycles commit as one
/// unit; implementations must apply the closure under their write exclusion
/// and roll the record back entirely when it fails. The generic methods make
/// this trait non-object-safe; consumers stay generic over it.
pub trait DirectoryStore: Send + Sync {
    fn find_user(&self, id: UserId) -> StoreResult<User>;

    /// Case-insensitive email lookup.
    fn find_user_by_email(&self, email: &str) -> StoreResult<User>;

    /// Insert a new account. Fails on a duplicate email or a dangling
    /// organization reference.
    fn create_user(&self, user: User) -> StoreResult<User>;

    /// Atomically mutate one account. An email change is re-checked for
    /// uniqueness inside the same commit.
    fn update_user<F>(&self, id: UserId, mutate: F) -> StoreResult<User>
    where
        F: FnOnce(&mut User) -> DomainResult<()>;

    fn delete_user(&self, id: UserId) -> StoreResult<User>;

    /// All accounts visible under `scope`, ordered by id (time-ordered).
    fn list_users(&self, scope: &ScopeFilter) -> StoreResult<Vec<User>>;

    fn find_organization(&self, id: OrganizationId) -> StoreResult<Organization>;

    fn create_organization(&self, organization: Organization) -> StoreResult<Organization>;

    fn update_organization<F>(&self, id: OrganizationId, mutate: F) -> StoreResult<Organization>
    where
        F: FnOnce(&mut Organization) -> DomainResult<()>;

    /// All organizations visible under `scope`, ordered by id.
    fn list_organizations(&self, scope: &ScopeFilter) -> StoreResult<Vec<Organization>>;

    /// Insert an organization together with its first admin account, as one
    /// unit: neither record exists if either insert fails.
    fn create_organization_with_admin(
        &self,
        organization: Organization,
        admin: User,
    ) -> StoreResult<(Organization, User)>;

    /// Remove an organization and every account in it, as one unit.
    fn delete_organization_cascade(&self, id: OrganizationId) -> StoreResult<CascadeDeletion>;
}
