//! In-memory reference implementation of the directory store.

use std::collections::HashMap;
use std::sync::RwLock;

use tripbook_auth::ScopeFilter;
use tripbook_core::{DomainError, DomainResult, OrganizationId, UserId};

use crate::store::{CascadeDeletion, DirectoryStore, StoreError, StoreResult};
use crate::{Organization, User};

#[derive(Debug, Clone, Default)]
struct DirectoryState {
    users: HashMap<UserId, User>,
    organizations: HashMap<OrganizationId, Organization>,
}

/// In-memory directory backed by one lock over the whole state.
///
/// Intended for tests/dev. Not optimized for performance: every write
/// clones the state into a draft and swaps it back in on success, so a
/// failing operation can never leave a partial change behind.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    state: RwLock<DirectoryState>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, op: impl FnOnce(&DirectoryState) -> StoreResult<T>) -> StoreResult<T> {
        let guard = self
            .state
            .read()
            .map_err(|_| StoreError::unavailable("lock poisoned"))?;
        op(&guard)
    }

    /// Run `op` against a draft of the state; commit the draft only on `Ok`.
    fn transact<T>(
        &self,
        op: impl FnOnce(&mut DirectoryState) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| StoreError::unavailable("lock poisoned"))?;
        let mut draft = guard.clone();
        let value = op(&mut draft)?;
        *guard = draft;
        Ok(value)
    }
}

fn email_taken(state: &DirectoryState, email: &str, excluding: Option<UserId>) -> bool {
    state
        .users
        .values()
        .any(|u| excluding.is_none_or(|ex| u.id != ex) && u.email.eq_ignore_ascii_case(email))
}

fn scope_matches(scope: &ScopeFilter, organization_id: Option<OrganizationId>) -> bool {
    match scope {
        ScopeFilter::Unrestricted => true,
        ScopeFilter::Organization(own) => organization_id == Some(*own),
    }
}

impl DirectoryStore for InMemoryDirectory {
    fn find_user(&self, id: UserId) -> StoreResult<User> {
        self.read(|state| state.users.get(&id).cloned().ok_or(StoreError::NotFound))
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<User> {
        let needle = email.trim().to_lowercase();
        self.read(|state| {
            state
                .users
                .values()
                .find(|u| u.email.eq_ignore_ascii_case(&needle))
                .cloned()
                .ok_or(StoreError::NotFound)
        })
    }

    fn create_user(&self, user: User) -> StoreResult<User> {
        self.transact(|state| {
            if email_taken(state, &user.email, None) {
                return Err(StoreError::DuplicateEmail(user.email.clone()));
            }
            if let Some(org_id) = user.organization_id {
                if !state.organizations.contains_key(&org_id) {
                    return Err(DomainError::invariant(
                        "account references an organization that does not exist",
                    )
                    .into());
                }
            }
            state.users.insert(user.id, user.clone());
            Ok(user)
        })
    }

    fn update_user<F>(&self, id: UserId, mutate: F) -> StoreResult<User>
    where
        F: FnOnce(&mut User) -> DomainResult<()>,
    {
        self.transact(|state| {
            let mut user = state.users.get(&id).cloned().ok_or(StoreError::NotFound)?;
            let email_before = user.email.clone();
            mutate(&mut user)?;
            if !user.email.eq_ignore_ascii_case(&email_before)
                && email_taken(state, &user.email, Some(id))
            {
                return Err(StoreError::DuplicateEmail(user.email));
            }
            state.users.insert(id, user.clone());
            Ok(user)
        })
    }

    fn delete_user(&self, id: UserId) -> StoreResult<User> {
        self.transact(|state| state.users.remove(&id).ok_or(StoreError::NotFound))
    }

    fn list_users(&self, scope: &ScopeFilter) -> StoreResult<Vec<User>> {
        self.read(|state| {
            let mut users: Vec<User> = state
                .users
                .values()
                .filter(|u| scope_matches(scope, u.organization_id))
                .cloned()
                .collect();
            users.sort_by_key(|u| *u.id.as_uuid());
            Ok(users)
        })
    }

    fn find_organization(&self, id: OrganizationId) -> StoreResult<Organization> {
        self.read(|state| {
            state
                .organizations
                .get(&id)
                .cloned()
                .ok_or(StoreError::NotFound)
        })
    }

    fn create_organization(&self, organization: Organization) -> StoreResult<Organization> {
        self.transact(|state| {
            state
                .organizations
                .insert(organization.id, organization.clone());
            Ok(organization)
        })
    }

    fn update_organization<F>(&self, id: OrganizationId, mutate: F) -> StoreResult<Organization>
    where
        F: FnOnce(&mut Organization) -> DomainResult<()>,
    {
        self.transact(|state| {
            let mut organization = state
                .organizations
                .get(&id)
                .cloned()
                .ok_or(StoreError::NotFound)?;
            mutate(&mut organization)?;
            state.organizations.insert(id, organization.clone());
            Ok(organization)
        })
    }

    fn list_organizations(&self, scope: &ScopeFilter) -> StoreResult<Vec<Organization>> {
        self.read(|state| {
            let mut organizations: Vec<Organization> = state
                .organizations
                .values()
                .filter(|o| scope_matches(scope, Some(o.id)))
                .cloned()
                .collect();
            organizations.sort_by_key(|o| *o.id.as_uuid());
            Ok(organizations)
        })
    }

    fn create_organization_with_admin(
        &self,
        organization: Organization,
        admin: User,
    ) -> StoreResult<(Organization, User)> {
        self.transact(|state| {
            if admin.organization_id != Some(organization.id) {
                return Err(DomainError::invariant(
                    "admin account must reference the new organization",
                )
                .into());
            }
            if email_taken(state, &admin.email, None) {
                return Err(StoreError::DuplicateEmail(admin.email.clone()));
            }
            state
                .organizations
                .insert(organization.id, organization.clone());
            state.users.insert(admin.id, admin.clone());
            Ok((organization, admin))
        })
    }

    fn delete_organization_cascade(&self, id: OrganizationId) -> StoreResult<CascadeDeletion> {
        self.transact(|state| {
            let organization = state
                .organizations
                .remove(&id)
                .ok_or(StoreError::NotFound)?;

            let mut removed_users: Vec<UserId> = state
                .users
                .values()
                .filter(|u| u.organization_id == Some(id))
                .map(|u| u.id)
                .collect();
            removed_users.sort_by_key(|u| *u.as_uuid());
            for user_id in &removed_users {
                state.users.remove(user_id);
            }

            Ok(CascadeDeletion {
                organization,
                removed_users,
            })
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
