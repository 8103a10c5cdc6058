//! The fleet service: every operation of the account and tenancy surface.
//!
//! One rule holds everywhere: an operation authorizes first, receives a
//! [`ScopeFilter`], and applies that filter verbatim to whatever it touches.
//! Records outside the filter are reported as [`ServiceError::NotFound`],
//! indistinguishable from records that do not exist.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tripbook_auth::{
    hash_password, validate_new_password, verify_password, AuthzError, BootstrapSummary,
    OrgContext, Permission, Principal, Role, RoleCatalogConfig, RoleRegistry, ScopeFilter,
    TokenIssuer,
};
use tripbook_core::{OrganizationId, UserId};
use tripbook_directory::{
    CascadeDeletion, DirectoryStore, NewOrganization, NewUser, Organization, ProfileUpdate,
    StoreError, User,
};

use crate::config::SecurityConfig;
use crate::error::{ServiceError, ServiceResult};

// ─────────────────────────────────────────────────────────────────────────────
// Boundary views
// ─────────────────────────────────────────────────────────────────────────────

/// The account view handed across the boundary. Carries everything a client
/// may see; in particular, never the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub organization_id: Option<OrganizationId>,
    pub is_organization_admin: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub roles: Vec<String>,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            position: user.position.clone(),
            organization_id: user.organization_id,
            is_organization_admin: user.is_organization_admin,
            is_superuser: user.is_superuser,
            is_active: user.is_active,
            roles: user.roles.iter().map(|r| r.as_str().to_string()).collect(),
            date_joined: user.date_joined,
            last_login: user.last_login,
        }
    }
}

/// Everything a successful login returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginSession {
    pub user: UserProfile,
    pub access: String,
    pub refresh: String,
}

/// Headcount figures for one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationStats {
    pub organization_id: OrganizationId,
    pub name: String,
    pub total_users: usize,
    pub active_users: usize,
    pub administrators: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Service
// ─────────────────────────────────────────────────────────────────────────────

/// The application service over a directory store.
///
/// Holds the role catalog and the token issuer; everything else lives in the
/// store behind the [`DirectoryStore`] seam.
pub struct FleetService<D: DirectoryStore> {
    directory: D,
    registry: RoleRegistry,
    tokens: TokenIssuer,
}

impl<D: DirectoryStore> FleetService<D> {
    pub fn new(directory: D, config: &SecurityConfig) -> Self {
        Self {
            directory,
            registry: RoleRegistry::builtin(),
            tokens: TokenIssuer::new(
                config.jwt_secret.as_bytes(),
                config.access_ttl,
                config.refresh_ttl,
            ),
        }
    }

    /// The role catalog in effect.
    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    /// Load a role catalog, typically at provisioning time.
    ///
    /// Runs outside the permission system: it is reachable only from
    /// operator tooling, never from a request path.
    pub fn bootstrap_roles(
        &mut self,
        config: &RoleCatalogConfig,
        replace: bool,
    ) -> BootstrapSummary {
        self.registry.bootstrap(config, replace)
    }

    // ── Sessions ──────────────────────────────────────────────────────────

    /// Check credentials and start a session.
    ///
    /// Every rejection is the same [`ServiceError::AuthFailed`]; the caller
    /// learns nothing about whether the account exists or is deactivated.
    pub fn authenticate(&self, email: &str, password: &str) -> ServiceResult<LoginSession> {
        let user = match self.directory.find_user_by_email(email) {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(ServiceError::AuthFailed),
            Err(other) => return Err(other.into()),
        };

        if !verify_password(password, &user.password_hash)? || !user.is_active {
            tracing::debug!(user = %user.id, "login rejected");
            return Err(ServiceError::AuthFailed);
        }

        let now = Utc::now();
        let pair = self.tokens.issue(user.id, now)?;

        // Best effort: a session must not fail because the stamp did.
        let user = match self.directory.update_user(user.id, |u| {
            u.last_login = Some(now);
            Ok(())
        }) {
            Ok(updated) => updated,
            Err(err) => {
                tracing::warn!(user = %user.id, error = %err, "could not record login timestamp");
                user
            }
        };

        Ok(LoginSession {
            user: UserProfile::from(&user),
            access: pair.access,
            refresh: pair.refresh,
        })
    }

    /// Resolve an access assertion to the live account it names.
    ///
    /// The account is re-read on every call, so role changes, deactivation
    /// and deletion take effect immediately even though assertions are
    /// stateless.
    pub fn verify_assertion(&self, assertion: &str) -> ServiceResult<User> {
        let user_id = self.tokens.verify_access(assertion)?;
        let user = self.directory.find_user(user_id).map_err(|err| match err {
            StoreError::NotFound => ServiceError::Unauthorized,
            other => other.into(),
        })?;
        if !user.is_active {
            return Err(ServiceError::Unauthorized);
        }
        Ok(user)
    }

    /// Exchange a refresh assertion for a fresh access assertion.
    pub fn refresh_session(&self, refresh_assertion: &str) -> ServiceResult<String> {
        Ok(self.tokens.refresh(refresh_assertion, Utc::now())?)
    }

    // ── Authorization ─────────────────────────────────────────────────────

    /// Resolve the engine-facing principal for an account record.
    pub fn resolve_principal(&self, user: &User) -> ServiceResult<Principal> {
        let organization = match user.organization_id {
            Some(org_id) => {
                let org = self
                    .directory
                    .find_organization(org_id)
                    .map_err(|err| match err {
                        StoreError::NotFound => ServiceError::Fatal(format!(
                            "account {} references a missing organization",
                            user.id
                        )),
                        other => other.into(),
                    })?;
                Some(OrgContext {
                    id: org.id,
                    active: org.active,
                })
            }
            None => None,
        };

        Ok(Principal {
            user_id: user.id,
            organization,
            roles: user.roles.iter().cloned().collect(),
            is_organization_admin: user.is_organization_admin,
            is_superuser: user.is_superuser,
        })
    }

    /// The single authorization gate every operation goes through.
    pub fn authorize(&self, actor: &User, permission: Permission) -> ServiceResult<ScopeFilter> {
        let principal = self.resolve_principal(actor)?;
        match tripbook_auth::authorize(&principal, permission, &self.registry) {
            Ok(scope) => Ok(scope),
            Err(denial) => {
                tracing::debug!(actor = %actor.id, %permission, %denial, "authorization denied");
                Err(ServiceError::Denied(denial))
            }
        }
    }

    /// Scope for plain membership reads (own organization, no capability).
    fn membership_scope(&self, actor: &User) -> ServiceResult<ScopeFilter> {
        if actor.is_superuser {
            return Ok(ScopeFilter::Unrestricted);
        }
        match actor.organization_id {
            Some(org_id) => Ok(ScopeFilter::Organization(org_id)),
            None => Err(ServiceError::Denied(AuthzError::NoOrganization)),
        }
    }

    // ── Roles ─────────────────────────────────────────────────────────────

    /// Grant a role. Granting an already-held role is a no-op.
    pub fn assign_role(
        &self,
        actor: &User,
        user_id: UserId,
        role: &Role,
    ) -> ServiceResult<UserProfile> {
        let scope = self.authorize(actor, Permission::ManageOrganizationUsers)?;
        if !self.registry.contains(role) {
            return Err(ServiceError::RoleNotFound(role.as_str().to_string()));
        }
        let target = self.directory.find_user(user_id)?;
        ensure_user_in_scope(&scope, &target)?;

        let updated = self.directory.update_user(user_id, |u| {
            u.roles.insert(role.clone());
            Ok(())
        })?;
        Ok(UserProfile::from(&updated))
    }

    /// Revoke a role. Revoking a role the account does not hold is a no-op.
    pub fn remove_role(
        &self,
        actor: &User,
        user_id: UserId,
        role: &Role,
    ) -> ServiceResult<UserProfile> {
        let scope = self.authorize(actor, Permission::ManageOrganizationUsers)?;
        let target = self.directory.find_user(user_id)?;
        ensure_user_in_scope(&scope, &target)?;

        let updated = self.directory.update_user(user_id, |u| {
            u.roles.remove(role);
            Ok(())
        })?;
        Ok(UserProfile::from(&updated))
    }

    // ── Organizations ─────────────────────────────────────────────────────

    /// Public signup: create an organization together with its first admin.
    ///
    /// Atomic: a duplicate admin email leaves no organization behind. The
    /// admin gets the structural flag and, when registered, the
    /// `Administrators` role.
    pub fn register_organization(
        &self,
        organization: NewOrganization,
        admin: NewUser,
        password: &str,
    ) -> ServiceResult<(Organization, UserProfile)> {
        validate_new_password(password)?;
        let password_hash = hash_password(password)?;
        let now = Utc::now();

        let organization = Organization::create(organization, now)?;
        let mut admin = User::create(admin, password_hash, Some(organization.id), now)?;
        admin.is_organization_admin = true;
        if self.registry.contains(&Role::ADMINISTRATORS) {
            admin.roles.insert(Role::ADMINISTRATORS);
        } else {
            tracing::warn!(
                "Administrators role is not registered; signup admin holds the flag only"
            );
        }

        let (organization, admin) = self
            .directory
            .create_organization_with_admin(organization, admin)?;
        tracing::info!(organization = %organization.id, admin = %admin.id, "organization registered");
        Ok((organization, UserProfile::from(&admin)))
    }

    /// Platform-level organization creation.
    pub fn create_organization(
        &self,
        actor: &User,
        fields: NewOrganization,
    ) -> ServiceResult<Organization> {
        self.authorize(actor, Permission::ManageSystemSettings)?;
        let organization = Organization::create(fields, Utc::now())?;
        Ok(self.directory.create_organization(organization)?)
    }

    /// Flip an organization between active and inactive.
    ///
    /// Deactivation freezes the organization for its members, including the
    /// admin who could otherwise flip it back: reactivation is a superuser
    /// action by construction.
    pub fn toggle_organization_active(
        &self,
        actor: &User,
        organization_id: OrganizationId,
    ) -> ServiceResult<Organization> {
        let scope = self.authorize(actor, Permission::ManageOrganization)?;
        ensure_scope(&scope, organization_id)?;

        let now = Utc::now();
        let organization = self.directory.update_organization(organization_id, |org| {
            org.active = !org.active;
            org.updated_at = now;
            Ok(())
        })?;
        tracing::info!(
            organization = %organization.id,
            active = organization.active,
            "organization activity toggled"
        );
        Ok(organization)
    }

    /// Remove an organization and every account in it, as one unit.
    pub fn delete_organization_cascade(
        &self,
        actor: &User,
        organization_id: OrganizationId,
    ) -> ServiceResult<CascadeDeletion> {
        self.authorize(actor, Permission::ManageSystemSettings)?;
        if actor.organization_id == Some(organization_id) {
            return Err(ServiceError::Validation(
                "cannot delete the own organization".to_string(),
            ));
        }

        let outcome = self.directory.delete_organization_cascade(organization_id)?;
        tracing::info!(
            organization = %organization_id,
            users_removed = outcome.removed_users.len(),
            "organization deleted with cascade"
        );
        Ok(outcome)
    }

    /// Read one organization. Members see their own; superusers see any.
    pub fn get_organization(
        &self,
        actor: &User,
        organization_id: OrganizationId,
    ) -> ServiceResult<Organization> {
        let scope = self.membership_scope(actor)?;
        ensure_scope(&scope, organization_id)?;
        Ok(self.directory.find_organization(organization_id)?)
    }

    /// Platform-level listing of all organizations.
    pub fn list_organizations(&self, actor: &User) -> ServiceResult<Vec<Organization>> {
        let scope = self.authorize(actor, Permission::ManageSystemSettings)?;
        Ok(self.directory.list_organizations(&scope)?)
    }

    /// Headcount figures for one organization.
    pub fn organization_stats(
        &self,
        actor: &User,
        organization_id: OrganizationId,
    ) -> ServiceResult<OrganizationStats> {
        let scope = self.authorize(actor, Permission::ViewOrganizationStats)?;
        ensure_scope(&scope, organization_id)?;

        let organization = self.directory.find_organization(organization_id)?;
        let members = self
            .directory
            .list_users(&ScopeFilter::Organization(organization_id))?;

        Ok(OrganizationStats {
            organization_id,
            name: organization.name,
            total_users: members.len(),
            active_users: members.iter().filter(|u| u.is_active).count(),
            administrators: members.iter().filter(|u| u.is_organization_admin).count(),
        })
    }

    // ── Accounts ──────────────────────────────────────────────────────────

    /// Operator tooling: create a platform superuser.
    ///
    /// Superusers carry no organization; the engine grants them an
    /// unrestricted scope on every check.
    pub fn provision_superuser(
        &self,
        fields: NewUser,
        password: &str,
    ) -> ServiceResult<UserProfile> {
        validate_new_password(password)?;
        let password_hash = hash_password(password)?;
        let mut account = User::create(fields, password_hash, None, Utc::now())?;
        account.is_superuser = true;

        let account = self.directory.create_user(account)?;
        tracing::info!(user = %account.id, "superuser provisioned");
        Ok(UserProfile::from(&account))
    }

    /// Create an account inside the actor's own organization.
    pub fn create_user_in_organization(
        &self,
        actor: &User,
        fields: NewUser,
        password: &str,
        roles: &[Role],
    ) -> ServiceResult<UserProfile> {
        self.authorize(actor, Permission::ManageOrganizationUsers)?;
        let organization_id = actor
            .organization_id
            .ok_or(ServiceError::Denied(AuthzError::NoOrganization))?;

        for role in roles {
            if !self.registry.contains(role) {
                return Err(ServiceError::RoleNotFound(role.as_str().to_string()));
            }
        }
        validate_new_password(password)?;
        let password_hash = hash_password(password)?;

        let mut account = User::create(fields, password_hash, Some(organization_id), Utc::now())?;
        account.roles.extend(roles.iter().cloned());

        let account = self.directory.create_user(account)?;
        Ok(UserProfile::from(&account))
    }

    /// Read one account. Members see accounts of their own organization.
    pub fn get_user(&self, actor: &User, user_id: UserId) -> ServiceResult<UserProfile> {
        let scope = self.membership_scope(actor)?;
        let user = self.directory.find_user(user_id)?;
        ensure_user_in_scope(&scope, &user)?;
        Ok(UserProfile::from(&user))
    }

    /// List the accounts visible to the actor.
    pub fn list_users(&self, actor: &User) -> ServiceResult<Vec<UserProfile>> {
        let scope = self.authorize(actor, Permission::ManageOrganizationUsers)?;
        let users = self.directory.list_users(&scope)?;
        Ok(users.iter().map(UserProfile::from).collect())
    }

    /// Edit profile fields: one's own freely, others under the user
    /// management capability.
    pub fn update_profile(
        &self,
        actor: &User,
        user_id: UserId,
        changes: ProfileUpdate,
    ) -> ServiceResult<UserProfile> {
        if actor.id != user_id {
            let scope = self.authorize(actor, Permission::ManageOrganizationUsers)?;
            let target = self.directory.find_user(user_id)?;
            ensure_user_in_scope(&scope, &target)?;
        }

        let updated = self.directory.update_user(user_id, |u| changes.apply(u))?;
        Ok(UserProfile::from(&updated))
    }

    /// Change the own password, after re-proving the current one.
    pub fn change_password(
        &self,
        actor: &User,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        if !verify_password(current_password, &actor.password_hash)? {
            return Err(ServiceError::AuthFailed);
        }
        validate_new_password(new_password)?;
        let password_hash = hash_password(new_password)?;

        self.directory.update_user(actor.id, |u| {
            u.password_hash = password_hash;
            Ok(())
        })?;
        Ok(())
    }

    /// Remove an account. Self-deletion is rejected outright.
    pub fn delete_user(&self, actor: &User, user_id: UserId) -> ServiceResult<()> {
        if actor.id == user_id {
            return Err(ServiceError::Validation(
                "accounts cannot delete themselves".to_string(),
            ));
        }
        let scope = self.authorize(actor, Permission::ManageOrganizationUsers)?;
        let target = self.directory.find_user(user_id)?;
        ensure_user_in_scope(&scope, &target)?;

        self.directory.delete_user(user_id)?;
        tracing::info!(user = %user_id, "account deleted");
        Ok(())
    }

    /// Activate or deactivate an account.
    ///
    /// Deactivated accounts cannot log in, and their outstanding assertions
    /// stop working at the next check. Self-deactivation is rejected.
    pub fn set_user_active(
        &self,
        actor: &User,
        user_id: UserId,
        is_active: bool,
    ) -> ServiceResult<UserProfile> {
        if actor.id == user_id && !is_active {
            return Err(ServiceError::Validation(
                "accounts cannot deactivate themselves".to_string(),
            ));
        }
        let scope = self.authorize(actor, Permission::ManageOrganizationUsers)?;
        let target = self.directory.find_user(user_id)?;
        ensure_user_in_scope(&scope, &target)?;

        let updated = self.directory.update_user(user_id, |u| {
            u.is_active = is_active;
            Ok(())
        })?;
        Ok(UserProfile::from(&updated))
    }

    /// Raise or lower the organization-admin flag on an account.
    ///
    /// An admin lowering their own flag is rejected so an organization can
    /// never lock itself out of administration.
    pub fn set_organization_admin(
        &self,
        actor: &User,
        user_id: UserId,
        is_admin: bool,
    ) -> ServiceResult<UserProfile> {
        if actor.id == user_id && !is_admin {
            return Err(ServiceError::Validation(
                "administrators cannot demote themselves".to_string(),
            ));
        }
        let scope = self.authorize(actor, Permission::ManageOrganization)?;
        let target = self.directory.find_user(user_id)?;
        ensure_user_in_scope(&scope, &target)?;

        let updated = self.directory.update_user(user_id, |u| {
            u.is_organization_admin = is_admin;
            Ok(())
        })?;
        Ok(UserProfile::from(&updated))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scope helpers
// ─────────────────────────────────────────────────────────────────────────────

fn ensure_scope(scope: &ScopeFilter, organization_id: OrganizationId) -> ServiceResult<()> {
    if scope.permits(organization_id) {
        Ok(())
    } else {
        Err(ServiceError::NotFound)
    }
}

fn ensure_user_in_scope(scope: &ScopeFilter, user: &User) -> ServiceResult<()> {
    match (scope, user.organization_id) {
        (ScopeFilter::Unrestricted, _) => Ok(()),
        (ScopeFilter::Organization(own), Some(user_org)) if *own == user_org => Ok(()),
        _ => Err(ServiceError::NotFound),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
