//! The authorization engine: one pure decision function for every action.

use serde::Serialize;
use thiserror::Error;

use tripbook_core::{OrganizationId, UserId};

use crate::{Permission, Role, RoleRegistry};

/// Organization facts the engine needs about a principal's tenancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrgContext {
    pub id: OrganizationId,
    pub active: bool,
}

/// A fully resolved principal for authorization decisions.
///
/// Construction is decoupled from storage and transport: the service layer
/// resolves one from the account record, tests build them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    /// The organization the principal belongs to, if any. Superusers may
    /// legitimately have none.
    pub organization: Option<OrgContext>,
    pub roles: Vec<Role>,
    /// Structural flag: administers the own organization. Independent of
    /// role membership.
    pub is_organization_admin: bool,
    /// Structural flag: platform operator. Bypasses tenancy entirely.
    pub is_superuser: bool,
}

/// The visibility bound attached to every allow decision.
///
/// Collaborators must filter reads and target checks through this verbatim;
/// the engine never returns an unscoped allow to a non-superuser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScopeFilter {
    /// No tenancy bound. Only ever granted to superusers.
    Unrestricted,
    /// Rows belonging to this organization only.
    Organization(OrganizationId),
}

impl ScopeFilter {
    pub fn permits(&self, organization_id: OrganizationId) -> bool {
        match self {
            ScopeFilter::Unrestricted => true,
            ScopeFilter::Organization(own) => *own == organization_id,
        }
    }
}

/// Why an action was denied.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    /// The principal belongs to no organization and is not a superuser.
    #[error("no organization membership")]
    NoOrganization,

    /// The principal's organization is deactivated and the action writes.
    #[error("organization is inactive")]
    OrganizationInactive,

    /// The principal's roles and flags grant no matching capability.
    #[error("missing permission '{0}'")]
    PermissionDenied(Permission),
}

/// Decide whether `principal` may perform the action guarded by `required`.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
///
/// Checks run in a fixed order: superuser bypass, membership, organization
/// activity, then capability. The organization-admin flag satisfies the
/// flag-gated tags in addition to any role grant, never instead of one.
pub fn authorize(
    principal: &Principal,
    required: Permission,
    registry: &RoleRegistry,
) -> Result<ScopeFilter, AuthzError> {
    if principal.is_superuser {
        return Ok(ScopeFilter::Unrestricted);
    }

    let org = principal.organization.ok_or(AuthzError::NoOrganization)?;

    if !org.active && !required.is_read_only() {
        return Err(AuthzError::OrganizationInactive);
    }

    if required.admin_flag_gated() && principal.is_organization_admin {
        return Ok(ScopeFilter::Organization(org.id));
    }

    if registry
        .effective_permissions(&principal.roles)
        .contains(&required)
    {
        return Ok(ScopeFilter::Organization(org.id));
    }

    Err(AuthzError::PermissionDenied(required))
}

// ─────────────────────────────────────────────────────────────────────────────
// Principal predicates
// ─────────────────────────────────────────────────────────────────────────────

impl Principal {
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    /// Capability check without the tenancy gates. Superusers hold everything.
    pub fn has_permission(&self, permission: Permission, registry: &RoleRegistry) -> bool {
        self.is_superuser
            || registry
                .effective_permissions(&self.roles)
                .contains(&permission)
    }

    pub fn can_manage_organization(&self) -> bool {
        self.is_organization_admin || self.is_superuser
    }

    pub fn can_manage_trips(&self, registry: &RoleRegistry) -> bool {
        self.has_permission(Permission::EditAllTrips, registry)
            || self.has_permission(Permission::DeleteTrips, registry)
    }

    pub fn can_view_financials(&self, registry: &RoleRegistry) -> bool {
        self.has_permission(Permission::ViewFinancialData, registry)
            || self.has_permission(Permission::ManageAccounting, registry)
    }

    /// Driver duty is granted by the capability or by `Drivers` membership,
    /// so a deployment that strips the tag from the role keeps its drivers.
    pub fn can_drive_vehicles(&self, registry: &RoleRegistry) -> bool {
        self.has_permission(Permission::DriveVehicles, registry)
            || self.has_role(&Role::DRIVERS)
    }

    pub fn can_access_admin_features(&self, registry: &RoleRegistry) -> bool {
        self.is_organization_admin
            || self.is_superuser
            || self.has_permission(Permission::AccessAdminPanel, registry)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn member(org: Option<OrgContext>, roles: Vec<Role>) -> Principal {
        Principal {
            user_id: UserId::new(),
            organization: org,
            roles,
            is_organization_admin: false,
            is_superuser: false,
        }
    }

    fn active_org() -> OrgContext {
        OrgContext {
            id: OrganizationId::new(),
            active: true,
        }
    }

    #[test]
    fn superuser_is_unrestricted_even_without_an_organization() {
        let registry = RoleRegistry::builtin();
        let mut principal = member(None, vec![]);
        principal.is_superuser = true;

        for permission in Permission::ALL {
            assert_eq!(
                authorize(&principal, permission, &registry),
                Ok(ScopeFilter::Unrestricted)
            );
        }
    }

    #[test]
    fn superuser_in_an_inactive_organization_is_still_unrestricted() {
        let registry = RoleRegistry::builtin();
        let mut principal = member(
            Some(OrgContext {
                id: OrganizationId::new(),
                active: false,
            }),
            vec![],
        );
        principal.is_superuser = true;

        assert_eq!(
            authorize(&principal, Permission::ManageOrganization, &registry),
            Ok(ScopeFilter::Unrestricted)
        );
    }

    #[test]
    fn no_membership_is_denied_before_anything_else() {
        let registry = RoleRegistry::builtin();
        let principal = member(None, vec![Role::ADMINISTRATORS]);

        assert_eq!(
            authorize(&principal, Permission::ViewReports, &registry),
            Err(AuthzError::NoOrganization)
        );
    }

    #[test]
    fn inactive_organization_freezes_writes_even_for_its_admin() {
        let registry = RoleRegistry::builtin();
        let org = OrgContext {
            id: OrganizationId::new(),
            active: false,
        };
        let mut principal = member(Some(org), vec![Role::ADMINISTRATORS]);
        principal.is_organization_admin = true;

        assert_eq!(
            authorize(&principal, Permission::ManageOrganization, &registry),
            Err(AuthzError::OrganizationInactive)
        );
        assert_eq!(
            authorize(&principal, Permission::CreateTrips, &registry),
            Err(AuthzError::OrganizationInactive)
        );
    }

    #[test]
    fn inactive_organization_still_serves_reads() {
        let registry = RoleRegistry::builtin();
        let org = OrgContext {
            id: OrganizationId::new(),
            active: false,
        };
        let principal = member(Some(org), vec![Role::ACCOUNTANTS]);

        assert_eq!(
            authorize(&principal, Permission::ViewReports, &registry),
            Ok(ScopeFilter::Organization(org.id))
        );
        assert_eq!(
            authorize(&principal, Permission::ViewFinancialData, &registry),
            Ok(ScopeFilter::Organization(org.id))
        );
    }

    #[test]
    fn admin_flag_grants_the_gated_tags_without_any_role() {
        let registry = RoleRegistry::builtin();
        let org = active_org();
        let mut principal = member(Some(org), vec![]);
        principal.is_organization_admin = true;

        assert_eq!(
            authorize(&principal, Permission::ManageOrganizationUsers, &registry),
            Ok(ScopeFilter::Organization(org.id))
        );
        // The flag does not leak into non-gated tags.
        assert_eq!(
            authorize(&principal, Permission::ManageVehicles, &registry),
            Err(AuthzError::PermissionDenied(Permission::ManageVehicles))
        );
    }

    #[test]
    fn role_grant_satisfies_a_gated_tag_without_the_flag() {
        let registry = RoleRegistry::builtin();
        let org = active_org();
        let principal = member(Some(org), vec![Role::ADMINISTRATORS]);
        assert!(!principal.is_organization_admin);

        assert_eq!(
            authorize(&principal, Permission::ManageOrganizationUsers, &registry),
            Ok(ScopeFilter::Organization(org.id))
        );
    }

    #[test]
    fn missing_capability_names_the_permission() {
        let registry = RoleRegistry::builtin();
        let principal = member(Some(active_org()), vec![Role::DRIVERS]);

        assert_eq!(
            authorize(&principal, Permission::ApproveTrips, &registry),
            Err(AuthzError::PermissionDenied(Permission::ApproveTrips))
        );
    }

    #[test]
    fn allow_is_always_scoped_to_the_own_organization() {
        let registry = RoleRegistry::builtin();
        let org = active_org();
        let other = OrganizationId::new();
        let principal = member(Some(org), vec![Role::USERS]);

        let scope = authorize(&principal, Permission::CreateTrips, &registry).unwrap();
        assert!(scope.permits(org.id));
        assert!(!scope.permits(other));
    }

    #[test]
    fn predicates_combine_flags_and_grants() {
        let registry = RoleRegistry::builtin();

        let driver = member(Some(active_org()), vec![Role::DRIVERS]);
        assert!(driver.can_drive_vehicles(&registry));
        assert!(!driver.can_manage_trips(&registry));
        assert!(!driver.can_access_admin_features(&registry));

        let accountant = member(Some(active_org()), vec![Role::ACCOUNTANTS]);
        assert!(accountant.can_view_financials(&registry));
        assert!(accountant.can_manage_trips(&registry));

        let mut org_admin = member(Some(active_org()), vec![]);
        org_admin.is_organization_admin = true;
        assert!(org_admin.can_manage_organization());
        assert!(org_admin.can_access_admin_features(&registry));
        assert!(!org_admin.can_drive_vehicles(&registry));
    }
}
