//! Role catalog: the mapping from role names to permission sets.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{Permission, Role};

/// Registry of every role the platform knows about.
///
/// Roles are organization-independent: the same catalog serves all tenants,
/// and an account's effective permissions are the union of its roles' sets.
/// The registry is read-mostly; it changes only through [`RoleRegistry::bootstrap`],
/// which runs at provisioning time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleRegistry {
    roles: BTreeMap<Role, BTreeSet<Permission>>,
}

impl RoleRegistry {
    /// A registry with no roles at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The stock catalog every deployment starts from.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.bootstrap(&RoleCatalogConfig::builtin(), true);
        registry
    }

    pub fn contains(&self, role: &Role) -> bool {
        self.roles.contains_key(role)
    }

    pub fn permissions_of(&self, role: &Role) -> Option<&BTreeSet<Permission>> {
        self.roles.get(role)
    }

    pub fn role_names(&self) -> impl Iterator<Item = &Role> {
        self.roles.keys()
    }

    /// Union of the permission sets of the given roles.
    ///
    /// Role names that are not registered contribute nothing.
    pub fn effective_permissions(&self, roles: &[Role]) -> BTreeSet<Permission> {
        let mut effective = BTreeSet::new();
        for role in roles {
            if let Some(perms) = self.roles.get(role) {
                effective.extend(perms.iter().copied());
            }
        }
        effective
    }

    /// Load a role catalog into the registry.
    ///
    /// Existing roles named by `config` are overwritten when `replace` is
    /// true and left untouched otherwise; roles absent from `config` are
    /// never removed. Unknown permission tags are skipped with a warning so
    /// that a stale config entry can never abort provisioning.
    pub fn bootstrap(&mut self, config: &RoleCatalogConfig, replace: bool) -> BootstrapSummary {
        let mut summary = BootstrapSummary::default();

        for entry in &config.roles {
            let mut permissions = BTreeSet::new();
            for tag in &entry.permissions {
                match tag.parse::<Permission>() {
                    Ok(permission) => {
                        permissions.insert(permission);
                    }
                    Err(_) => {
                        tracing::warn!(
                            role = %entry.name,
                            tag = %tag,
                            "skipping unknown permission tag in role catalog"
                        );
                        summary
                            .unknown_tags
                            .push((entry.name.clone(), tag.clone()));
                    }
                }
            }

            let role = Role::new(entry.name.clone());
            match self.roles.get_mut(&role) {
                Some(existing) if replace => {
                    *existing = permissions;
                    summary.replaced.push(entry.name.clone());
                }
                Some(_) => {
                    summary.unchanged.push(entry.name.clone());
                }
                None => {
                    self.roles.insert(role, permissions);
                    summary.created.push(entry.name.clone());
                }
            }
        }

        summary
    }
}

/// Outcome of a [`RoleRegistry::bootstrap`] run, for operator feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapSummary {
    pub created: Vec<String>,
    pub replaced: Vec<String>,
    pub unchanged: Vec<String>,
    /// `(role name, tag)` pairs that were skipped.
    pub unknown_tags: Vec<(String, String)>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Serializable role catalog, as read from provisioning config.
///
/// Permissions are carried as raw tag strings here so that a config written
/// against a newer catalog still loads on an older build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCatalogConfig {
    pub roles: Vec<RoleCatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCatalogEntry {
    pub name: String,
    pub permissions: Vec<String>,
}

impl RoleCatalogConfig {
    /// The four stock roles.
    ///
    /// `Administrators` holds every tag except `manage_system_settings`,
    /// which no built-in role grants: platform administration is reserved
    /// for superusers.
    pub fn builtin() -> Self {
        let administrators: Vec<Permission> = Permission::ALL
            .into_iter()
            .filter(|p| *p != Permission::ManageSystemSettings)
            .collect();

        Self {
            roles: vec![
                entry(Role::ADMINISTRATORS.as_str(), &administrators),
                entry(
                    Role::DRIVERS.as_str(),
                    &[
                        Permission::DriveVehicles,
                        Permission::ViewVehicleReports,
                        Permission::CreateTrips,
                        Permission::EditOwnTrips,
                        Permission::ViewReports,
                    ],
                ),
                entry(
                    Role::ACCOUNTANTS.as_str(),
                    &[
                        Permission::ViewOrganizationStats,
                        Permission::ApproveTrips,
                        Permission::EditAllTrips,
                        Permission::ViewReports,
                        Permission::GenerateReports,
                        Permission::ExportReports,
                        Permission::ManageAccounting,
                        Permission::ViewFinancialData,
                        Permission::ManageExpenses,
                    ],
                ),
                entry(
                    Role::USERS.as_str(),
                    &[
                        Permission::CreateTrips,
                        Permission::EditOwnTrips,
                        Permission::ViewReports,
                    ],
                ),
            ],
        }
    }
}

fn entry(name: &str, permissions: &[Permission]) -> RoleCatalogEntry {
    RoleCatalogEntry {
        name: name.to_string(),
        permissions: permissions.iter().map(|p| p.as_str().to_string()).collect(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
