//! The closed catalog of permission tags.
//!
//! Tags are stable wire identifiers: they appear in role catalog config,
//! in serialized denials and in client payloads. Renaming one is a breaking
//! change for every stored role and every integration, so the enum below is
//! append-only in practice.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A capability a principal may hold, granted through roles.
///
/// Serializes as its snake_case tag (`"manage_vehicles"`). Unknown tags are
/// rejected on input; there is no catch-all variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Organization management
    /// Edit organization settings, activate/deactivate it.
    ManageOrganization,
    /// Create, edit and remove accounts inside the organization.
    ManageOrganizationUsers,
    /// Read aggregate statistics about the organization.
    ViewOrganizationStats,

    // Vehicles
    ManageVehicles,
    ViewVehicleReports,
    /// Act as a driver: be assignable to vehicles and record drives.
    DriveVehicles,

    // Trips
    CreateTrips,
    /// Edit trips the principal created.
    EditOwnTrips,
    /// Edit any trip in the organization.
    EditAllTrips,
    DeleteTrips,
    ApproveTrips,

    // Reports
    ViewReports,
    GenerateReports,
    ExportReports,

    // Accounting
    ManageAccounting,
    ViewFinancialData,
    ManageExpenses,

    // Administration
    /// Access the back-office surface of the principal's organization.
    AccessAdminPanel,
    /// Cross-organization platform administration.
    ManageSystemSettings,
}

impl Permission {
    /// Every registered tag, in catalog order.
    pub const ALL: [Permission; 19] = [
        Permission::ManageOrganization,
        Permission::ManageOrganizationUsers,
        Permission::ViewOrganizationStats,
        Permission::ManageVehicles,
        Permission::ViewVehicleReports,
        Permission::DriveVehicles,
        Permission::CreateTrips,
        Permission::EditOwnTrips,
        Permission::EditAllTrips,
        Permission::DeleteTrips,
        Permission::ApproveTrips,
        Permission::ViewReports,
        Permission::GenerateReports,
        Permission::ExportReports,
        Permission::ManageAccounting,
        Permission::ViewFinancialData,
        Permission::ManageExpenses,
        Permission::AccessAdminPanel,
        Permission::ManageSystemSettings,
    ];

    /// The stable wire tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::ManageOrganization => "manage_organization",
            Permission::ManageOrganizationUsers => "manage_organization_users",
            Permission::ViewOrganizationStats => "view_organization_stats",
            Permission::ManageVehicles => "manage_vehicles",
            Permission::ViewVehicleReports => "view_vehicle_reports",
            Permission::DriveVehicles => "drive_vehicles",
            Permission::CreateTrips => "create_trips",
            Permission::EditOwnTrips => "edit_own_trips",
            Permission::EditAllTrips => "edit_all_trips",
            Permission::DeleteTrips => "delete_trips",
            Permission::ApproveTrips => "approve_trips",
            Permission::ViewReports => "view_reports",
            Permission::GenerateReports => "generate_reports",
            Permission::ExportReports => "export_reports",
            Permission::ManageAccounting => "manage_accounting",
            Permission::ViewFinancialData => "view_financial_data",
            Permission::ManageExpenses => "manage_expenses",
            Permission::AccessAdminPanel => "access_admin_panel",
            Permission::ManageSystemSettings => "manage_system_settings",
        }
    }

    /// Whether the action only reads data.
    ///
    /// Read-only actions stay available to members of a deactivated
    /// organization; everything else is frozen.
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            Permission::ViewOrganizationStats
                | Permission::ViewVehicleReports
                | Permission::ViewReports
                | Permission::ViewFinancialData
        )
    }

    /// Whether the organization-admin flag grants this capability directly,
    /// independent of role membership.
    pub fn admin_flag_gated(self) -> bool {
        matches!(
            self,
            Permission::ManageOrganization
                | Permission::ManageOrganizationUsers
                | Permission::AccessAdminPanel
        )
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag string that matches no registered permission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown permission tag '{0}'")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_strings_are_stable() {
        let tags: Vec<&str> = Permission::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            tags,
            vec![
                "manage_organization",
                "manage_organization_users",
                "view_organization_stats",
                "manage_vehicles",
                "view_vehicle_reports",
                "drive_vehicles",
                "create_trips",
                "edit_own_trips",
                "edit_all_trips",
                "delete_trips",
                "approve_trips",
                "view_reports",
                "generate_reports",
                "export_reports",
                "manage_accounting",
                "view_financial_data",
                "manage_expenses",
                "access_admin_panel",
                "manage_system_settings",
            ]
        );
    }

    #[test]
    fn serde_and_parse_agree_with_tags() {
        for permission in Permission::ALL {
            let json = serde_json::to_value(permission).unwrap();
            assert_eq!(json, serde_json::Value::String(permission.as_str().into()));
            assert_eq!(permission.as_str().parse::<Permission>(), Ok(permission));
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "fly_helicopters".parse::<Permission>().unwrap_err();
        assert_eq!(err, UnknownPermission("fly_helicopters".to_string()));
        assert!(serde_json::from_str::<Permission>("\"fly_helicopters\"").is_err());
    }

    #[test]
    fn read_only_covers_exactly_the_view_tags() {
        let read_only: Vec<Permission> = Permission::ALL
            .into_iter()
            .filter(|p| p.is_read_only())
            .collect();
        assert_eq!(
            read_only,
            vec![
                Permission::ViewOrganizationStats,
                Permission::ViewVehicleReports,
                Permission::ViewReports,
                Permission::ViewFinancialData,
            ]
        );
    }

    #[test]
    fn admin_flag_gates_the_org_admin_capabilities() {
        let gated: Vec<Permission> = Permission::ALL
            .into_iter()
            .filter(|p| p.admin_flag_gated())
            .collect();
        assert_eq!(
            gated,
            vec![
                Permission::ManageOrganization,
                Permission::ManageOrganizationUsers,
                Permission::AccessAdminPanel,
            ]
        );
    }
}
