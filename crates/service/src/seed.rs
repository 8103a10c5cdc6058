//! Demo data for development environments.

use tripbook_auth::Role;
use tripbook_core::{OrganizationId, UserId};
use tripbook_directory::{DirectoryStore, NewOrganization, NewUser};

use crate::error::{ServiceError, ServiceResult};
use crate::service::FleetService;

/// Shared password of every seeded demo account.
pub const DEMO_PASSWORD: &str = "demo-fleet-2024";

/// Handles to the seeded records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAccounts {
    pub organization: OrganizationId,
    pub admin: UserId,
    pub driver: UserId,
    pub accountant: UserId,
    pub clerk: UserId,
}

/// Seed one demo organization with an admin and one account per stock role.
///
/// Idempotent: returns `Ok(None)` without touching anything when the demo
/// admin email is already registered.
pub fn seed_demo_data<D: DirectoryStore>(
    service: &FleetService<D>,
) -> ServiceResult<Option<DemoAccounts>> {
    let signup = service.register_organization(
        NewOrganization {
            name: "Riverside Fleet (Demo)".to_string(),
            email: Some("office@riverside-fleet.example".to_string()),
            address: Some("Dock 4, Riverside".to_string()),
            ..NewOrganization::default()
        },
        NewUser {
            email: "fleet.admin@riverside-fleet.example".to_string(),
            first_name: "Frances".to_string(),
            last_name: "Admin".to_string(),
            phone: None,
            position: Some("Fleet Manager".to_string()),
        },
        DEMO_PASSWORD,
    );

    let (organization, admin) = match signup {
        Ok(pair) => pair,
        Err(ServiceError::DuplicateEmail(_)) => {
            tracing::info!("demo data already present; nothing to seed");
            return Ok(None);
        }
        Err(other) => return Err(other),
    };

    // Act as the freshly created admin for the member accounts.
    let session = service.authenticate(&admin.email, DEMO_PASSWORD)?;
    let actor = service.verify_assertion(&session.access)?;

    let driver = service.create_user_in_organization(
        &actor,
        NewUser {
            email: "driver@riverside-fleet.example".to_string(),
            first_name: "Devon".to_string(),
            last_name: "Driver".to_string(),
            phone: Some("+421 900 111 222".to_string()),
            position: Some("Driver".to_string()),
        },
        DEMO_PASSWORD,
        &[Role::DRIVERS],
    )?;

    let accountant = service.create_user_in_organization(
        &actor,
        NewUser {
            email: "accountant@riverside-fleet.example".to_string(),
            first_name: "Alex".to_string(),
            last_name: "Ledger".to_string(),
            phone: None,
            position: Some("Accountant".to_string()),
        },
        DEMO_PASSWORD,
        &[Role::ACCOUNTANTS],
    )?;

    let clerk = service.create_user_in_organization(
        &actor,
        NewUser {
            email: "clerk@riverside-fleet.example".to_string(),
            first_name: "Casey".to_string(),
            last_name: "Clerk".to_string(),
            phone: None,
            position: None,
        },
        DEMO_PASSWORD,
        &[Role::USERS],
    )?;

    tracing::info!(organization = %organization.id, "demo data seeded");
    Ok(Some(DemoAccounts {
        organization: organization.id,
        admin: admin.id,
        driver: driver.id,
        accountant: accountant.id,
        clerk: clerk.id,
    }))
}
