//! User account records and their validation rules.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tripbook_auth::Role;
use tripbook_core::{DomainError, DomainResult, OrganizationId, UserId};

/// A user account as the directory stores it.
///
/// `password_hash` is an Argon2id PHC string; the plaintext never reaches
/// this type. The record deliberately does not implement `Serialize`:
/// boundary layers expose a profile view without the hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Lowercase, unique across all organizations.
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    /// The tenancy boundary. Fixed at creation; accounts do not move
    /// between organizations.
    pub organization_id: Option<OrganizationId>,
    pub is_organization_admin: bool,
    pub is_superuser: bool,
    /// Inactive accounts cannot log in and fail every assertion check.
    pub is_active: bool,
    pub roles: BTreeSet<Role>,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Build a fresh, active member account from validated fields.
    ///
    /// Flags start lowered; callers raise them explicitly where a flow
    /// calls for an organization admin or a superuser.
    pub fn create(
        fields: NewUser,
        password_hash: String,
        organization_id: Option<OrganizationId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let fields = fields.normalized()?;
        Ok(Self {
            id: UserId::new(),
            email: fields.email,
            password_hash,
            first_name: fields.first_name,
            last_name: fields.last_name,
            phone: fields.phone,
            position: fields.position,
            organization_id,
            is_organization_admin: false,
            is_superuser: false,
            is_active: true,
            roles: BTreeSet::new(),
            date_joined: now,
            last_login: None,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    pub fn is_member_of(&self, organization_id: OrganizationId) -> bool {
        self.organization_id == Some(organization_id)
    }
}

/// Incoming fields for a new account, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

impl NewUser {
    /// Trim and lowercase the email, trim names, drop blank optionals.
    pub fn normalized(self) -> DomainResult<Self> {
        let email = normalize_email(&self.email)?;
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        if first_name.is_empty() {
            return Err(DomainError::validation("first name cannot be empty"));
        }
        if last_name.is_empty() {
            return Err(DomainError::validation("last name cannot be empty"));
        }
        Ok(Self {
            email,
            first_name,
            last_name,
            phone: self.phone.and_then(none_if_blank),
            position: self.position.and_then(none_if_blank),
        })
    }
}

/// Partial update of the profile fields a user may edit.
///
/// `None` leaves a field untouched; a blank string clears an optional one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, user: &mut User) -> DomainResult<()> {
        if let Some(email) = self.email {
            user.email = normalize_email(&email)?;
        }
        if let Some(first_name) = self.first_name {
            let first_name = first_name.trim().to_string();
            if first_name.is_empty() {
                return Err(DomainError::validation("first name cannot be empty"));
            }
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            let last_name = last_name.trim().to_string();
            if last_name.is_empty() {
                return Err(DomainError::validation("last name cannot be empty"));
            }
            user.last_name = last_name;
        }
        if let Some(phone) = self.phone {
            user.phone = none_if_blank(phone);
        }
        if let Some(position) = self.position {
            user.position = none_if_blank(position);
        }
        Ok(())
    }
}

pub(crate) fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}

fn none_if_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
