//! Organization records: the tenancy boundary itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tripbook_core::{DomainError, DomainResult, OrganizationId};

/// Commercial flavor of an organization. Informational only; it never
/// influences authorization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationKind {
    #[default]
    Client,
    Partner,
}

/// An organization as the directory stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub kind: OrganizationKind,
    pub tax_id: Option<String>,
    pub vat_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Deactivated organizations freeze every non-read action of their
    /// members. Only a superuser can flip this back.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Build a fresh, active organization from validated fields.
    pub fn create(fields: NewOrganization, now: DateTime<Utc>) -> DomainResult<Self> {
        let fields = fields.normalized()?;
        Ok(Self {
            id: OrganizationId::new(),
            name: fields.name,
            kind: fields.kind,
            tax_id: fields.tax_id,
            vat_id: fields.vat_id,
            email: fields.email,
            phone: fields.phone,
            address: fields.address,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Incoming fields for a new organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrganization {
    pub name: String,
    #[serde(default)]
    pub kind: OrganizationKind,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub vat_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewOrganization {
    /// A minimal value with just a name, for provisioning flows.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn normalized(self) -> DomainResult<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("organization name cannot be empty"));
        }
        Ok(Self {
            name,
            kind: self.kind,
            tax_id: self.tax_id.and_then(none_if_blank),
            vat_id: self.vat_id.and_then(none_if_blank),
            email: self.email.and_then(none_if_blank),
            phone: self.phone.and_then(none_if_blank),
            address: self.address.and_then(none_if_blank),
        })
    }
}

fn none_if_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_trims_and_starts_active() {
        let org = Organization::create(
            NewOrganization {
                name: "  Riverside Logistics  ".to_string(),
                vat_id: Some(" ".to_string()),
                address: Some(" Dock 4, Riverside ".to_string()),
                ..NewOrganization::default()
            },
            Utc::now(),
        )
        .unwrap();

        assert_eq!(org.name, "Riverside Logistics");
        assert_eq!(org.kind, OrganizationKind::Client);
        assert_eq!(org.vat_id, None);
        assert_eq!(org.address.as_deref(), Some("Dock 4, Riverside"));
        assert!(org.active);
        assert_eq!(org.created_at, org.updated_at);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Organization::create(NewOrganization::named("   "), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&OrganizationKind::Partner).unwrap();
        assert_eq!(json, "\"partner\"");
    }
}
