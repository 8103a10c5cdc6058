use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role name used for RBAC.
///
/// Roles are opaque names at this layer; the mapping from a role to its
/// permission set lives in the [`crate::RoleRegistry`]. Names compare
/// case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Owners of the whole organization surface (everything except platform
    /// administration).
    pub const ADMINISTRATORS: Role = Role(Cow::Borrowed("Administrators"));
    /// Vehicle operators.
    pub const DRIVERS: Role = Role(Cow::Borrowed("Drivers"));
    /// Finance staff.
    pub const ACCOUNTANTS: Role = Role(Cow::Borrowed("Accountants"));
    /// Regular members.
    pub const USERS: Role = Role(Cow::Borrowed("Users"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
