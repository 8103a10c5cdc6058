//! `tripbook-directory` — accounts, organizations and their storage seam.
//!
//! The directory enforces the record-level rules (email uniqueness, field
//! validation, atomic read-modify-write); who may touch which record is the
//! service layer's business.

pub mod in_memory;
pub mod organization;
pub mod store;
pub mod user;

pub use in_memory::InMemoryDirectory;
pub use organization::{NewOrganization, Organization, OrganizationKind};
pub use store::{CascadeDeletion, DirectoryStore, StoreError, StoreResult};
pub use user::{NewUser, ProfileUpdate, User};
