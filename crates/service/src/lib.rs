//! `tripbook-service` — the application service tying sessions, authorization
//! and the directory together.
//!
//! Transport layers (HTTP handlers, CLI tooling) call into [`FleetService`];
//! nothing below this crate knows about requests or responses.

pub mod config;
pub mod error;
pub mod seed;
pub mod service;

pub use config::SecurityConfig;
pub use error::{ServiceError, ServiceResult};
pub use seed::{seed_demo_data, DemoAccounts, DEMO_PASSWORD};
pub use service::{FleetService, LoginSession, OrganizationStats, UserProfile};
