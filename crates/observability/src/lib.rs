//! Shared tracing setup for every tripbook process.
//!
//! Authorization decisions and account mutations log structured fields
//! (`user`, `organization`, `denial`); JSON output keeps those machine
//! readable. Plaintext credentials never appear in any event.

use tracing_subscriber::EnvFilter;

/// Initialize process-wide tracing.
///
/// Safe to call multiple times; subsequent calls are no-ops. Filtering is
/// driven by `RUST_LOG`, defaulting to `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .with_current_span(false)
        .try_init();
}
