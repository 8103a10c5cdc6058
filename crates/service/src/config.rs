//! Runtime configuration for sessions and signing.

use chrono::Duration;

/// Signing secret and session lifetimes.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl SecurityConfig {
    /// Config with the stock lifetimes: 15 minute access, 7 day refresh.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
        }
    }

    /// Read the signing secret from `TRIPBOOK_JWT_SECRET`.
    ///
    /// Falls back to an insecure development default so that local runs
    /// work out of the box; the warning makes sure nobody ships that.
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("TRIPBOOK_JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("TRIPBOOK_JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });
        Self::new(jwt_secret)
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_lifetimes() {
        let config = SecurityConfig::new("secret");
        assert_eq!(config.access_ttl, Duration::minutes(15));
        assert_eq!(config.refresh_ttl, Duration::days(7));
    }

    #[test]
    fn builders_override_lifetimes() {
        let config = SecurityConfig::new("secret")
            .with_access_ttl(Duration::minutes(5))
            .with_refresh_ttl(Duration::days(1));
        assert_eq!(config.access_ttl, Duration::minutes(5));
        assert_eq!(config.refresh_ttl, Duration::days(1));
    }
}
