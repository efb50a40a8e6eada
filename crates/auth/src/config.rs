//! Auth configuration, built once at startup and passed by reference.

use chrono::Duration;

/// Signing and hashing configuration.
#[derive(Clone)]
pub struct AuthConfig {
    secret: Vec<u8>,
    issuer: String,
    token_lifetime: Duration,
    password_cost: u32,
}

impl AuthConfig {
    pub const DEFAULT_LIFETIME_HOURS: i64 = 1;

    /// Build the configuration. A lifetime of zero or less hours falls back
    /// to [`Self::DEFAULT_LIFETIME_HOURS`] with a warning.
    pub fn new(secret: impl Into<Vec<u8>>, issuer: impl Into<String>, lifetime_hours: i64) -> Self {
        let lifetime_hours = if lifetime_hours <= 0 {
            tracing::warn!(
                configured = lifetime_hours,
                fallback = Self::DEFAULT_LIFETIME_HOURS,
                "invalid token lifetime; using default"
            );
            Self::DEFAULT_LIFETIME_HOURS
        } else {
            lifetime_hours
        };

        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            token_lifetime: Duration::hours(lifetime_hours),
            password_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt cost (tests use [`crate::MIN_PASSWORD_COST`]).
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    pub fn password_cost(&self) -> u32 {
        self.password_cost
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("token_lifetime", &self.token_lifetime)
            .field("password_cost", &self.password_cost)
            .finish()
    }
}
