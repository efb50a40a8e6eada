//! Application configuration, read once at startup.
//!
//! Every setting has a default. A value that is present but unparseable is
//! logged at `warn` and replaced by its default.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use taskhub_auth::AuthConfig;

use crate::usecase::PublishPolicy;

const DEV_SECRET: &str = "dev-secret";
const DEFAULT_ISSUER: &str = "taskhub";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_CHANNEL: &str = "taskhub.events";

/// Postgres pool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: String,
    /// Connections kept open while idle (sqlx `min_connections`). sqlx has no
    /// upper limit on idle connections, only this floor.
    pub min_idle: u32,
    pub max_open: u32,
    pub max_lifetime: Duration,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            min_idle: 10,
            max_open: 100,
            max_lifetime: Duration::from_secs(300),
        }
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_open.max(1))
            .min_connections(self.min_idle.min(self.max_open))
            .max_lifetime(self.max_lifetime)
    }
}

/// Change-event publishing settings. No Redis URL means no publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsConfig {
    pub redis_url: Option<String>,
    pub channel: String,
    pub policy: PublishPolicy,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            channel: DEFAULT_CHANNEL.to_string(),
            policy: PublishPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: String,
    pub auth: AuthConfig,
    /// `None` runs against the in-memory store.
    pub database: Option<DbConfig>,
    pub events: EventsConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_SECRET.to_string()
        });
        let issuer = get("JWT_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string());
        let hours = parse_or(get("JWT_EXPIRATION_HOURS"), "JWT_EXPIRATION_HOURS", 1_i64);

        let database = get("DATABASE_URL").map(|url| {
            let defaults = DbConfig::new(url);
            DbConfig {
                min_idle: parse_or(get("DATABASE_POOL_IDLE"), "DATABASE_POOL_IDLE", defaults.min_idle),
                max_open: parse_or(get("DATABASE_POOL_MAX"), "DATABASE_POOL_MAX", defaults.max_open),
                max_lifetime: Duration::from_secs(parse_or(
                    get("DATABASE_POOL_LIFETIME"),
                    "DATABASE_POOL_LIFETIME",
                    defaults.max_lifetime.as_secs(),
                )),
                ..defaults
            }
        });

        let events = EventsConfig {
            redis_url: get("EVENTS_REDIS_URL"),
            channel: get("EVENTS_CHANNEL").unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
            policy: parse_or(get("EVENTS_POLICY"), "EVENTS_POLICY", PublishPolicy::default()),
        };

        Self {
            addr: get("APP_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            auth: AuthConfig::new(secret, issuer, hours),
            database,
            events,
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> T
where
    T: FromStr + core::fmt::Debug,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, ?default, "unparseable setting; using default");
            default
        }
    }
}
