//! Service wiring: storage backend, publisher and the three use-cases.

use std::sync::Arc;

use anyhow::Context;

use taskhub_auth::AuthConfig;
use taskhub_events::EventPublisher;
use taskhub_infra::config::EventsConfig;
use taskhub_infra::{
    AppConfig, ContactService, ContactUseCase, MemoryDb, MemoryRepository, Notifier, PgDb, PgRepository,
    RoleService, RoleUseCase, UserService, UserUseCase,
};

#[derive(Clone)]
pub struct AppServices {
    pub roles: Arc<dyn RoleService>,
    pub users: Arc<dyn UserService>,
    pub contacts: Arc<dyn ContactService>,
}

impl AppServices {
    /// Everything in process memory; used by tests and when no database is configured.
    pub fn in_memory(auth: &AuthConfig, notifier: Notifier) -> Self {
        let db = MemoryDb::new();
        Self {
            roles: Arc::new(RoleUseCase::new(db.clone(), MemoryRepository::new(), notifier.clone())),
            users: Arc::new(UserUseCase::new(
                db.clone(),
                MemoryRepository::new(),
                notifier.clone(),
                auth,
            )),
            contacts: Arc::new(ContactUseCase::new(db, MemoryRepository::new(), notifier)),
        }
    }

    pub fn postgres(db: PgDb, auth: &AuthConfig, notifier: Notifier) -> Self {
        Self {
            roles: Arc::new(RoleUseCase::new(db.clone(), PgRepository::new(), notifier.clone())),
            users: Arc::new(UserUseCase::new(
                db.clone(),
                PgRepository::new(),
                notifier.clone(),
                auth,
            )),
            contacts: Arc::new(ContactUseCase::new(db, PgRepository::new(), notifier)),
        }
    }

    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let notifier = Notifier::new(publisher(&config.events)?, config.events.policy);

        match &config.database {
            Some(db_config) => {
                let db = PgDb::connect(db_config)
                    .await
                    .context("failed to connect to postgres")?;
                db.migrate().await.context("failed to apply migrations")?;
                tracing::info!("using postgres storage");
                Ok(Self::postgres(db, &config.auth, notifier))
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory storage");
                Ok(Self::in_memory(&config.auth, notifier))
            }
        }
    }
}

#[cfg(feature = "redis")]
fn publisher(events: &EventsConfig) -> anyhow::Result<Option<Arc<dyn EventPublisher>>> {
    let Some(url) = &events.redis_url else {
        return Ok(None);
    };
    let publisher = taskhub_infra::event_bus::RedisPublisher::new(url, events.channel.clone())
        .context("invalid EVENTS_REDIS_URL")?;
    tracing::info!(channel = %events.channel, "publishing change events to redis");
    Ok(Some(Arc::new(publisher)))
}

#[cfg(not(feature = "redis"))]
fn publisher(events: &EventsConfig) -> anyhow::Result<Option<Arc<dyn EventPublisher>>> {
    if events.redis_url.is_some() {
        tracing::warn!("EVENTS_REDIS_URL set but built without the `redis` feature; events disabled");
    }
    Ok(None)
}
