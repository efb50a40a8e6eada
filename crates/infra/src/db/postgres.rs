use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use super::TxSource;
use crate::config::DbConfig;
use crate::error::{StoreError, map_sqlx_error};

/// Postgres connection pool handle.
///
/// The pool is configured once (see [`DbConfig`]) and shared read-only by
/// every request afterwards.
#[derive(Debug, Clone)]
pub struct PgDb {
    pool: PgPool,
}

impl PgDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool with the configured limits.
    #[instrument(skip(config), fields(max_open = config.max_open, min_idle = config.min_idle), err)]
    pub async fn connect(config: &DbConfig) -> Result<Self, StoreError> {
        let pool = config
            .pool_options()
            .connect(&config.url)
            .await
            .map_err(|e| map_sqlx_error("database", "connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database {
                operation: "migrate",
                message: e.to_string(),
            })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TxSource for PgDb {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("transaction", "begin", e))
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError> {
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("transaction", "commit", e))
    }
}
