//! In-memory transactional storage for tests/dev.
//!
//! Transactions are serialised: `begin` takes an exclusive owned lock on the
//! table set and works on a staged copy. `commit` swaps the staged copy in;
//! dropping the transaction throws it away.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::TxSource;
use crate::error::StoreError;

/// Rows keyed by table name, then by record id. Rows are stored as JSON.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    tables: HashMap<&'static str, BTreeMap<String, serde_json::Value>>,
}

impl Tables {
    pub(crate) fn table(&self, name: &'static str) -> Option<&BTreeMap<String, serde_json::Value>> {
        self.tables.get(name)
    }

    pub(crate) fn table_mut(&mut self, name: &'static str) -> &mut BTreeMap<String, serde_json::Value> {
        self.tables.entry(name).or_default()
    }

    pub fn row_count(&self, name: &'static str) -> usize {
        self.table(name).map_or(0, BTreeMap::len)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDb {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed row count of a table (waits for any open transaction).
    pub async fn row_count(&self, table: &'static str) -> usize {
        self.tables.lock().await.row_count(table)
    }
}

/// Open in-memory transaction.
#[derive(Debug)]
pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
}

impl MemoryTx {
    pub(crate) fn tables(&self) -> &Tables {
        &self.staged
    }

    pub(crate) fn tables_mut(&mut self) -> &mut Tables {
        &mut self.staged
    }
}

#[async_trait]
impl TxSource for MemoryDb {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTx { guard, staged })
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError> {
        let MemoryTx { mut guard, staged } = tx;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dropped_transactions_discard_writes() {
        let db = MemoryDb::new();

        let mut tx = db.begin().await.unwrap();
        tx.tables_mut()
            .table_mut("roles")
            .insert("r-1".into(), serde_json::json!({}));
        drop(tx);
        assert_eq!(db.row_count("roles").await, 0);

        let mut tx = db.begin().await.unwrap();
        tx.tables_mut()
            .table_mut("roles")
            .insert("r-1".into(), serde_json::json!({}));
        db.commit(tx).await.unwrap();
        assert_eq!(db.row_count("roles").await, 1);
    }
}
