//! Transaction sources.
//!
//! A [`TxSource`] opens transactions and commits them. Rolling back is never
//! an explicit call: dropping an uncommitted transaction discards its writes,
//! so every early return, error or cancelled future rolls back.

use async_trait::async_trait;

use crate::error::StoreError;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryDb, MemoryTx};
pub use postgres::PgDb;

#[async_trait]
pub trait TxSource: Clone + Send + Sync + 'static {
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError>;
}

/// Transaction type of a source.
pub type TxOf<D> = <D as TxSource>::Tx;
