//! Generic entity repository.
//!
//! One CRUD core serves every entity. A [`Record`] describes its table
//! (name, business columns, unique and owner columns) and the backends
//! ([`PgRepository`], [`MemoryRepository`]) implement the [`Repository`]
//! contract once for all of them.
//!
//! Visibility is explicit: default lookups only see rows whose `deleted_at`
//! is null, and the trashed queries opt into [`Scope::Trashed`] themselves.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::FromRow;
use sqlx::postgres::PgRow;

use taskhub_core::{Entity, PageRequest, Timestamps};

use crate::db::{TxOf, TxSource};
use crate::error::StoreError;

pub mod memory;
pub mod postgres;
pub(crate) mod sql;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// A column value as bound into SQL or compared in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    OptText(Option<String>),
    Bool(bool),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::OptText(s) => s.as_deref(),
            Value::Bool(_) => None,
        }
    }
}

/// A row of one entity table.
///
/// Table and column names are `'static` metadata; they are the only
/// identifiers ever spliced into SQL text.
pub trait Record:
    Entity
    + Clone
    + core::fmt::Debug
    + Send
    + Sync
    + Unpin
    + Serialize
    + DeserializeOwned
    + for<'r> FromRow<'r, PgRow>
    + 'static
{
    /// Entity name used in errors and events (`"role"`).
    const ENTITY: &'static str;

    const TABLE: &'static str;

    /// Business columns in bind order (excludes `id` and timestamps).
    const COLUMNS: &'static [&'static str];

    /// Columns backed by a unique index.
    const UNIQUE: &'static [&'static str] = &[];

    /// Column holding the owning user's id, for owner-scoped entities.
    const OWNER: Option<&'static str> = None;

    /// Value of a business column.
    fn value(&self, column: &str) -> Option<Value>;

    /// Flat projection published in change events.
    fn event_payload(&self) -> serde_json::Value;
}

/// Which rows a query may see.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scope {
    /// `deleted_at IS NULL` (the default).
    Active,
    /// `deleted_at IS NOT NULL` (the recycle bin).
    Trashed,
    /// Every row regardless of soft-delete state.
    Any,
}

impl Scope {
    pub fn admits(&self, timestamps: &Timestamps) -> bool {
        match self {
            Scope::Active => !timestamps.is_deleted(),
            Scope::Trashed => timestamps.is_deleted(),
            Scope::Any => true,
        }
    }

    pub(crate) fn predicate(&self) -> &'static str {
        match self {
            Scope::Active => "deleted_at IS NULL",
            Scope::Trashed => "deleted_at IS NOT NULL",
            Scope::Any => "TRUE",
        }
    }
}

/// One search condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Case-insensitive substring match against any of `columns`.
    Contains {
        columns: &'static [&'static str],
        value: String,
    },
    /// Exact match.
    Equals { column: &'static str, value: String },
}

/// Conjunction of criteria shared by the page query and the count query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    criteria: Vec<Criterion>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a substring criterion; blank values are ignored.
    pub fn contains(mut self, columns: &'static [&'static str], value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.criteria.push(Criterion::Contains {
                columns,
                value: value.to_string(),
            });
        }
        self
    }

    pub fn equals(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.criteria.push(Criterion::Equals {
            column,
            value: value.into(),
        });
        self
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Evaluate the filter against a record (in-memory backend).
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        self.criteria.iter().all(|criterion| match criterion {
            Criterion::Contains { columns, value } => {
                let needle = value.to_lowercase();
                columns.iter().any(|column| {
                    record
                        .value(column)
                        .and_then(|v| v.as_text().map(str::to_lowercase))
                        .is_some_and(|hay| hay.contains(&needle))
                })
            }
            Criterion::Equals { column, value } => record
                .value(column)
                .is_some_and(|v| v.as_text() == Some(value.as_str())),
        })
    }
}

/// Per-entity data access, always inside a caller-owned transaction.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync + 'static {
    type Db: TxSource;

    /// Visible row by id, or `NotFound`.
    async fn find_by_id(&self, tx: &mut TxOf<Self::Db>, id: &str) -> Result<T, StoreError>;

    /// Row by id regardless of soft-delete state, or `NotFound`.
    async fn find_with_trashed(&self, tx: &mut TxOf<Self::Db>, id: &str) -> Result<T, StoreError>;

    /// First visible row whose `column` equals `value`.
    async fn find_one_by(
        &self,
        tx: &mut TxOf<Self::Db>,
        column: &'static str,
        value: &str,
    ) -> Result<Option<T>, StoreError>;

    /// Insert; stamps `created_at = updated_at = now` and clears `deleted_at`.
    async fn create(&self, tx: &mut TxOf<Self::Db>, record: &mut T) -> Result<(), StoreError>;

    /// Full-row update of a visible row; refreshes `updated_at`.
    async fn update(&self, tx: &mut TxOf<Self::Db>, record: &mut T) -> Result<(), StoreError>;

    /// Stamp `deleted_at = now`. Calling twice re-stamps.
    async fn soft_delete(&self, tx: &mut TxOf<Self::Db>, record: &mut T) -> Result<(), StoreError>;

    /// Clear `deleted_at` whatever the row's state. Missing rows are not an error.
    async fn restore(&self, tx: &mut TxOf<Self::Db>, id: &str) -> Result<(), StoreError>;

    /// Physically remove the row whatever its state; `NotFound` if absent.
    async fn force_delete(&self, tx: &mut TxOf<Self::Db>, id: &str) -> Result<(), StoreError>;

    /// Page of rows in `scope` matching `filter`, plus the unpaginated total.
    async fn search_scoped(
        &self,
        tx: &mut TxOf<Self::Db>,
        scope: Scope,
        filter: &Filter,
        page: PageRequest,
    ) -> Result<(Vec<T>, u64), StoreError>;

    async fn search(
        &self,
        tx: &mut TxOf<Self::Db>,
        filter: &Filter,
        page: PageRequest,
    ) -> Result<(Vec<T>, u64), StoreError> {
        self.search_scoped(tx, Scope::Active, filter, page).await
    }

    async fn search_trashed(
        &self,
        tx: &mut TxOf<Self::Db>,
        filter: &Filter,
        page: PageRequest,
    ) -> Result<(Vec<T>, u64), StoreError> {
        self.search_scoped(tx, Scope::Trashed, filter, page).await
    }
}

/// Current instant at the precision Postgres stores (microseconds).
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Value of every business column, in `T::COLUMNS` order.
pub(crate) fn column_values<T: Record>(record: &T) -> Result<Vec<Value>, StoreError> {
    T::COLUMNS
        .iter()
        .map(|column| {
            record.value(column).ok_or_else(|| StoreError::Corrupt {
                entity: T::ENTITY,
                message: format!("no value for column {column}"),
            })
        })
        .collect()
}
