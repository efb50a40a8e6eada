//! Postgres-backed generic repository.
//!
//! Every statement runs on the caller's transaction (`&mut **tx`); the
//! repository never opens or commits one itself.

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder, Row, Transaction};
use tracing::{Span, instrument};

use taskhub_core::PageRequest;

use super::sql::{count_query, page_query, push_value, select_list};
use super::{Filter, Record, Repository, Scope, column_values, now};
use crate::db::PgDb;
use crate::error::{StoreError, map_sqlx_error};

type PgTx = Transaction<'static, Postgres>;

#[derive(Debug)]
pub struct PgRepository<T> {
    _record: PhantomData<fn() -> T>,
}

impl<T> PgRepository<T> {
    pub fn new() -> Self {
        Self {
            _record: PhantomData,
        }
    }
}

impl<T> Default for PgRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PgRepository<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Record> PgRepository<T> {
    async fn find_scoped(&self, tx: &mut PgTx, scope: Scope, id: &str) -> Result<T, StoreError> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM {}", select_list::<T>(), T::TABLE));
        qb.push(" WHERE id = ").push_bind(id.to_string());
        qb.push(" AND ").push(scope.predicate());

        qb.build_query_as::<T>()
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error(T::ENTITY, "find_by_id", e))
    }
}

#[async_trait]
impl<T: Record> Repository<T> for PgRepository<T> {
    type Db = PgDb;

    #[instrument(skip(self, tx), fields(entity = T::ENTITY), err)]
    async fn find_by_id(&self, tx: &mut PgTx, id: &str) -> Result<T, StoreError> {
        self.find_scoped(tx, Scope::Active, id).await
    }

    #[instrument(skip(self, tx), fields(entity = T::ENTITY), err)]
    async fn find_with_trashed(&self, tx: &mut PgTx, id: &str) -> Result<T, StoreError> {
        self.find_scoped(tx, Scope::Any, id).await
    }

    #[instrument(skip(self, tx, value), fields(entity = T::ENTITY), err)]
    async fn find_one_by(
        &self,
        tx: &mut PgTx,
        column: &'static str,
        value: &str,
    ) -> Result<Option<T>, StoreError> {
        let filter = Filter::new().equals(column, value);
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM {}", select_list::<T>(), T::TABLE));
        super::sql::push_filter(&mut qb, Scope::Active, &filter);
        qb.push(" LIMIT 1");

        qb.build_query_as::<T>()
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error(T::ENTITY, "find_one_by", e))
    }

    #[instrument(skip(self, tx, record), fields(entity = T::ENTITY, id = %record.id()), err)]
    async fn create(&self, tx: &mut PgTx, record: &mut T) -> Result<(), StoreError> {
        *record.timestamps_mut() = taskhub_core::Timestamps::new(now());
        let values = column_values(record)?;

        let mut qb = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            T::TABLE,
            select_list::<T>()
        ));
        qb.push_bind(record.id().to_string());
        for value in values {
            qb.push(", ");
            push_value(&mut qb, value);
        }
        let ts = record.timestamps();
        qb.push(", ").push_bind(ts.created_at);
        qb.push(", ").push_bind(ts.updated_at);
        qb.push(", ").push_bind(ts.deleted_at);
        qb.push(")");

        qb.build()
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error(T::ENTITY, "create", e))?;
        Ok(())
    }

    #[instrument(skip(self, tx, record), fields(entity = T::ENTITY, id = %record.id()), err)]
    async fn update(&self, tx: &mut PgTx, record: &mut T) -> Result<(), StoreError> {
        record.timestamps_mut().touch(now());
        let values = column_values(record)?;

        let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", T::TABLE));
        for (column, value) in T::COLUMNS.iter().zip(values) {
            qb.push(*column).push(" = ");
            push_value(&mut qb, value);
            qb.push(", ");
        }
        qb.push("updated_at = ").push_bind(record.timestamps().updated_at);
        qb.push(" WHERE id = ").push_bind(record.id().to_string());
        qb.push(" AND deleted_at IS NULL");

        let result = qb
            .build()
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error(T::ENTITY, "update", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: T::ENTITY });
        }
        Ok(())
    }

    #[instrument(skip(self, tx, record), fields(entity = T::ENTITY, id = %record.id()), err)]
    async fn soft_delete(&self, tx: &mut PgTx, record: &mut T) -> Result<(), StoreError> {
        record.timestamps_mut().mark_deleted(now());

        let result = sqlx::query(&format!(
            "UPDATE {} SET deleted_at = $1 WHERE id = $2",
            T::TABLE
        ))
        .bind(record.timestamps().deleted_at)
        .bind(record.id())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error(T::ENTITY, "soft_delete", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: T::ENTITY });
        }
        Ok(())
    }

    #[instrument(skip(self, tx), fields(entity = T::ENTITY), err)]
    async fn restore(&self, tx: &mut PgTx, id: &str) -> Result<(), StoreError> {
        sqlx::query(&format!("UPDATE {} SET deleted_at = NULL WHERE id = $1", T::TABLE))
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error(T::ENTITY, "restore", e))?;
        Ok(())
    }

    #[instrument(skip(self, tx), fields(entity = T::ENTITY), err)]
    async fn force_delete(&self, tx: &mut PgTx, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", T::TABLE))
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error(T::ENTITY, "force_delete", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: T::ENTITY });
        }
        Ok(())
    }

    #[instrument(
        skip(self, tx, filter),
        fields(entity = T::ENTITY, scope = ?scope, page = page.page(), size = page.size(), total = tracing::field::Empty),
        err
    )]
    async fn search_scoped(
        &self,
        tx: &mut PgTx,
        scope: Scope,
        filter: &Filter,
        page: PageRequest,
    ) -> Result<(Vec<T>, u64), StoreError> {
        let records = page_query::<T>(scope, filter, page)
            .build_query_as::<T>()
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error(T::ENTITY, "search", e))?;

        let total: i64 = count_query::<T>(scope, filter)
            .build()
            .fetch_one(&mut **tx)
            .await
            .and_then(|row| row.try_get::<i64, _>(0))
            .map_err(|e| map_sqlx_error(T::ENTITY, "count", e))?;

        let total = u64::try_from(total).unwrap_or(0);
        Span::current().record("total", total);
        Ok((records, total))
    }
}
