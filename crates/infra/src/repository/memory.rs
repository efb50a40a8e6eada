//! In-memory generic repository for tests/dev.
//!
//! Mirrors the Postgres backend's observable behaviour: the same visibility
//! scopes, the same ordering, unique-column conflicts across active and
//! trashed rows, and one predicate for both the page and the total.

use std::marker::PhantomData;

use async_trait::async_trait;

use taskhub_core::{PageRequest, Timestamps};

use super::{Filter, Record, Repository, Scope, now};
use crate::db::{MemoryDb, MemoryTx};
use crate::error::StoreError;

#[derive(Debug)]
pub struct MemoryRepository<T> {
    _record: PhantomData<fn() -> T>,
}

impl<T> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            _record: PhantomData,
        }
    }
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MemoryRepository<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Record> MemoryRepository<T> {
    fn decode(value: &serde_json::Value) -> Result<T, StoreError> {
        serde_json::from_value(value.clone()).map_err(|e| StoreError::Corrupt {
            entity: T::ENTITY,
            message: e.to_string(),
        })
    }

    fn encode(record: &T) -> Result<serde_json::Value, StoreError> {
        serde_json::to_value(record).map_err(|e| StoreError::Corrupt {
            entity: T::ENTITY,
            message: e.to_string(),
        })
    }

    fn rows(tx: &MemoryTx) -> Result<Vec<T>, StoreError> {
        let Some(table) = tx.tables().table(T::TABLE) else {
            return Ok(Vec::new());
        };
        let mut rows = table.values().map(Self::decode).collect::<Result<Vec<T>, _>>()?;
        rows.sort_by(|a, b| {
            a.timestamps()
                .created_at
                .cmp(&b.timestamps().created_at)
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(rows)
    }

    fn find_scoped(tx: &MemoryTx, scope: Scope, id: &str) -> Result<T, StoreError> {
        let row = tx
            .tables()
            .table(T::TABLE)
            .and_then(|table| table.get(id))
            .ok_or(StoreError::NotFound { entity: T::ENTITY })?;
        let record = Self::decode(row)?;
        if scope.admits(record.timestamps()) {
            Ok(record)
        } else {
            Err(StoreError::NotFound { entity: T::ENTITY })
        }
    }

    /// Emulates the unique indexes: trashed rows still hold their values.
    fn check_unique(tx: &MemoryTx, record: &T) -> Result<(), StoreError> {
        for column in T::UNIQUE {
            let Some(mine) = record.value(column) else {
                continue;
            };
            for other in Self::rows(tx)? {
                if other.id() != record.id() && other.value(column).as_ref() == Some(&mine) {
                    return Err(StoreError::Conflict(format!("{}_{}_key", T::TABLE, column)));
                }
            }
        }
        Ok(())
    }

    fn write(tx: &mut MemoryTx, record: &T) -> Result<(), StoreError> {
        let encoded = Self::encode(record)?;
        tx.tables_mut()
            .table_mut(T::TABLE)
            .insert(record.id().to_string(), encoded);
        Ok(())
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
    type Db = MemoryDb;

    async fn find_by_id(&self, tx: &mut MemoryTx, id: &str) -> Result<T, StoreError> {
        Self::find_scoped(tx, Scope::Active, id)
    }

    async fn find_with_trashed(&self, tx: &mut MemoryTx, id: &str) -> Result<T, StoreError> {
        Self::find_scoped(tx, Scope::Any, id)
    }

    async fn find_one_by(
        &self,
        tx: &mut MemoryTx,
        column: &'static str,
        value: &str,
    ) -> Result<Option<T>, StoreError> {
        let filter = Filter::new().equals(column, value);
        Ok(Self::rows(tx)?
            .into_iter()
            .find(|r| Scope::Active.admits(r.timestamps()) && filter.matches(r)))
    }

    async fn create(&self, tx: &mut MemoryTx, record: &mut T) -> Result<(), StoreError> {
        *record.timestamps_mut() = Timestamps::new(now());

        let exists = tx
            .tables()
            .table(T::TABLE)
            .is_some_and(|table| table.contains_key(record.id()));
        if exists {
            return Err(StoreError::Conflict(format!("{}_pkey", T::TABLE)));
        }
        Self::check_unique(tx, record)?;
        Self::write(tx, record)
    }

    async fn update(&self, tx: &mut MemoryTx, record: &mut T) -> Result<(), StoreError> {
        let current = Self::find_scoped(tx, Scope::Active, record.id())?;
        Self::check_unique(tx, record)?;

        let mut timestamps = current.timestamps().clone();
        timestamps.touch(now());
        *record.timestamps_mut() = timestamps;
        Self::write(tx, record)
    }

    async fn soft_delete(&self, tx: &mut MemoryTx, record: &mut T) -> Result<(), StoreError> {
        let mut stored = Self::find_scoped(tx, Scope::Any, record.id())?;
        stored.timestamps_mut().mark_deleted(now());
        record.timestamps_mut().deleted_at = stored.timestamps().deleted_at;
        Self::write(tx, &stored)
    }

    async fn restore(&self, tx: &mut MemoryTx, id: &str) -> Result<(), StoreError> {
        match Self::find_scoped(tx, Scope::Any, id) {
            Ok(mut stored) => {
                stored.timestamps_mut().restore();
                Self::write(tx, &stored)
            }
            Err(StoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn force_delete(&self, tx: &mut MemoryTx, id: &str) -> Result<(), StoreError> {
        tx.tables_mut()
            .table_mut(T::TABLE)
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { entity: T::ENTITY })
    }

    async fn search_scoped(
        &self,
        tx: &mut MemoryTx,
        scope: Scope,
        filter: &Filter,
        page: PageRequest,
    ) -> Result<(Vec<T>, u64), StoreError> {
        let matching: Vec<T> = Self::rows(tx)?
            .into_iter()
            .filter(|r| scope.admits(r.timestamps()) && filter.matches(r))
            .collect();

        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let records = matching.into_iter().skip(offset).take(limit).collect();
        Ok((records, total))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::TxSource;
    use crate::records::{Role, User};

    fn role(id: &str, name: &str) -> Role {
        Role {
            id: id.into(),
            name: name.into(),
            timestamps: Timestamps::new(Utc::now()),
        }
    }

    fn user(id: &str, email: &str) -> User {
        User {
            id: id.into(),
            email: email.into(),
            password_hash: "hash".into(),
            name: "Someone".into(),
            role_id: None,
            department_id: None,
            is_active: false,
            session_id: None,
            timestamps: Timestamps::new(Utc::now()),
        }
    }

    #[tokio::test]
    async fn trashed_rows_only_show_up_when_asked_for() {
        let db = MemoryDb::new();
        let repo = MemoryRepository::<Role>::new();
        let mut tx = db.begin().await.unwrap();

        let mut admin = role("a", "Admin");
        repo.create(&mut tx, &mut admin).await.unwrap();
        repo.soft_delete(&mut tx, &mut admin).await.unwrap();
        assert!(admin.timestamps.deleted_at.is_some());

        assert!(matches!(
            repo.find_by_id(&mut tx, "a").await,
            Err(StoreError::NotFound { entity: "role" })
        ));
        assert!(repo.find_with_trashed(&mut tx, "a").await.is_ok());

        let page = PageRequest::new(1, 10);
        let (active, total) = repo.search(&mut tx, &Filter::new(), page).await.unwrap();
        assert!(active.is_empty());
        assert_eq!(total, 0);

        let (trashed, total) = repo.search_trashed(&mut tx, &Filter::new(), page).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(trashed[0].name, "Admin");

        repo.restore(&mut tx, "a").await.unwrap();
        assert!(repo.find_by_id(&mut tx, "a").await.is_ok());
    }

    #[tokio::test]
    async fn totals_ignore_paging_and_order_is_stable() {
        let db = MemoryDb::new();
        let repo = MemoryRepository::<Role>::new();
        let mut tx = db.begin().await.unwrap();

        for (id, name) in [("a", "Admin"), ("b", "Auditor"), ("c", "Guest")] {
            repo.create(&mut tx, &mut role(id, name)).await.unwrap();
        }

        let filter = Filter::new().contains(&["name"], Some("a"));
        let (first, total) = repo
            .search(&mut tx, &filter, PageRequest::new(1, 1))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "a");

        let (second, _) = repo
            .search(&mut tx, &filter, PageRequest::new(2, 1))
            .await
            .unwrap();
        assert_eq!(second[0].id, "b");
    }

    #[tokio::test]
    async fn unique_columns_stay_reserved_by_trashed_rows() {
        let db = MemoryDb::new();
        let repo = MemoryRepository::<User>::new();
        let mut tx = db.begin().await.unwrap();

        let mut first = user("u1", "ann@example.com");
        repo.create(&mut tx, &mut first).await.unwrap();
        repo.soft_delete(&mut tx, &mut first).await.unwrap();

        let err = repo
            .create(&mut tx, &mut user("u2", "ann@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        assert!(
            repo.find_one_by(&mut tx, "email", "ann@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn purge_reports_missing_rows_and_restore_does_not() {
        let db = MemoryDb::new();
        let repo = MemoryRepository::<Role>::new();
        let mut tx = db.begin().await.unwrap();

        assert!(matches!(
            repo.force_delete(&mut tx, "ghost").await,
            Err(StoreError::NotFound { .. })
        ));
        repo.restore(&mut tx, "ghost").await.unwrap();

        repo.create(&mut tx, &mut role("a", "Admin")).await.unwrap();
        repo.force_delete(&mut tx, "a").await.unwrap();
        assert!(repo.find_with_trashed(&mut tx, "a").await.is_err());
    }

    #[tokio::test]
    async fn updating_a_trashed_row_is_not_found() {
        let db = MemoryDb::new();
        let repo = MemoryRepository::<Role>::new();
        let mut tx = db.begin().await.unwrap();

        let mut admin = role("a", "Admin");
        repo.create(&mut tx, &mut admin).await.unwrap();
        let created_at = admin.timestamps.created_at;
        repo.soft_delete(&mut tx, &mut admin).await.unwrap();

        admin.name = "Root".into();
        assert!(matches!(
            repo.update(&mut tx, &mut admin).await,
            Err(StoreError::NotFound { .. })
        ));

        repo.restore(&mut tx, "a").await.unwrap();
        let mut admin = repo.find_by_id(&mut tx, "a").await.unwrap();
        admin.name = "Root".into();
        repo.update(&mut tx, &mut admin).await.unwrap();
        assert_eq!(admin.timestamps.created_at, created_at);
        assert!(admin.timestamps.updated_at >= created_at);
    }
}
