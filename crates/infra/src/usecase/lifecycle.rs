//! Generic lifecycle orchestration shared by every entity.
//!
//! ```text
//!            create            soft_delete
//!   (none) ─────────► Active ─────────────► SoftDeleted
//!                       ▲                        │
//!                       └──────── restore ───────┘
//!   force_delete: Active | SoftDeleted ─► purged (row removed)
//! ```
//!
//! Owner-scoped entities (`Record::OWNER`) treat a row owned by someone else
//! exactly like a missing row.

use std::marker::PhantomData;

use taskhub_core::{Page, PageRequest};
use taskhub_events::ChangeAction;
use tracing::instrument;

use super::{Notifier, RequestContext, run_in_transaction};
use crate::error::LifecycleError;
use crate::repository::{Filter, Record, Repository};

pub struct Lifecycle<T, R: Repository<T>>
where
    T: Record,
{
    db: R::Db,
    repo: R,
    notifier: Notifier,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record, R: Repository<T>> core::fmt::Debug for Lifecycle<T, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("entity", &T::ENTITY)
            .field("notifier", &self.notifier)
            .finish()
    }
}

fn ensure_owner<T: Record>(record: &T, owner: Option<&str>) -> Result<(), LifecycleError> {
    let (Some(column), Some(owner)) = (T::OWNER, owner) else {
        return Ok(());
    };
    let owned = record
        .value(column)
        .is_some_and(|v| v.as_text() == Some(owner));
    if owned {
        Ok(())
    } else {
        Err(LifecycleError::not_found(T::ENTITY))
    }
}

fn scoped_filter<T: Record>(filter: Filter, owner: Option<&str>) -> Filter {
    match (T::OWNER, owner) {
        (Some(column), Some(owner)) => filter.equals(column, owner),
        _ => filter,
    }
}

impl<T: Record, R: Repository<T>> Lifecycle<T, R> {
    pub fn new(db: R::Db, repo: R, notifier: Notifier) -> Self {
        Self {
            db,
            repo,
            notifier,
            _record: PhantomData,
        }
    }

    pub fn db(&self) -> &R::Db {
        &self.db
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    #[instrument(skip(self, ctx), fields(entity = T::ENTITY), err)]
    pub async fn get(&self, ctx: &RequestContext, id: &str, owner: Option<&str>) -> Result<T, LifecycleError> {
        let id = id.to_string();
        let owner = owner.map(str::to_string);
        run_in_transaction(&self.db, &self.repo, ctx, move |repo, tx| {
            Box::pin(async move {
                let record = repo.find_by_id(tx, &id).await?;
                ensure_owner(&record, owner.as_deref())?;
                Ok(record)
            })
        })
        .await
    }

    #[instrument(skip_all, fields(entity = T::ENTITY, id = %record.id()), err)]
    pub async fn create(&self, ctx: &RequestContext, record: T) -> Result<T, LifecycleError> {
        let created = run_in_transaction(&self.db, &self.repo, ctx, move |repo, tx| {
            Box::pin(async move {
                let mut record = record;
                repo.create(tx, &mut record).await?;
                Ok(record)
            })
        })
        .await?;

        tracing::debug!(entity = T::ENTITY, id = %created.id(), "created");
        self.notifier.notify(ctx, ChangeAction::Created, &created).await?;
        Ok(created)
    }

    /// Load the visible row, apply `mutate`, write it back. No upsert.
    #[instrument(skip(self, ctx, mutate), fields(entity = T::ENTITY), err)]
    pub async fn update<F>(
        &self,
        ctx: &RequestContext,
        id: &str,
        owner: Option<&str>,
        mutate: F,
    ) -> Result<T, LifecycleError>
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        let id = id.to_string();
        let owner = owner.map(str::to_string);
        let updated = run_in_transaction(&self.db, &self.repo, ctx, move |repo, tx| {
            Box::pin(async move {
                let mut record = repo.find_by_id(tx, &id).await?;
                ensure_owner(&record, owner.as_deref())?;
                mutate(&mut record);
                repo.update(tx, &mut record).await?;
                Ok(record)
            })
        })
        .await?;

        self.notifier.notify(ctx, ChangeAction::Updated, &updated).await?;
        Ok(updated)
    }

    /// Active → SoftDeleted. A row that is already trashed is `NotFound`.
    #[instrument(skip(self, ctx), fields(entity = T::ENTITY), err)]
    pub async fn soft_delete(
        &self,
        ctx: &RequestContext,
        id: &str,
        owner: Option<&str>,
    ) -> Result<T, LifecycleError> {
        let id = id.to_string();
        let owner = owner.map(str::to_string);
        let deleted = run_in_transaction(&self.db, &self.repo, ctx, move |repo, tx| {
            Box::pin(async move {
                let mut record = repo.find_by_id(tx, &id).await?;
                ensure_owner(&record, owner.as_deref())?;
                repo.soft_delete(tx, &mut record).await?;
                Ok(record)
            })
        })
        .await?;

        self.notifier.notify(ctx, ChangeAction::Deleted, &deleted).await?;
        Ok(deleted)
    }

    /// SoftDeleted → Active. Restoring an active row succeeds unchanged.
    #[instrument(skip(self, ctx), fields(entity = T::ENTITY), err)]
    pub async fn restore(
        &self,
        ctx: &RequestContext,
        id: &str,
        owner: Option<&str>,
    ) -> Result<T, LifecycleError> {
        let id = id.to_string();
        let owner = owner.map(str::to_string);
        let restored = run_in_transaction(&self.db, &self.repo, ctx, move |repo, tx| {
            Box::pin(async move {
                if T::OWNER.is_some() && owner.is_some() {
                    let current = repo.find_with_trashed(tx, &id).await?;
                    ensure_owner(&current, owner.as_deref())?;
                }
                repo.restore(tx, &id).await?;
                Ok(repo.find_by_id(tx, &id).await?)
            })
        })
        .await?;

        self.notifier.notify(ctx, ChangeAction::Restored, &restored).await?;
        Ok(restored)
    }

    /// Physically remove the row from either state. Irreversible.
    #[instrument(skip(self, ctx), fields(entity = T::ENTITY), err)]
    pub async fn force_delete(
        &self,
        ctx: &RequestContext,
        id: &str,
        owner: Option<&str>,
    ) -> Result<T, LifecycleError> {
        let id = id.to_string();
        let owner = owner.map(str::to_string);
        let purged = run_in_transaction(&self.db, &self.repo, ctx, move |repo, tx| {
            Box::pin(async move {
                let record = repo.find_with_trashed(tx, &id).await?;
                ensure_owner(&record, owner.as_deref())?;
                repo.force_delete(tx, &id).await?;
                Ok(record)
            })
        })
        .await?;

        self.notifier.notify(ctx, ChangeAction::Purged, &purged).await?;
        Ok(purged)
    }

    pub async fn search(
        &self,
        ctx: &RequestContext,
        filter: Filter,
        page: PageRequest,
        owner: Option<&str>,
    ) -> Result<Page<T>, LifecycleError> {
        let filter = scoped_filter::<T>(filter, owner);
        run_in_transaction(&self.db, &self.repo, ctx, move |repo, tx| {
            Box::pin(async move {
                let (items, total) = repo.search(tx, &filter, page).await?;
                Ok(Page::new(items, total, page))
            })
        })
        .await
    }

    /// Read-only view of soft-deleted rows.
    pub async fn recycle_bin(
        &self,
        ctx: &RequestContext,
        filter: Filter,
        page: PageRequest,
        owner: Option<&str>,
    ) -> Result<Page<T>, LifecycleError> {
        let filter = scoped_filter::<T>(filter, owner);
        run_in_transaction(&self.db, &self.repo, ctx, move |repo, tx| {
            Box::pin(async move {
                let (items, total) = repo.search_trashed(tx, &filter, page).await?;
                Ok(Page::new(items, total, page))
            })
        })
        .await
    }
}
