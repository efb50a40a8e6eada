//! Lifecycle use-cases.
//!
//! Every operation runs as one transaction through [`run_in_transaction`]:
//! validate, read-modify-write through the repository, commit, then notify
//! the optional publisher outside the transaction.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use futures::future::BoxFuture;
use tokio::time::{Duration, Instant};

use taskhub_auth::Principal;
use taskhub_events::{ChangeAction, ChangeEvent, EventPublisher};

use crate::db::TxSource;
use crate::error::LifecycleError;
use crate::repository::Record;

pub mod contact;
pub mod lifecycle;
pub mod role;
pub mod user;

pub use contact::{ContactService, ContactUseCase};
pub use lifecycle::Lifecycle;
pub use role::{RoleService, RoleUseCase};
pub use user::{UserService, UserUseCase};

/// Per-request execution scope: deadline and authenticated principal.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    principal: Option<Principal>,
}

impl RequestContext {
    /// No deadline, no principal.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Drive `fut` to completion or until the deadline passes; on expiry the
    /// future is dropped, which rolls back any transaction it owns.
    pub async fn bounded<F, O>(&self, fut: F) -> Result<O, LifecycleError>
    where
        F: Future<Output = Result<O, LifecycleError>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| LifecycleError::Cancelled)?,
            None => fut.await,
        }
    }
}

/// Run `work` inside one transaction.
///
/// Commits only if `work` succeeds. Errors, early returns and deadline expiry
/// drop the transaction uncommitted, which rolls it back. A commit failure is
/// reported as [`LifecycleError::Commit`].
pub async fn run_in_transaction<D, R, O, F>(
    db: &D,
    repo: &R,
    ctx: &RequestContext,
    work: F,
) -> Result<O, LifecycleError>
where
    D: TxSource,
    R: Sync,
    O: Send,
    F: for<'t> FnOnce(&'t R, &'t mut D::Tx) -> BoxFuture<'t, Result<O, LifecycleError>> + Send,
{
    ctx.bounded(async {
        let mut tx = db.begin().await?;
        let out = work(repo, &mut tx).await?;
        db.commit(tx).await.map_err(LifecycleError::Commit)?;
        Ok(out)
    })
    .await
}

/// What a failed post-commit notification means for the caller.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PublishPolicy {
    /// Log the failure and report success; the change is already committed.
    #[default]
    BestEffort,
    /// Report the failure as [`LifecycleError::Publish`] even though the
    /// change is committed.
    Required,
}

impl std::str::FromStr for PublishPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best_effort" | "best-effort" => Ok(PublishPolicy::BestEffort),
            "required" | "strict" => Ok(PublishPolicy::Required),
            other => Err(format!("unknown publish policy `{other}`")),
        }
    }
}

/// Post-commit notification step shared by every use-case.
#[derive(Clone, Default)]
pub struct Notifier {
    publisher: Option<Arc<dyn EventPublisher>>,
    policy: PublishPolicy,
}

impl core::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Notifier")
            .field("enabled", &self.publisher.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Notifier {
    pub fn new(publisher: Option<Arc<dyn EventPublisher>>, policy: PublishPolicy) -> Self {
        Self { publisher, policy }
    }

    /// No publisher: notifications are skipped.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub async fn notify<T: Record>(
        &self,
        ctx: &RequestContext,
        action: ChangeAction,
        record: &T,
    ) -> Result<(), LifecycleError> {
        let Some(publisher) = &self.publisher else {
            return Ok(());
        };

        let event = ChangeEvent::new(
            T::ENTITY,
            record.id(),
            action,
            Utc::now(),
            record.event_payload(),
        );
        let topic = event.topic();

        let outcome = ctx
            .bounded(async { publisher.send(event).await.map_err(LifecycleError::from) })
            .await;

        match (outcome, self.policy) {
            (Ok(()), _) => Ok(()),
            (Err(error), PublishPolicy::BestEffort) => {
                tracing::warn!(%topic, entity_id = %record.id(), %error, "change event not delivered");
                Ok(())
            }
            (Err(error), PublishPolicy::Required) => Err(error),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;
    use crate::records::Role;
    use crate::repository::{MemoryRepository, Repository};
    use taskhub_core::Timestamps;

    fn role(name: &str) -> Role {
        Role {
            id: taskhub_core::RecordId::new().into_string(),
            name: name.into(),
            timestamps: Timestamps::new(Utc::now()),
        }
    }

    #[tokio::test]
    async fn failed_work_rolls_back() {
        let db = MemoryDb::new();
        let repo = MemoryRepository::<Role>::new();
        let ctx = RequestContext::background();

        let result: Result<(), _> = run_in_transaction(&db, &repo, &ctx, |repo, tx| {
            Box::pin(async move {
                repo.create(tx, &mut role("Admin")).await?;
                Err(LifecycleError::InvalidInput("late failure".into()))
            })
        })
        .await;

        assert!(matches!(result, Err(LifecycleError::InvalidInput(_))));
        assert_eq!(db.row_count("roles").await, 0);
    }

    #[tokio::test]
    async fn expired_deadline_cancels_and_rolls_back() {
        let db = MemoryDb::new();
        let repo = MemoryRepository::<Role>::new();
        let ctx = RequestContext::background().with_timeout(Duration::from_millis(20));

        let result: Result<(), _> = run_in_transaction(&db, &repo, &ctx, |repo, tx| {
            Box::pin(async move {
                repo.create(tx, &mut role("Slow")).await?;
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            })
        })
        .await;

        assert!(matches!(result, Err(LifecycleError::Cancelled)));
        assert_eq!(db.row_count("roles").await, 0);
    }

    #[tokio::test]
    async fn best_effort_swallows_publisher_failures() {
        let publisher = Arc::new(test_support::RecordingPublisher::failing());
        let notifier = Notifier::new(Some(publisher), PublishPolicy::BestEffort);
        let ctx = RequestContext::background();

        let result = notifier.notify(&ctx, ChangeAction::Created, &role("Admin")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn required_policy_surfaces_publisher_failures() {
        let publisher = Arc::new(test_support::RecordingPublisher::failing());
        let notifier = Notifier::new(Some(publisher), PublishPolicy::Required);
        let ctx = RequestContext::background();

        let err = notifier
            .notify(&ctx, ChangeAction::Created, &role("Admin"))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Publish(_)));
    }

    #[test]
    fn parses_publish_policies() {
        assert_eq!("best_effort".parse(), Ok(PublishPolicy::BestEffort));
        assert_eq!("REQUIRED".parse(), Ok(PublishPolicy::Required));
        assert!("sometimes".parse::<PublishPolicy>().is_err());
    }
}
