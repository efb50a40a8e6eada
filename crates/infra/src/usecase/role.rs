//! Role management.

use async_trait::async_trait;
use chrono::Utc;
use mockall::automock;
use serde::Deserialize;

use taskhub_core::{DomainResult, Page, PageRequest, RecordId, Timestamps, validate};

use super::{Lifecycle, Notifier, RequestContext};
use crate::error::LifecycleError;
use crate::records::Role;
use crate::repository::{Filter, Repository};

const NAME_MAX: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateRole {
    /// Caller-chosen identifier; generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

impl CreateRole {
    fn validate(&self) -> DomainResult<()> {
        if let Some(id) = &self.id {
            RecordId::parse("id", id)?;
        }
        validate::required("name", &self.name)?;
        validate::max_len("name", &self.name, NAME_MAX)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateRole {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl UpdateRole {
    fn validate(&self) -> DomainResult<()> {
        RecordId::parse("id", &self.id)?;
        validate::required("name", &self.name)?;
        validate::max_len("name", &self.name, NAME_MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchRoles {
    pub name: Option<String>,
    pub page: i64,
    pub size: i64,
}

impl Default for SearchRoles {
    fn default() -> Self {
        Self {
            name: None,
            page: 1,
            size: i64::from(PageRequest::DEFAULT_SIZE),
        }
    }
}

impl SearchRoles {
    fn into_query(self) -> Result<(Filter, PageRequest), LifecycleError> {
        if let Some(name) = &self.name {
            validate::max_len("name", name, NAME_MAX)?;
        }
        let filter = Filter::new().contains(&["name"], self.name.as_deref());
        Ok((filter, PageRequest::new(self.page, self.size)))
    }
}

#[automock]
#[async_trait]
pub trait RoleService: Send + Sync {
    async fn create(&self, ctx: &RequestContext, request: CreateRole) -> Result<Role, LifecycleError>;

    async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Role, LifecycleError>;

    async fn update(&self, ctx: &RequestContext, request: UpdateRole) -> Result<Role, LifecycleError>;

    async fn soft_delete(&self, ctx: &RequestContext, id: &str) -> Result<Role, LifecycleError>;

    async fn restore(&self, ctx: &RequestContext, id: &str) -> Result<Role, LifecycleError>;

    async fn force_delete(&self, ctx: &RequestContext, id: &str) -> Result<(), LifecycleError>;

    async fn search(&self, ctx: &RequestContext, request: SearchRoles) -> Result<Page<Role>, LifecycleError>;

    async fn recycle_bin(
        &self,
        ctx: &RequestContext,
        request: SearchRoles,
    ) -> Result<Page<Role>, LifecycleError>;
}

pub struct RoleUseCase<R: Repository<Role>> {
    lifecycle: Lifecycle<Role, R>,
}

impl<R: Repository<Role>> RoleUseCase<R> {
    pub fn new(db: R::Db, repo: R, notifier: Notifier) -> Self {
        Self {
            lifecycle: Lifecycle::new(db, repo, notifier),
        }
    }
}

#[async_trait]
impl<R: Repository<Role>> RoleService for RoleUseCase<R> {
    async fn create(&self, ctx: &RequestContext, request: CreateRole) -> Result<Role, LifecycleError> {
        request.validate()?;
        let role = Role {
            id: request.id.unwrap_or_else(|| RecordId::new().into_string()),
            name: request.name,
            timestamps: Timestamps::new(Utc::now()),
        };
        self.lifecycle.create(ctx, role).await
    }

    async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Role, LifecycleError> {
        RecordId::parse("id", id)?;
        self.lifecycle.get(ctx, id, None).await
    }

    async fn update(&self, ctx: &RequestContext, request: UpdateRole) -> Result<Role, LifecycleError> {
        request.validate()?;
        let UpdateRole { id, name } = request;
        self.lifecycle.update(ctx, &id, None, move |role| role.name = name).await
    }

    async fn soft_delete(&self, ctx: &RequestContext, id: &str) -> Result<Role, LifecycleError> {
        RecordId::parse("id", id)?;
        self.lifecycle.soft_delete(ctx, id, None).await
    }

    async fn restore(&self, ctx: &RequestContext, id: &str) -> Result<Role, LifecycleError> {
        RecordId::parse("id", id)?;
        self.lifecycle.restore(ctx, id, None).await
    }

    async fn force_delete(&self, ctx: &RequestContext, id: &str) -> Result<(), LifecycleError> {
        RecordId::parse("id", id)?;
        self.lifecycle.force_delete(ctx, id, None).await.map(|_| ())
    }

    async fn search(&self, ctx: &RequestContext, request: SearchRoles) -> Result<Page<Role>, LifecycleError> {
        let (filter, page) = request.into_query()?;
        self.lifecycle.search(ctx, filter, page, None).await
    }

    async fn recycle_bin(
        &self,
        ctx: &RequestContext,
        request: SearchRoles,
    ) -> Result<Page<Role>, LifecycleError> {
        let (filter, page) = request.into_query()?;
        self.lifecycle.recycle_bin(ctx, filter, page, None).await
    }
}

#[cfg(test)]
mod tests {
    use taskhub_core::ErrorKind;

    use super::*;
    use crate::db::MemoryDb;
    use crate::repository::MemoryRepository;

    fn service() -> RoleUseCase<MemoryRepository<Role>> {
        RoleUseCase::new(MemoryDb::new(), MemoryRepository::new(), Notifier::disabled())
    }

    fn create(name: &str) -> CreateRole {
        CreateRole {
            id: None,
            name: name.into(),
        }
    }

    #[tokio::test]
    async fn create_generates_a_uuid_and_stamps_timestamps() {
        let roles = service();
        let ctx = RequestContext::background();

        let admin = roles.create(&ctx, create("Admin")).await.unwrap();
        assert!(RecordId::parse("id", &admin.id).is_ok());
        assert_eq!(admin.timestamps.created_at, admin.timestamps.updated_at);
        assert_eq!(admin.timestamps.deleted_at, None);
    }

    #[tokio::test]
    async fn create_keeps_a_caller_supplied_id() {
        let roles = service();
        let ctx = RequestContext::background();
        let id = RecordId::new().into_string();

        let admin = roles
            .create(
                &ctx,
                CreateRole {
                    id: Some(id.clone()),
                    name: "Admin".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(admin.id, id);
    }

    #[tokio::test]
    async fn invalid_input_writes_nothing() {
        let roles = service();
        let ctx = RequestContext::background();

        for request in [
            create(""),
            create(&"x".repeat(101)),
            CreateRole {
                id: Some("not-a-uuid".into()),
                name: "Admin".into(),
            },
        ] {
            let err = roles.create(&ctx, request).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }

        let page = roles.search(&ctx, SearchRoles::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn lookups_reject_malformed_ids() {
        let roles = service();
        let ctx = RequestContext::background();

        let err = roles.get(&ctx, "42").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = roles.force_delete(&ctx, "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let roles = service();
        let ctx = RequestContext::background();

        let err = roles
            .update(
                &ctx,
                UpdateRole {
                    id: RecordId::new().into_string(),
                    name: "Ghost".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn admin_role_scenario() {
        let roles = service();
        let ctx = RequestContext::background();

        let admin = roles.create(&ctx, create("Admin")).await.unwrap();
        roles.soft_delete(&ctx, &admin.id).await.unwrap();

        let active = roles
            .search(
                &ctx,
                SearchRoles {
                    name: Some("adm".into()),
                    ..SearchRoles::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(active.total, 0);

        let bin = roles.recycle_bin(&ctx, SearchRoles::default()).await.unwrap();
        assert_eq!(bin.total, 1);

        let restored = roles.restore(&ctx, &admin.id).await.unwrap();
        assert_eq!(restored.timestamps.deleted_at, None);
        assert_eq!(roles.get(&ctx, &admin.id).await.unwrap().name, "Admin");
    }

    #[tokio::test]
    async fn oversized_search_name_is_rejected() {
        let roles = service();
        let ctx = RequestContext::background();

        let err = roles
            .search(
                &ctx,
                SearchRoles {
                    name: Some("n".repeat(101)),
                    ..SearchRoles::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
