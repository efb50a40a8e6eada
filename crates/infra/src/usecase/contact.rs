//! Address-book contacts, scoped to the authenticated owner.

use async_trait::async_trait;
use chrono::Utc;
use mockall::automock;
use serde::Deserialize;

use taskhub_core::{DomainResult, Page, PageRequest, RecordId, Timestamps, validate};

use super::{Lifecycle, Notifier, RequestContext};
use crate::error::LifecycleError;
use crate::records::Contact;
use crate::repository::{Filter, Repository};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl ContactFields {
    fn validate(&self) -> DomainResult<()> {
        validate::required("first_name", &self.first_name)?;
        validate::max_len("first_name", &self.first_name, 100)?;
        validate::max_len("last_name", &self.last_name, 100)?;
        validate::max_len("email", &self.email, 200)?;
        if !self.email.is_empty() {
            validate::email("email", &self.email)?;
        }
        validate::max_len("phone", &self.phone, 20)
    }
}

pub type CreateContact = ContactFields;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateContact {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub fields: ContactFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchContacts {
    /// Matches first or last name.
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub page: i64,
    pub size: i64,
}

impl Default for SearchContacts {
    fn default() -> Self {
        Self {
            name: None,
            email: None,
            phone: None,
            page: 1,
            size: i64::from(PageRequest::DEFAULT_SIZE),
        }
    }
}

impl SearchContacts {
    fn into_query(self) -> Result<(Filter, PageRequest), LifecycleError> {
        for (field, value, max) in [
            ("name", &self.name, 100),
            ("email", &self.email, 200),
            ("phone", &self.phone, 20),
        ] {
            if let Some(value) = value {
                validate::max_len(field, value, max)?;
            }
        }
        let filter = Filter::new()
            .contains(&["first_name", "last_name"], self.name.as_deref())
            .contains(&["email"], self.email.as_deref())
            .contains(&["phone"], self.phone.as_deref());
        Ok((filter, PageRequest::new(self.page, self.size)))
    }
}

/// Every operation acts on behalf of `user_id`; other owners' contacts are
/// reported as missing.
#[automock]
#[async_trait]
pub trait ContactService: Send + Sync {
    async fn create(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        request: CreateContact,
    ) -> Result<Contact, LifecycleError>;

    async fn get(&self, ctx: &RequestContext, user_id: &str, id: &str) -> Result<Contact, LifecycleError>;

    async fn update(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        request: UpdateContact,
    ) -> Result<Contact, LifecycleError>;

    async fn soft_delete(&self, ctx: &RequestContext, user_id: &str, id: &str) -> Result<Contact, LifecycleError>;

    async fn restore(&self, ctx: &RequestContext, user_id: &str, id: &str) -> Result<Contact, LifecycleError>;

    async fn force_delete(&self, ctx: &RequestContext, user_id: &str, id: &str) -> Result<(), LifecycleError>;

    async fn search(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        request: SearchContacts,
    ) -> Result<Page<Contact>, LifecycleError>;

    async fn recycle_bin(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        request: SearchContacts,
    ) -> Result<Page<Contact>, LifecycleError>;
}

pub struct ContactUseCase<R: Repository<Contact>> {
    lifecycle: Lifecycle<Contact, R>,
}

impl<R: Repository<Contact>> ContactUseCase<R> {
    pub fn new(db: R::Db, repo: R, notifier: Notifier) -> Self {
        Self {
            lifecycle: Lifecycle::new(db, repo, notifier),
        }
    }
}

#[async_trait]
impl<R: Repository<Contact>> ContactService for ContactUseCase<R> {
    async fn create(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        request: CreateContact,
    ) -> Result<Contact, LifecycleError> {
        request.validate()?;
        let contact = Contact {
            id: RecordId::new().into_string(),
            user_id: user_id.to_string(),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
            timestamps: Timestamps::new(Utc::now()),
        };
        self.lifecycle.create(ctx, contact).await
    }

    async fn get(&self, ctx: &RequestContext, user_id: &str, id: &str) -> Result<Contact, LifecycleError> {
        RecordId::parse("id", id)?;
        self.lifecycle.get(ctx, id, Some(user_id)).await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        request: UpdateContact,
    ) -> Result<Contact, LifecycleError> {
        RecordId::parse("id", &request.id)?;
        request.fields.validate()?;
        let UpdateContact { id, fields } = request;
        self.lifecycle
            .update(ctx, &id, Some(user_id), move |contact| {
                contact.first_name = fields.first_name;
                contact.last_name = fields.last_name;
                contact.email = fields.email;
                contact.phone = fields.phone;
            })
            .await
    }

    async fn soft_delete(&self, ctx: &RequestContext, user_id: &str, id: &str) -> Result<Contact, LifecycleError> {
        RecordId::parse("id", id)?;
        self.lifecycle.soft_delete(ctx, id, Some(user_id)).await
    }

    async fn restore(&self, ctx: &RequestContext, user_id: &str, id: &str) -> Result<Contact, LifecycleError> {
        RecordId::parse("id", id)?;
        self.lifecycle.restore(ctx, id, Some(user_id)).await
    }

    async fn force_delete(&self, ctx: &RequestContext, user_id: &str, id: &str) -> Result<(), LifecycleError> {
        RecordId::parse("id", id)?;
        self.lifecycle
            .force_delete(ctx, id, Some(user_id))
            .await
            .map(|_| ())
    }

    async fn search(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        request: SearchContacts,
    ) -> Result<Page<Contact>, LifecycleError> {
        let (filter, page) = request.into_query()?;
        self.lifecycle.search(ctx, filter, page, Some(user_id)).await
    }

    async fn recycle_bin(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        request: SearchContacts,
    ) -> Result<Page<Contact>, LifecycleError> {
        let (filter, page) = request.into_query()?;
        self.lifecycle.recycle_bin(ctx, filter, page, Some(user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use taskhub_core::ErrorKind;

    use super::*;
    use crate::db::MemoryDb;
    use crate::repository::MemoryRepository;

    const ALICE: &str = "0191e0b4-7b8e-7cc1-a5d4-2f6c0e1b9a10";
    const MALLORY: &str = "0191e0b4-7b8e-7cc1-a5d4-2f6c0e1b9a11";

    fn service() -> ContactUseCase<MemoryRepository<Contact>> {
        ContactUseCase::new(MemoryDb::new(), MemoryRepository::new(), Notifier::disabled())
    }

    fn fields(first: &str, last: &str) -> ContactFields {
        ContactFields {
            first_name: first.into(),
            last_name: last.into(),
            email: format!("{}@example.com", first.to_lowercase()),
            phone: "+62 812 0000".into(),
        }
    }

    #[tokio::test]
    async fn create_binds_the_owner() {
        let contacts = service();
        let ctx = RequestContext::background();

        let bob = contacts.create(&ctx, ALICE, fields("Bob", "Stone")).await.unwrap();
        assert_eq!(bob.user_id, ALICE);
        assert_eq!(contacts.get(&ctx, ALICE, &bob.id).await.unwrap(), bob);
    }

    #[tokio::test]
    async fn other_owners_see_nothing() {
        let contacts = service();
        let ctx = RequestContext::background();
        let bob = contacts.create(&ctx, ALICE, fields("Bob", "Stone")).await.unwrap();

        let err = contacts.get(&ctx, MALLORY, &bob.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = contacts
            .update(
                &ctx,
                MALLORY,
                UpdateContact {
                    id: bob.id.clone(),
                    fields: fields("Eve", "Stone"),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let page = contacts
            .search(&ctx, MALLORY, SearchContacts::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(contacts.get(&ctx, ALICE, &bob.id).await.unwrap().first_name, "Bob");
    }

    #[tokio::test]
    async fn name_filter_matches_first_or_last_name() {
        let contacts = service();
        let ctx = RequestContext::background();
        contacts.create(&ctx, ALICE, fields("Bob", "Stone")).await.unwrap();
        contacts.create(&ctx, ALICE, fields("Stella", "Ray")).await.unwrap();
        contacts.create(&ctx, ALICE, fields("Carl", "Moss")).await.unwrap();

        let page = contacts
            .search(
                &ctx,
                ALICE,
                SearchContacts {
                    name: Some("st".into()),
                    ..SearchContacts::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn optional_email_is_only_checked_when_present() {
        let contacts = service();
        let ctx = RequestContext::background();

        let mut request = fields("Bob", "");
        request.email.clear();
        assert!(contacts.create(&ctx, ALICE, request).await.is_ok());

        let mut request = fields("Bob", "");
        request.email = "bob-at-example".into();
        let err = contacts.create(&ctx, ALICE, request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let mut request = fields("Bob", "");
        request.phone = "0".repeat(21);
        let err = contacts.create(&ctx, ALICE, request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn trash_round_trip_is_owner_scoped() {
        let contacts = service();
        let ctx = RequestContext::background();
        let bob = contacts.create(&ctx, ALICE, fields("Bob", "Stone")).await.unwrap();

        contacts.soft_delete(&ctx, ALICE, &bob.id).await.unwrap();
        let bin = contacts
            .recycle_bin(&ctx, ALICE, SearchContacts::default())
            .await
            .unwrap();
        assert_eq!(bin.total, 1);

        let err = contacts.restore(&ctx, MALLORY, &bob.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = contacts.force_delete(&ctx, MALLORY, &bob.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        contacts.restore(&ctx, ALICE, &bob.id).await.unwrap();
        contacts.force_delete(&ctx, ALICE, &bob.id).await.unwrap();
        let err = contacts.get(&ctx, ALICE, &bob.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
