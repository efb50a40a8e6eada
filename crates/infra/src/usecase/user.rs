//! User accounts and sessions.
//!
//! A user holds at most one active token: login and refresh overwrite
//! `session_id` with the new token's `jti`, logout clears it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mockall::automock;
use serde::Deserialize;

use taskhub_auth::{
    AuthConfig, Hs256JwtValidator, IssuedToken, Principal, TokenIssuer, hash_password, verify_password,
};
use taskhub_core::{DomainResult, Page, PageRequest, RecordId, Timestamps, validate};
use taskhub_events::ChangeAction;

use super::{Lifecycle, Notifier, RequestContext, run_in_transaction};
use crate::error::LifecycleError;
use crate::records::User;
use crate::repository::{Filter, Repository};
use crate::verifier::CredentialVerifier;

const FIELD_MAX: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterUser {
    fn validate(&self) -> DomainResult<()> {
        validate::required("email", &self.email)?;
        validate::max_len("email", &self.email, FIELD_MAX)?;
        validate::email("email", &self.email)?;
        validate::required("password", &self.password)?;
        validate::max_len("password", &self.password, FIELD_MAX)?;
        validate::required("name", &self.name)?;
        validate::max_len("name", &self.name, FIELD_MAX)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

impl LoginUser {
    fn validate(&self) -> DomainResult<()> {
        validate::required("email", &self.email)?;
        validate::max_len("email", &self.email, FIELD_MAX)?;
        validate::required("password", &self.password)?;
        validate::max_len("password", &self.password, FIELD_MAX)
    }
}

/// Profile changes; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl UpdateUser {
    fn validate(&self) -> DomainResult<()> {
        if let Some(email) = &self.email {
            validate::max_len("email", email, FIELD_MAX)?;
            validate::email("email", email)?;
        }
        if let Some(password) = &self.password {
            validate::required("password", password)?;
            validate::max_len("password", password, FIELD_MAX)?;
        }
        if let Some(name) = &self.name {
            validate::required("name", name)?;
            validate::max_len("name", name, FIELD_MAX)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchUsers {
    pub name: Option<String>,
    pub email: Option<String>,
    pub page: i64,
    pub size: i64,
}

impl Default for SearchUsers {
    fn default() -> Self {
        Self {
            name: None,
            email: None,
            page: 1,
            size: i64::from(PageRequest::DEFAULT_SIZE),
        }
    }
}

impl SearchUsers {
    fn into_query(self) -> Result<(Filter, PageRequest), LifecycleError> {
        if let Some(name) = &self.name {
            validate::max_len("name", name, FIELD_MAX)?;
        }
        if let Some(email) = &self.email {
            validate::max_len("email", email, FIELD_MAX)?;
        }
        let filter = Filter::new()
            .contains(&["name"], self.name.as_deref())
            .contains(&["email"], self.email.as_deref());
        Ok((filter, PageRequest::new(self.page, self.size)))
    }
}

/// A signed-in user and the token minted for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: User,
    pub token: IssuedToken,
}

#[automock]
#[async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, ctx: &RequestContext, request: RegisterUser) -> Result<User, LifecycleError>;

    async fn login(&self, ctx: &RequestContext, request: LoginUser) -> Result<LoginOutcome, LifecycleError>;

    async fn logout(&self, ctx: &RequestContext, user_id: &str) -> Result<(), LifecycleError>;

    async fn refresh(&self, ctx: &RequestContext, user_id: &str) -> Result<LoginOutcome, LifecycleError>;

    async fn current(&self, ctx: &RequestContext, user_id: &str) -> Result<User, LifecycleError>;

    async fn update(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        request: UpdateUser,
    ) -> Result<User, LifecycleError>;

    /// Resolve an `Authorization` header value to the live principal.
    async fn verify(&self, ctx: &RequestContext, authorization: Option<String>) -> Result<Principal, LifecycleError>;

    async fn search(&self, ctx: &RequestContext, request: SearchUsers) -> Result<Page<User>, LifecycleError>;

    async fn recycle_bin(
        &self,
        ctx: &RequestContext,
        request: SearchUsers,
    ) -> Result<Page<User>, LifecycleError>;

    async fn soft_delete(&self, ctx: &RequestContext, id: &str) -> Result<User, LifecycleError>;

    async fn restore(&self, ctx: &RequestContext, id: &str) -> Result<User, LifecycleError>;

    async fn force_delete(&self, ctx: &RequestContext, id: &str) -> Result<(), LifecycleError>;
}

pub struct UserUseCase<R: Repository<User>> {
    lifecycle: Lifecycle<User, R>,
    issuer: TokenIssuer,
    verifier: CredentialVerifier<R>,
    password_cost: u32,
}

impl<R: Repository<User> + Clone> UserUseCase<R> {
    pub fn new(db: R::Db, repo: R, notifier: Notifier, auth: &AuthConfig) -> Self {
        let validator = Arc::new(Hs256JwtValidator::new(auth));
        Self {
            verifier: CredentialVerifier::new(validator, db.clone(), repo.clone()),
            lifecycle: Lifecycle::new(db, repo, notifier),
            issuer: TokenIssuer::new(auth),
            password_cost: auth.password_cost(),
        }
    }
}

impl<R: Repository<User>> UserUseCase<R> {
    async fn hash(&self, password: String) -> Result<String, LifecycleError> {
        let cost = self.password_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| LifecycleError::internal(e.to_string()))?
            .map_err(LifecycleError::from)
    }

    /// Mint a token for `user_id` and make it the only active session.
    async fn start_session(
        &self,
        ctx: &RequestContext,
        user_id: String,
        action: ChangeAction,
    ) -> Result<LoginOutcome, LifecycleError> {
        let issuer = self.issuer.clone();
        let outcome = run_in_transaction(self.lifecycle.db(), self.lifecycle.repo(), ctx, move |repo, tx| {
            Box::pin(async move {
                let mut user = repo.find_by_id(tx, &user_id).await?;
                let token = issuer.issue(&user.token_subject(), Utc::now())?;
                user.session_id = Some(token.token_id.clone());
                repo.update(tx, &mut user).await?;
                Ok(LoginOutcome { user, token })
            })
        })
        .await?;

        self.lifecycle.notifier().notify(ctx, action, &outcome.user).await?;
        Ok(outcome)
    }
}

#[async_trait]
impl<R: Repository<User>> UserService for UserUseCase<R> {
    async fn register(&self, ctx: &RequestContext, request: RegisterUser) -> Result<User, LifecycleError> {
        request.validate()?;
        let password_hash = self.hash(request.password).await?;

        let candidate = User {
            id: RecordId::new().into_string(),
            email: request.email,
            password_hash,
            name: request.name,
            role_id: None,
            department_id: None,
            is_active: false,
            session_id: None,
            timestamps: Timestamps::new(Utc::now()),
        };

        let user = run_in_transaction(self.lifecycle.db(), self.lifecycle.repo(), ctx, move |repo, tx| {
            Box::pin(async move {
                let mut user = candidate;
                if repo.find_one_by(tx, "email", &user.email).await?.is_some() {
                    return Err(LifecycleError::Conflict("email already registered".into()));
                }
                repo.create(tx, &mut user).await?;
                Ok(user)
            })
        })
        .await?;

        tracing::debug!(user_id = %user.id, "user registered");
        self.lifecycle.notifier().notify(ctx, ChangeAction::Created, &user).await?;
        Ok(user)
    }

    async fn login(&self, ctx: &RequestContext, request: LoginUser) -> Result<LoginOutcome, LifecycleError> {
        request.validate()?;
        let LoginUser { email, password } = request;

        let user = run_in_transaction(self.lifecycle.db(), self.lifecycle.repo(), ctx, move |repo, tx| {
            Box::pin(async move { Ok(repo.find_one_by(tx, "email", &email).await?) })
        })
        .await?
        .ok_or_else(|| LifecycleError::unauthenticated("invalid credentials"))?;

        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| LifecycleError::internal(e.to_string()))?;
        if !matches {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(LifecycleError::unauthenticated("invalid credentials"));
        }

        self.start_session(ctx, user.id, ChangeAction::LoggedIn).await
    }

    async fn logout(&self, ctx: &RequestContext, user_id: &str) -> Result<(), LifecycleError> {
        let user_id = user_id.to_string();
        let user = run_in_transaction(self.lifecycle.db(), self.lifecycle.repo(), ctx, move |repo, tx| {
            Box::pin(async move {
                let mut user = repo.find_by_id(tx, &user_id).await?;
                user.session_id = None;
                repo.update(tx, &mut user).await?;
                Ok(user)
            })
        })
        .await?;

        self.lifecycle
            .notifier()
            .notify(ctx, ChangeAction::LoggedOut, &user)
            .await
    }

    async fn refresh(&self, ctx: &RequestContext, user_id: &str) -> Result<LoginOutcome, LifecycleError> {
        self.start_session(ctx, user_id.to_string(), ChangeAction::TokenRefreshed)
            .await
    }

    async fn current(&self, ctx: &RequestContext, user_id: &str) -> Result<User, LifecycleError> {
        self.lifecycle.get(ctx, user_id, None).await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        request: UpdateUser,
    ) -> Result<User, LifecycleError> {
        request.validate()?;
        let UpdateUser { email, password, name } = request;
        let password_hash = match password {
            Some(password) => Some(self.hash(password).await?),
            None => None,
        };

        let user_id = user_id.to_string();
        let user = run_in_transaction(self.lifecycle.db(), self.lifecycle.repo(), ctx, move |repo, tx| {
            Box::pin(async move {
                let mut user = repo.find_by_id(tx, &user_id).await?;
                if let Some(email) = email.filter(|e| *e != user.email) {
                    if let Some(owner) = repo.find_one_by(tx, "email", &email).await? {
                        if owner.id != user.id {
                            return Err(LifecycleError::Conflict("email already registered".into()));
                        }
                    }
                    user.email = email;
                }
                if let Some(hash) = password_hash {
                    user.password_hash = hash;
                }
                if let Some(name) = name {
                    user.name = name;
                }
                repo.update(tx, &mut user).await?;
                Ok(user)
            })
        })
        .await?;

        self.lifecycle.notifier().notify(ctx, ChangeAction::Updated, &user).await?;
        Ok(user)
    }

    async fn verify(&self, ctx: &RequestContext, authorization: Option<String>) -> Result<Principal, LifecycleError> {
        self.verifier.verify(ctx, authorization.as_deref()).await
    }

    async fn search(&self, ctx: &RequestContext, request: SearchUsers) -> Result<Page<User>, LifecycleError> {
        let (filter, page) = request.into_query()?;
        self.lifecycle.search(ctx, filter, page, None).await
    }

    async fn recycle_bin(
        &self,
        ctx: &RequestContext,
        request: SearchUsers,
    ) -> Result<Page<User>, LifecycleError> {
        let (filter, page) = request.into_query()?;
        self.lifecycle.recycle_bin(ctx, filter, page, None).await
    }

    /// Trashing a user also ends their session, so a later restore does not
    /// bring the old token back to life.
    async fn soft_delete(&self, ctx: &RequestContext, id: &str) -> Result<User, LifecycleError> {
        let id = RecordId::parse("id", id)?.into_string();
        let user = run_in_transaction(self.lifecycle.db(), self.lifecycle.repo(), ctx, move |repo, tx| {
            Box::pin(async move {
                let mut user = repo.find_by_id(tx, &id).await?;
                if user.session_id.take().is_some() {
                    repo.update(tx, &mut user).await?;
                }
                repo.soft_delete(tx, &mut user).await?;
                Ok(user)
            })
        })
        .await?;

        tracing::debug!(user_id = %user.id, "user trashed");
        self.lifecycle.notifier().notify(ctx, ChangeAction::Deleted, &user).await?;
        Ok(user)
    }

    async fn restore(&self, ctx: &RequestContext, id: &str) -> Result<User, LifecycleError> {
        RecordId::parse("id", id)?;
        self.lifecycle.restore(ctx, id, None).await
    }

    async fn force_delete(&self, ctx: &RequestContext, id: &str) -> Result<(), LifecycleError> {
        RecordId::parse("id", id)?;
        self.lifecycle.force_delete(ctx, id, None).await.map(|_| ())
    }
}
