//! Bearer-token verification against the live user record.
//!
//! Order of checks: header shape, signature and claims, user still visible,
//! token still the user's active session. Every failure is `Unauthenticated`.

use std::sync::Arc;

use chrono::Utc;

use taskhub_auth::{JwtValidator, Principal, parse_bearer};

use crate::error::{LifecycleError, StoreError};
use crate::records::User;
use crate::repository::Repository;
use crate::usecase::{RequestContext, run_in_transaction};

pub struct CredentialVerifier<R: Repository<User>> {
    validator: Arc<dyn JwtValidator>,
    db: R::Db,
    repo: R,
}

impl<R: Repository<User>> CredentialVerifier<R> {
    pub fn new(validator: Arc<dyn JwtValidator>, db: R::Db, repo: R) -> Self {
        Self { validator, db, repo }
    }

    pub async fn verify(&self, ctx: &RequestContext, header: Option<&str>) -> Result<Principal, LifecycleError> {
        let token = parse_bearer(header)?;
        let claims = self.validator.validate(token, Utc::now())?;

        let user_id = claims.sub.clone();
        let user = run_in_transaction(&self.db, &self.repo, ctx, move |repo, tx| {
            Box::pin(async move {
                repo.find_by_id(tx, &user_id)
                    .await
                    .map_err(|err| match err {
                        StoreError::NotFound { .. } => LifecycleError::unauthenticated("unknown user"),
                        other => other.into(),
                    })
            })
        })
        .await?;

        if user.session_id.as_deref() != Some(claims.jti.as_str()) {
            tracing::debug!(user_id = %user.id, "token no longer matches the active session");
            return Err(LifecycleError::unauthenticated("token revoked"));
        }

        Ok(user.principal())
    }
}
