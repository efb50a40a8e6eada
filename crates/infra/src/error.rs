//! Storage and use-case error model.
//!
//! `StoreError` is what repositories return; `LifecycleError` is the single
//! error type every use-case operation returns. Both classify onto the
//! [`ErrorKind`] taxonomy through `kind()`.

use thiserror::Error;

use taskhub_auth::{PasswordError, TokenError};
use taskhub_core::{DomainError, ErrorKind};
use taskhub_events::PublishError;

/// Repository failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No visible row with that identifier.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// A stored row could not be decoded into its record type.
    #[error("corrupt {entity} row: {message}")]
    Corrupt {
        entity: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::Database { .. } | StoreError::Corrupt { .. } => ErrorKind::Internal,
        }
    }
}

/// Map a sqlx error onto the store taxonomy.
///
/// | sqlx error | Postgres code | StoreError |
/// |------------|---------------|------------|
/// | `RowNotFound` | n/a | `NotFound` |
/// | Database (unique violation) | `23505` | `Conflict` |
/// | anything else | any | `Database` |
pub(crate) fn map_sqlx_error(entity: &'static str, operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound { entity },
        sqlx::Error::Database(db_err) => {
            let is_unique = db_err.code().is_some_and(|code| code.as_ref() == "23505");
            if is_unique {
                let constraint = db_err.constraint().unwrap_or(entity).to_string();
                StoreError::Conflict(constraint)
            } else {
                StoreError::Database {
                    operation,
                    message: db_err.message().to_string(),
                }
            }
        }
        other => StoreError::Database {
            operation,
            message: other.to_string(),
        },
    }
}

/// Failure of a lifecycle operation.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("storage failure: {0}")]
    Store(StoreError),

    /// The transaction could not be committed; nothing was persisted.
    #[error("commit failed: {0}")]
    Commit(StoreError),

    /// The change was committed but the notification could not be sent.
    #[error("change committed but not published: {0}")]
    Publish(#[from] PublishError),

    #[error("request deadline exceeded")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::InvalidInput(_) => ErrorKind::InvalidInput,
            LifecycleError::NotFound { .. } => ErrorKind::NotFound,
            LifecycleError::Conflict(_) => ErrorKind::Conflict,
            LifecycleError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            LifecycleError::Store(_)
            | LifecycleError::Commit(_)
            | LifecycleError::Publish(_)
            | LifecycleError::Cancelled
            | LifecycleError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity } => LifecycleError::NotFound { entity },
            StoreError::Conflict(what) => LifecycleError::Conflict(what),
            other => LifecycleError::Store(other),
        }
    }
}

impl From<DomainError> for LifecycleError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                LifecycleError::InvalidInput(msg)
            }
        }
    }
}

impl From<TokenError> for LifecycleError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encode(msg) => LifecycleError::Internal(msg),
            other => LifecycleError::Unauthenticated(other.to_string()),
        }
    }
}

impl From<PasswordError> for LifecycleError {
    fn from(err: PasswordError) -> Self {
        LifecycleError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_commit_failures_are_internal() {
        assert_eq!(LifecycleError::Cancelled.kind(), ErrorKind::Internal);
        assert_eq!(
            LifecycleError::Publish(PublishError::new("broker down")).kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            LifecycleError::Commit(StoreError::Database {
                operation: "commit",
                message: "connection reset".into()
            })
            .kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn store_errors_keep_their_kind() {
        let err: LifecycleError = StoreError::NotFound { entity: "role" }.into();
        assert!(matches!(err, LifecycleError::NotFound { entity: "role" }));

        let err: LifecycleError = StoreError::Conflict("users_email_key".into()).into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = map_sqlx_error("role", "find_by_id", sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::NotFound { entity: "role" }));
    }

    #[test]
    fn token_failures_are_unauthenticated() {
        let err: LifecycleError = TokenError::InvalidSignature.into();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);

        let err: LifecycleError = TokenError::Encode("bad key".into()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn validation_maps_to_invalid_input() {
        let err: LifecycleError = DomainError::validation("name is required").into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "invalid input: name is required");
    }
}
