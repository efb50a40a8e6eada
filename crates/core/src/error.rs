//! Domain error model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Stable, machine-readable error classification.
///
/// Every failure surfaced to a caller maps onto exactly one of these kinds;
/// transports translate the kind (not the concrete error) into status codes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Structural validation failure.
    InvalidInput,
    /// The identifier does not resolve to a visible row.
    NotFound,
    /// Uniqueness violation.
    Conflict,
    /// Token missing, invalid, expired or revoked.
    Unauthenticated,
    /// Transaction, commit, publisher or unexpected store failure.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Internal => "internal",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-level error.
///
/// Only structural failures live here; lookups and uniqueness are decided by
/// storage and reported through the infrastructure error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) | DomainError::InvalidId(_) => ErrorKind::InvalidInput,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_as_stable_codes() {
        let json = serde_json::to_string(&ErrorKind::InvalidInput).unwrap();
        assert_eq!(json, "\"invalid_input\"");
        assert_eq!(ErrorKind::Unauthenticated.as_str(), "unauthenticated");
    }

    #[test]
    fn identifier_errors_are_invalid_input() {
        assert_eq!(DomainError::invalid_id("id: bad").kind(), ErrorKind::InvalidInput);
        assert_eq!(DomainError::validation("name is required").kind(), ErrorKind::InvalidInput);
    }
}
