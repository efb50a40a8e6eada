//! Record identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::validate;

/// Identifier of a stored record.
///
/// Stored as an opaque string. Freshly generated identifiers are UUIDv7
/// (time-ordered); identifiers received from callers must have UUID shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub const MAX_LEN: usize = 100;

    /// Create a new identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Parse a caller-supplied identifier, naming `field` in the error.
    pub fn parse(field: &str, raw: &str) -> Result<Self, DomainError> {
        validate::required(field, raw)?;
        validate::max_len(field, raw, Self::MAX_LEN)?;
        Uuid::parse_str(raw)
            .map_err(|e| DomainError::invalid_id(format!("{field}: {e}")))?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl FromStr for RecordId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse("id", s)
    }
}
