//! Record lifecycle: creation/mutation timestamps and the soft-delete marker.
//!
//! A record is `Active` while `deleted_at` is null and `SoftDeleted` once it is
//! stamped. Purging removes the row entirely, so there is no in-memory
//! representation of the terminal state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a stored record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Active,
    SoftDeleted,
}

/// Audit timestamps carried by every record.
///
/// Invariant: `deleted_at` is either `None` or `>= created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Timestamps {
    /// Timestamps for a record created at `now` (`created_at == updated_at`).
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        if self.deleted_at.is_some() {
            LifecycleState::SoftDeleted
        } else {
            LifecycleState::Active
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Refresh `updated_at` after a content mutation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Stamp the soft-delete marker. Calling twice re-stamps.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now.max(self.created_at));
    }

    /// Clear the soft-delete marker (no-op on an active record).
    pub fn restore(&mut self) {
        self.deleted_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_records_are_active_with_equal_timestamps() {
        let now = Utc::now();
        let ts = Timestamps::new(now);
        assert_eq!(ts.created_at, ts.updated_at);
        assert_eq!(ts.state(), LifecycleState::Active);
    }

    #[test]
    fn delete_stamp_never_precedes_creation() {
        let now = Utc::now();
        let mut ts = Timestamps::new(now);
        ts.mark_deleted(now - Duration::hours(1));
        assert_eq!(ts.deleted_at, Some(now));
        assert_eq!(ts.state(), LifecycleState::SoftDeleted);
    }

    #[test]
    fn restore_is_idempotent() {
        let mut ts = Timestamps::new(Utc::now());
        ts.restore();
        assert!(!ts.is_deleted());
        ts.mark_deleted(Utc::now());
        ts.restore();
        ts.restore();
        assert_eq!(ts.deleted_at, None);
    }
}
