//! Entity trait: identity + continuity across state changes.

use crate::lifecycle::{LifecycleState, Timestamps};

/// Entity marker + minimal interface.
///
/// Every persisted record has an opaque string identifier (immutable once
/// assigned) and the lifecycle timestamps that drive soft-delete visibility.
pub trait Entity {
    /// Returns the entity identifier.
    fn id(&self) -> &str;

    fn timestamps(&self) -> &Timestamps;

    fn timestamps_mut(&mut self) -> &mut Timestamps;

    /// Current lifecycle state, derived from `deleted_at`.
    fn state(&self) -> LifecycleState {
        self.timestamps().state()
    }
}
