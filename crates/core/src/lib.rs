//! `taskhub-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error taxonomy, record lifecycle timestamps, pagination, identifiers
//! and structural validation rules.

pub mod entity;
pub mod error;
pub mod id;
pub mod lifecycle;
pub mod page;
pub mod validate;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::RecordId;
pub use lifecycle::{LifecycleState, Timestamps};
pub use page::{Page, PageMetadata, PageRequest};
