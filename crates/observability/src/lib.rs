//! Process-wide tracing setup shared by every binary.

pub mod tracing;

pub use self::tracing::{LogFormat, init, init_with};
