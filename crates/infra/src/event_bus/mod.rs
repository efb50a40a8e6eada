//! Broker-backed change-event transports.
//!
//! The publisher contract lives in `taskhub-events`; this module only
//! provides implementations that need a network client.

#[cfg(feature = "redis")]
pub mod redis_pubsub;

#[cfg(feature = "redis")]
pub use redis_pubsub::{RedisBusError, RedisPublisher};
