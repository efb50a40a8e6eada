//! Redis pub/sub transport for change events.
//!
//! Pub/sub is not durable: subscribers that are offline when an event is
//! published never see it.

use async_trait::async_trait;
use redis::Commands;
use thiserror::Error;

use taskhub_events::{ChangeEvent, EventPublisher, PublishError};

#[derive(Debug, Error)]
pub enum RedisBusError {
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("encode change event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Publishes each [`ChangeEvent`] as JSON on one channel.
///
/// A connection is opened per publish; the client itself is cheap to clone
/// and holds no socket.
#[derive(Debug, Clone)]
pub struct RedisPublisher {
    client: redis::Client,
    channel: String,
}

impl RedisPublisher {
    pub fn new(redis_url: impl AsRef<str>, channel: impl Into<String>) -> Result<Self, RedisBusError> {
        Ok(Self {
            client: redis::Client::open(redis_url.as_ref())?,
            channel: channel.into(),
        })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Blocking publish; returns how many subscribers received the event.
    fn publish_blocking(&self, body: String) -> Result<i64, RedisBusError> {
        let mut conn = self.client.get_connection()?;
        Ok(conn.publish(&self.channel, body)?)
    }
}

#[async_trait]
impl EventPublisher for RedisPublisher {
    async fn send(&self, event: ChangeEvent) -> Result<(), PublishError> {
        let body = serde_json::to_string(&event).map_err(|e| PublishError::new(e.to_string()))?;
        let publisher = self.clone();
        let receivers = tokio::task::spawn_blocking(move || publisher.publish_blocking(body))
            .await
            .map_err(|join| PublishError::new(join.to_string()))?
            .map_err(|e| PublishError::new(e.to_string()))?;
        tracing::trace!(channel = %self.channel, receivers, "change event published");
        Ok(())
    }
}
