//! Post-commit notification contract.
//!
//! Use-cases hold an `Option<Arc<dyn EventPublisher>>`; `None` means no
//! notifications and is a valid configuration.

use async_trait::async_trait;
use thiserror::Error;

use crate::bus::EventBus;
use crate::envelope::ChangeEvent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("event publication failed: {0}")]
pub struct PublishError(String);

impl PublishError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn send(&self, event: ChangeEvent) -> Result<(), PublishError>;
}

/// Publishes onto any [`EventBus`] carrying change events.
#[derive(Debug, Clone)]
pub struct BusPublisher<B> {
    bus: B,
}

impl<B> BusPublisher<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}

#[async_trait]
impl<B> EventPublisher for BusPublisher<B>
where
    B: EventBus<ChangeEvent>,
{
    async fn send(&self, event: ChangeEvent) -> Result<(), PublishError> {
        self.bus
            .publish(event)
            .map_err(|e| PublishError::new(format!("{e:?}")))
    }
}
