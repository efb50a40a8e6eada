//! Process-local broadcast bus, used by tests and single-node development.

use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;

use thiserror::Error;

use crate::bus::{EventBus, Subscription};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InMemoryBusError {
    /// A subscriber panicked while the listener list was locked.
    #[error("in-memory bus lock poisoned")]
    Poisoned,
}

/// Fans every published message out to the subscriptions alive at that
/// moment. Listeners whose [`Subscription`] was dropped are forgotten on the
/// next publish.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    listeners: Mutex<Vec<Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listeners registered so far (dead ones included until the next publish).
    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().map_or(0, |listeners| listeners.len())
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut listeners = self.listeners.lock().map_err(|_| InMemoryBusError::Poisoned)?;
        listeners.retain(|listener| listener.send(message.clone()).is_ok());
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (sender, receiver) = mpsc::channel();
        match self.listeners.lock() {
            Ok(mut listeners) => listeners.push(sender),
            // Poisoned: hand out a subscription that stays silent.
            Err(_) => drop(sender),
        }
        Subscription::new(receiver)
    }
}
