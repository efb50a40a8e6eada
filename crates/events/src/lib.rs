//! Change events emitted after a committed lifecycle operation, and the
//! transports that carry them.

pub mod bus;
pub mod envelope;
pub mod in_memory_bus;
pub mod publisher;

pub use bus::{EventBus, Subscription};
pub use envelope::{ChangeAction, ChangeEvent};
pub use in_memory_bus::InMemoryEventBus;
pub use publisher::{BusPublisher, EventPublisher, PublishError};
