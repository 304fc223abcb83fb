//! Message bus abstraction and the event outbox.
//!
//! `bus` holds the narrow client contract over the fleet's broker;
//! `outbox` wraps it with the durable-fallback publish used by every
//! state-changing operation.

pub mod bus;
pub mod outbox;

pub use bus::{EventBus, EventHandler, InMemoryEventBus, PublishedEvent};
pub use outbox::{EventOutbox, PublishOutcome};
