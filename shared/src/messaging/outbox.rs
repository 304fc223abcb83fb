//! Guaranteed-eventual event delivery.
//!
//! A state-changing operation must never lose its integration event just
//! because the broker is unreachable at the moment of the write. The outbox
//! attempts a live publish first; on failure it parks the serialized event
//! in the durable outbox store for an out-of-band redelivery sweep. Either
//! way the caller's operation proceeds.

use crate::models::IntegrationEvent;
use crate::storage::{OutboxRecord, OutboxStore};
use crate::messaging::bus::EventBus;
use std::sync::Arc;

/// How an event left the process.
///
/// None of the variants is an error to the business operation; the batch
/// processor logs the outcome and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The broker accepted the event.
    Delivered,
    /// The broker was unreachable; the event is parked under this outbox id.
    Deferred(String),
    /// Both the broker and the outbox store failed; the event survives only
    /// in the error log.
    Dropped,
}

/// Publishes events with a durable fallback.
#[derive(Clone)]
pub struct EventOutbox {
    bus: Arc<dyn EventBus>,
    store: Arc<dyn OutboxStore>,
}

impl EventOutbox {
    /// Creates an outbox over a bus client and a durable store.
    pub fn new(bus: Arc<dyn EventBus>, store: Arc<dyn OutboxStore>) -> Self {
        Self { bus, store }
    }

    /// Publishes an event, deferring it to the outbox store when the live
    /// publish fails.
    pub fn publish_or_defer(
        &self,
        event: &IntegrationEvent,
        routing_key: &str,
    ) -> PublishOutcome {
        if self.bus.publish(event, routing_key) {
            tracing::debug!(event = %event.event_name, routing_key, "event published");
            return PublishOutcome::Delivered;
        }

        let record = OutboxRecord::from_event(event, routing_key);
        match self.store.save(record) {
            Ok(saved) => {
                tracing::warn!(
                    event = %event.event_name,
                    routing_key,
                    "bus publish failed, event deferred to outbox"
                );
                PublishOutcome::Deferred(saved.id.unwrap_or_default())
            }
            Err(err) => {
                tracing::error!(
                    event = %event.event_name,
                    routing_key,
                    error = %err,
                    payload = %event.to_wire(),
                    "bus publish failed and outbox persistence failed, event lost"
                );
                PublishOutcome::Dropped
            }
        }
    }
}
