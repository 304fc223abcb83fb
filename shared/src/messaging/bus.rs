//! Message bus client abstraction.
//!
//! The backend is a client of the fleet's message broker, consumed through
//! a deliberately narrow contract: publish reports plain success or failure
//! (a broker outage is a `false`, not a panic or an error type), and
//! subscribe registers a handler for one routing key.

use crate::models::IntegrationEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Handler invoked for each event received on a subscribed routing key.
pub type EventHandler = Arc<dyn Fn(&IntegrationEvent) + Send + Sync>;

/// Trait for message bus clients.
pub trait EventBus: Send + Sync {
    /// Publishes an event on a routing key. Returns whether the broker
    /// accepted it; `false` covers both rejection and a lost connection.
    fn publish(&self, event: &IntegrationEvent, routing_key: &str) -> bool;

    /// Registers a handler for a routing key. Returns whether the
    /// subscription was established.
    fn subscribe(&self, routing_key: &str, handler: EventHandler) -> bool;
}

/// An event that was accepted by the in-memory bus.
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    /// The event as published.
    pub event: IntegrationEvent,
    /// Routing key it was published on.
    pub routing_key: String,
}

/// In-memory event bus implementation.
///
/// Records accepted events and dispatches them synchronously to subscribed
/// handlers. The connection can be toggled off to exercise the deferred
/// delivery path.
pub struct InMemoryEventBus {
    connected: AtomicBool,
    published: RwLock<Vec<PublishedEvent>>,
    handlers: RwLock<HashMap<String, Vec<EventHandler>>>,
}

impl InMemoryEventBus {
    /// Creates a new connected in-memory bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            published: RwLock::new(Vec::new()),
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a new connected in-memory bus wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Simulates the broker connection going up or down.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Returns every event accepted so far, in publish order.
    #[must_use]
    pub fn published(&self) -> Vec<PublishedEvent> {
        self.published
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for InMemoryEventBus {
    fn publish(&self, event: &IntegrationEvent, routing_key: &str) -> bool {
        if !self.connected.load(Ordering::SeqCst) {
            return false;
        }

        if let Ok(mut published) = self.published.write() {
            published.push(PublishedEvent {
                event: event.clone(),
                routing_key: routing_key.to_string(),
            });
        } else {
            return false;
        }

        // Dispatch outside the handler-map lock so a handler may subscribe
        // or publish without deadlocking.
        let matching: Vec<EventHandler> = self
            .handlers
            .read()
            .map(|handlers| handlers.get(routing_key).cloned().unwrap_or_default())
            .unwrap_or_default();
        for handler in matching {
            handler(event);
        }
        true
    }

    fn subscribe(&self, routing_key: &str, handler: EventHandler) -> bool {
        let Ok(mut handlers) = self.handlers.write() else {
            return false;
        };
        handlers
            .entry(routing_key.to_string())
            .or_default()
            .push(handler);
        true
    }
}
