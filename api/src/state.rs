//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers
//! and wires the domain services together: stores, event bus, outbox and
//! the cascade orchestrators subscribed to the fleet's deletion events.

use shared::messaging::{EventOutbox, InMemoryEventBus};
use shared::models::routing;
use shared::services::{CascadeDeleteOrchestrator, MeasurementService};
use shared::storage::{
    ActivityStore, EnvironmentStore, InMemoryActivityStore, InMemoryEnvironmentStore,
    InMemoryMeasurementStore, InMemoryOutboxStore, InMemorySleepStore, MeasurementStore,
    OutboxStore, SleepStore,
};
use std::sync::Arc;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    service: MeasurementService,
    measurement_store: Arc<dyn MeasurementStore>,
    activity_store: Arc<dyn ActivityStore>,
    sleep_store: Arc<dyn SleepStore>,
    environment_store: Arc<dyn EnvironmentStore>,
    outbox_store: Arc<dyn OutboxStore>,
    bus: Arc<InMemoryEventBus>,
}

impl AppState {
    /// Creates a new application state with in-memory stores and a fully
    /// wired pipeline: outbox-backed publishing plus both cascade
    /// orchestrators subscribed to the fleet's owner-deleted events.
    ///
    /// This is the wiring used for development and testing; production
    /// deployments swap in database- and broker-backed implementations
    /// behind the same traits.
    #[must_use]
    pub fn with_in_memory_store() -> Self {
        let measurement_store = InMemoryMeasurementStore::new_shared();
        let activity_store = InMemoryActivityStore::new_shared();
        let sleep_store = InMemorySleepStore::new_shared();
        let environment_store = InMemoryEnvironmentStore::new_shared();
        let outbox_store = InMemoryOutboxStore::new_shared();
        let bus = InMemoryEventBus::new_shared();

        let outbox = EventOutbox::new(bus.clone(), outbox_store.clone());
        let service = MeasurementService::new(measurement_store.clone(), outbox);

        let child_cascade = Arc::new(CascadeDeleteOrchestrator::for_child(
            activity_store.clone(),
            sleep_store.clone(),
            measurement_store.clone(),
        ));
        child_cascade.subscribe(bus.as_ref(), routing::CHILD_DELETED);

        let institution_cascade = Arc::new(CascadeDeleteOrchestrator::for_institution(
            environment_store.clone(),
        ));
        institution_cascade.subscribe(bus.as_ref(), routing::INSTITUTION_DELETED);

        Self {
            service,
            measurement_store,
            activity_store,
            sleep_store,
            environment_store,
            outbox_store,
            bus,
        }
    }

    /// Returns the measurement pipeline.
    #[must_use]
    pub fn measurements(&self) -> &MeasurementService {
        &self.service
    }

    /// Returns a reference to the measurement store.
    #[must_use]
    pub fn measurement_store(&self) -> &dyn MeasurementStore {
        self.measurement_store.as_ref()
    }

    /// Returns a reference to the activity store.
    #[must_use]
    pub fn activity_store(&self) -> &dyn ActivityStore {
        self.activity_store.as_ref()
    }

    /// Returns a reference to the sleep store.
    #[must_use]
    pub fn sleep_store(&self) -> &dyn SleepStore {
        self.sleep_store.as_ref()
    }

    /// Returns a reference to the environment store.
    #[must_use]
    pub fn environment_store(&self) -> &dyn EnvironmentStore {
        self.environment_store.as_ref()
    }

    /// Returns a reference to the outbox store.
    #[must_use]
    pub fn outbox_store(&self) -> &dyn OutboxStore {
        self.outbox_store.as_ref()
    }

    /// Returns the in-memory event bus.
    #[must_use]
    pub fn bus(&self) -> &InMemoryEventBus {
        self.bus.as_ref()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_store()
    }
}
