//! Storage traits and implementations.
//!
//! This module provides abstractions for persisting measurement data and
//! its dependent aggregates. Each store is a trait with an in-memory
//! implementation, allowing database-backed implementations to be swapped
//! in behind the same contract.

pub mod activity_store;
pub mod environment_store;
pub mod measurement_store;
pub mod outbox_store;
pub mod sleep_store;

pub use activity_store::{Activity, ActivityStore, ActivityStoreError, InMemoryActivityStore};
pub use environment_store::{
    EnvironmentReading, EnvironmentStore, EnvironmentStoreError, InMemoryEnvironmentStore,
};
pub use measurement_store::{
    DuplicateKey, InMemoryMeasurementStore, MeasurementQuery, MeasurementQueryResult,
    MeasurementStore, MeasurementStoreError,
};
pub use outbox_store::{
    InMemoryOutboxStore, OutboxRecord, OutboxStore, OutboxStoreError, OPERATION_PUBLISH,
};
pub use sleep_store::{InMemorySleepStore, SleepRecord, SleepStore, SleepStoreError};
