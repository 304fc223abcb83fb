//! Durable outbox storage for undeliverable integration events.
//!
//! When a live bus publish fails, the event is serialized into an
//! `OutboxRecord` and parked here. An out-of-band redelivery sweep (a
//! separate process, not part of this crate) drains the store and replays
//! each record according to its `operation` and `routing_key`.

use crate::models::IntegrationEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// The retry action stamped on records created by a failed publish.
pub const OPERATION_PUBLISH: &str = "publish";

/// Errors that can occur during outbox store operations.
#[derive(Debug, Error)]
pub enum OutboxStoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on outbox store")]
    LockError,

    /// Generic storage error.
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// A serialized integration event awaiting redelivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxRecord {
    /// Store-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Name of the deferred event.
    pub event_name: String,

    /// Measurement-kind tag of the deferred event.
    pub event_type: String,

    /// Emission instant of the deferred event.
    pub timestamp: DateTime<Utc>,

    /// Full wire-shape payload of the deferred event.
    pub payload: Value,

    /// Action the redelivery sweep must retry.
    pub operation: String,

    /// Topic the event belongs on.
    pub routing_key: String,
}

impl OutboxRecord {
    /// Builds the record for an event whose live publish failed.
    #[must_use]
    pub fn from_event(event: &IntegrationEvent, routing_key: &str) -> Self {
        Self {
            id: None,
            event_name: event.event_name.clone(),
            event_type: event.event_type.clone(),
            timestamp: event.timestamp,
            payload: event.to_wire(),
            operation: OPERATION_PUBLISH.to_string(),
            routing_key: routing_key.to_string(),
        }
    }
}

/// Trait for outbox storage implementations.
pub trait OutboxStore: Send + Sync {
    /// Persists a record, assigning its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn save(&self, record: OutboxRecord) -> Result<OutboxRecord, OutboxStoreError>;

    /// Returns every parked record, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn list_pending(&self) -> Result<Vec<OutboxRecord>, OutboxStoreError>;

    /// Removes a record after successful redelivery. Returns whether a
    /// record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn remove(&self, id: &str) -> Result<bool, OutboxStoreError>;

    /// Number of parked records.
    ///
    /// # Errors
    ///
    /// Returns an error if the count operation fails.
    fn count(&self) -> Result<usize, OutboxStoreError>;
}

/// In-memory outbox store implementation.
#[derive(Debug, Default)]
pub struct InMemoryOutboxStore {
    records: Arc<RwLock<Vec<OutboxRecord>>>,
    next_seq: AtomicU64,
}

impl InMemoryOutboxStore {
    /// Creates a new empty in-memory outbox store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Creates a new in-memory outbox store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl OutboxStore for InMemoryOutboxStore {
    fn save(&self, record: OutboxRecord) -> Result<OutboxRecord, OutboxStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| OutboxStoreError::LockError)?;
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let mut persisted = record;
        persisted.id = Some(format!("{:08x}{:016x}", Utc::now().timestamp() as u32, seq));
        records.push(persisted.clone());
        Ok(persisted)
    }

    fn list_pending(&self) -> Result<Vec<OutboxRecord>, OutboxStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| OutboxStoreError::LockError)?;
        Ok(records.clone())
    }

    fn remove(&self, id: &str) -> Result<bool, OutboxStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| OutboxStoreError::LockError)?;
        let before = records.len();
        records.retain(|r| r.id.as_deref() != Some(id));
        Ok(records.len() < before)
    }

    fn count(&self) -> Result<usize, OutboxStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| OutboxStoreError::LockError)?;
        Ok(records.len())
    }
}
