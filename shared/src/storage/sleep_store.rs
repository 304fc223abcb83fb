//! Sleep record storage trait and implementations.
//!
//! Sleep records are owned by a child and are a dependent aggregate of the
//! cascade delete fan-out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during sleep store operations.
#[derive(Debug, Error)]
pub enum SleepStoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on sleep store")]
    LockError,

    /// Generic storage error.
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// A night of sleep owned by a child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepRecord {
    /// Store-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Instant the child fell asleep, UTC.
    pub start_time: DateTime<Utc>,

    /// Total sleep duration in milliseconds.
    pub duration_ms: u64,

    /// Identifier of the owning child.
    pub child_id: String,
}

impl SleepRecord {
    /// Creates a new, not-yet-persisted sleep record.
    pub fn new(
        start_time: DateTime<Utc>,
        duration_ms: u64,
        child_id: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            start_time,
            duration_ms,
            child_id: child_id.into(),
        }
    }
}

/// Trait for sleep storage implementations.
pub trait SleepStore: Send + Sync {
    /// Persists a new sleep record, assigning its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn insert(&self, record: SleepRecord) -> Result<SleepRecord, SleepStoreError>;

    /// Counts the sleep records owned by a child.
    ///
    /// # Errors
    ///
    /// Returns an error if the count operation fails.
    fn count_for_child(&self, child_id: &str) -> Result<usize, SleepStoreError>;

    /// Removes every sleep record owned by a child.
    ///
    /// Removing an already-empty set is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn remove_all_for_child(&self, child_id: &str) -> Result<bool, SleepStoreError>;
}

/// In-memory sleep store implementation.
#[derive(Debug, Default)]
pub struct InMemorySleepStore {
    records: Arc<RwLock<Vec<SleepRecord>>>,
    next_seq: AtomicU64,
}

impl InMemorySleepStore {
    /// Creates a new empty in-memory sleep store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Creates a new in-memory sleep store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl SleepStore for InMemorySleepStore {
    fn insert(&self, record: SleepRecord) -> Result<SleepRecord, SleepStoreError> {
        let mut records = self.records.write().map_err(|_| SleepStoreError::LockError)?;
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let mut persisted = record;
        persisted.id = Some(format!("{:08x}{:016x}", Utc::now().timestamp() as u32, seq));
        records.push(persisted.clone());
        Ok(persisted)
    }

    fn count_for_child(&self, child_id: &str) -> Result<usize, SleepStoreError> {
        let records = self.records.read().map_err(|_| SleepStoreError::LockError)?;
        Ok(records.iter().filter(|r| r.child_id == child_id).count())
    }

    fn remove_all_for_child(&self, child_id: &str) -> Result<bool, SleepStoreError> {
        let mut records = self.records.write().map_err(|_| SleepStoreError::LockError)?;
        records.retain(|r| r.child_id != child_id);
        Ok(true)
    }
}
