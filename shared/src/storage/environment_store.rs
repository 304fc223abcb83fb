//! Environment reading storage trait and implementations.
//!
//! Environment readings (room climate) are owned by an institution rather
//! than a child; they are the dependent aggregate of the institution-owner
//! cascade variant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during environment store operations.
#[derive(Debug, Error)]
pub enum EnvironmentStoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on environment store")]
    LockError,

    /// Generic storage error.
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// A climate reading taken in an institution room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentReading {
    /// Store-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Room the reading was taken in.
    pub location: String,

    /// Reading instant, UTC.
    pub timestamp: DateTime<Utc>,

    /// Temperature in degrees Celsius.
    pub temperature: f64,

    /// Relative humidity in percent.
    pub humidity: f64,

    /// Identifier of the owning institution.
    pub institution_id: String,
}

impl EnvironmentReading {
    /// Creates a new, not-yet-persisted reading.
    pub fn new(
        location: impl Into<String>,
        timestamp: DateTime<Utc>,
        temperature: f64,
        humidity: f64,
        institution_id: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            location: location.into(),
            timestamp,
            temperature,
            humidity,
            institution_id: institution_id.into(),
        }
    }
}

/// Trait for environment storage implementations.
pub trait EnvironmentStore: Send + Sync {
    /// Persists a new reading, assigning its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn insert(&self, reading: EnvironmentReading)
        -> Result<EnvironmentReading, EnvironmentStoreError>;

    /// Counts the readings owned by an institution.
    ///
    /// # Errors
    ///
    /// Returns an error if the count operation fails.
    fn count_for_institution(&self, institution_id: &str)
        -> Result<usize, EnvironmentStoreError>;

    /// Removes every reading owned by an institution.
    ///
    /// Removing an already-empty set is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn remove_all_for_institution(
        &self,
        institution_id: &str,
    ) -> Result<bool, EnvironmentStoreError>;
}

/// In-memory environment store implementation.
#[derive(Debug, Default)]
pub struct InMemoryEnvironmentStore {
    readings: Arc<RwLock<Vec<EnvironmentReading>>>,
    next_seq: AtomicU64,
}

impl InMemoryEnvironmentStore {
    /// Creates a new empty in-memory environment store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            readings: Arc::new(RwLock::new(Vec::new())),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Creates a new in-memory environment store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl EnvironmentStore for InMemoryEnvironmentStore {
    fn insert(
        &self,
        reading: EnvironmentReading,
    ) -> Result<EnvironmentReading, EnvironmentStoreError> {
        let mut readings = self
            .readings
            .write()
            .map_err(|_| EnvironmentStoreError::LockError)?;
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let mut persisted = reading;
        persisted.id = Some(format!("{:08x}{:016x}", Utc::now().timestamp() as u32, seq));
        readings.push(persisted.clone());
        Ok(persisted)
    }

    fn count_for_institution(
        &self,
        institution_id: &str,
    ) -> Result<usize, EnvironmentStoreError> {
        let readings = self
            .readings
            .read()
            .map_err(|_| EnvironmentStoreError::LockError)?;
        Ok(readings
            .iter()
            .filter(|r| r.institution_id == institution_id)
            .count())
    }

    fn remove_all_for_institution(
        &self,
        institution_id: &str,
    ) -> Result<bool, EnvironmentStoreError> {
        let mut readings = self
            .readings
            .write()
            .map_err(|_| EnvironmentStoreError::LockError)?;
        readings.retain(|r| r.institution_id != institution_id);
        Ok(true)
    }
}
