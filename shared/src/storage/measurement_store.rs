//! Measurement storage trait and implementations.
//!
//! Provides the `MeasurementStore` trait for abstracting measurement storage
//! operations and an `InMemoryMeasurementStore` implementation for
//! development and testing. All measurement kinds share one logical
//! collection, discriminated by the record's type tag; type-scoped
//! operations always carry the tag so kinds never interfere.

use crate::models::{Measurement, MeasurementType};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during measurement store operations.
#[derive(Debug, Error)]
pub enum MeasurementStoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on measurement store")]
    LockError,

    /// A record with the same uniqueness key already exists.
    ///
    /// The key is `(child_id, timestamp, type)`; this is the store-level
    /// backstop behind the advisory existence probe.
    #[error("A {measurement_type} measurement for child {child_id} at {timestamp} already exists")]
    Duplicate {
        /// Owning child of the conflicting record.
        child_id: String,
        /// Timestamp of the conflicting record.
        timestamp: DateTime<Utc>,
        /// Kind of the conflicting record.
        measurement_type: MeasurementType,
    },

    /// The record failed the store's sanity checks.
    #[error("Measurement rejected by store: {0}")]
    InvalidRecord(String),

    /// Generic storage error.
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// The logical-duplicate key of a measurement.
///
/// All three fields are mandatory by construction, so an unfiltered
/// existence probe cannot be expressed; callers without a full key skip the
/// probe and rely on [`MeasurementStore::create`] rejecting duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateKey {
    /// Owning child.
    pub child_id: String,
    /// Observation instant.
    pub timestamp: DateTime<Utc>,
    /// Measurement kind.
    pub measurement_type: MeasurementType,
}

impl DuplicateKey {
    /// Builds the key of a measurement record.
    #[must_use]
    pub fn of(measurement: &Measurement) -> Self {
        Self {
            child_id: measurement.child_id.clone(),
            timestamp: measurement.timestamp,
            measurement_type: measurement.measurement_type,
        }
    }

    fn matches(&self, measurement: &Measurement) -> bool {
        measurement.child_id == self.child_id
            && measurement.timestamp == self.timestamp
            && measurement.measurement_type == self.measurement_type
    }
}

/// Query parameters for retrieving measurements.
#[derive(Debug, Clone, Default)]
pub struct MeasurementQuery {
    /// Filter by owning child.
    pub child_id: Option<String>,

    /// Filter by measurement kind.
    pub measurement_type: Option<MeasurementType>,

    /// Filter measurements starting from this time (inclusive).
    pub start_time: Option<DateTime<Utc>>,

    /// Filter measurements up to this time (exclusive).
    pub end_time: Option<DateTime<Utc>>,

    /// Maximum number of measurements to return.
    pub limit: Option<usize>,

    /// Number of measurements to skip (for pagination).
    pub offset: Option<usize>,
}

impl MeasurementQuery {
    /// Creates a new empty query (returns all measurements).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the child filter.
    #[must_use]
    pub fn with_child_id(mut self, child_id: impl Into<String>) -> Self {
        self.child_id = Some(child_id.into());
        self
    }

    /// Sets the measurement kind filter.
    #[must_use]
    pub fn with_type(mut self, measurement_type: MeasurementType) -> Self {
        self.measurement_type = Some(measurement_type);
        self
    }

    /// Sets the start time filter.
    #[must_use]
    pub fn with_start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Sets the end time filter.
    #[must_use]
    pub fn with_end_time(mut self, end: DateTime<Utc>) -> Self {
        self.end_time = Some(end);
        self
    }

    /// Sets the maximum number of results.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the offset for pagination.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    fn matches(&self, measurement: &Measurement) -> bool {
        if let Some(ref child_id) = self.child_id {
            if &measurement.child_id != child_id {
                return false;
            }
        }
        if let Some(measurement_type) = self.measurement_type {
            if measurement.measurement_type != measurement_type {
                return false;
            }
        }
        if let Some(start) = self.start_time {
            if measurement.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if measurement.timestamp >= end {
                return false;
            }
        }
        true
    }
}

/// Result of a measurement query operation.
#[derive(Debug, Clone)]
pub struct MeasurementQueryResult {
    /// The measurements matching the query, newest first.
    pub measurements: Vec<Measurement>,

    /// Total count of matching measurements (before limit/offset applied).
    pub total_count: usize,
}

/// Trait for measurement storage implementations.
///
/// Implementations must be thread-safe (Send + Sync) and must enforce the
/// `(child_id, timestamp, type)` uniqueness constraint on creation.
pub trait MeasurementStore: Send + Sync {
    /// Checks whether a record with the given uniqueness key exists.
    ///
    /// This probe is advisory: a concurrent create can still win the race,
    /// in which case [`MeasurementStore::create`] reports the conflict.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn exists(&self, key: &DuplicateKey) -> Result<bool, MeasurementStoreError>;

    /// Persists a new measurement, assigning its id and creation instant.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the uniqueness key is already taken, or
    /// another error if the operation fails.
    fn create(&self, measurement: Measurement) -> Result<Measurement, MeasurementStoreError>;

    /// Queries measurements based on the provided parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn query(&self, query: MeasurementQuery)
        -> Result<MeasurementQueryResult, MeasurementStoreError>;

    /// Fetches a single measurement by id and owning child.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn find_one(
        &self,
        id: &str,
        child_id: &str,
    ) -> Result<Option<Measurement>, MeasurementStoreError>;

    /// Fetches the single measurement carrying the given uniqueness key.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn find_by_key(
        &self,
        key: &DuplicateKey,
    ) -> Result<Option<Measurement>, MeasurementStoreError>;

    /// Replaces the record with the same `(id, child_id)`.
    ///
    /// Store-assigned fields are preserved. Returns the updated record, or
    /// `None` if no such record exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn update(
        &self,
        measurement: Measurement,
    ) -> Result<Option<Measurement>, MeasurementStoreError>;

    /// Removes one record by id, child and kind. Returns whether a record
    /// was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn remove_one(
        &self,
        id: &str,
        child_id: &str,
        measurement_type: MeasurementType,
    ) -> Result<bool, MeasurementStoreError>;

    /// Removes every record of one kind for a child.
    ///
    /// Scoped by kind so that kinds sharing the collection never interfere.
    /// Removing an already-empty set is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn remove_all_for_child(
        &self,
        child_id: &str,
        measurement_type: MeasurementType,
    ) -> Result<bool, MeasurementStoreError>;

    /// Counts the records of one kind for a child.
    ///
    /// # Errors
    ///
    /// Returns an error if the count operation fails.
    fn count(
        &self,
        child_id: &str,
        measurement_type: MeasurementType,
    ) -> Result<usize, MeasurementStoreError>;
}

/// In-memory measurement store implementation.
#[derive(Debug, Default)]
pub struct InMemoryMeasurementStore {
    measurements: Arc<RwLock<Vec<Measurement>>>,
    next_seq: AtomicU64,
}

impl InMemoryMeasurementStore {
    /// Creates a new empty in-memory measurement store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            measurements: Arc::new(RwLock::new(Vec::new())),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Creates a new in-memory measurement store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    // 24-hex id: creation seconds plus a process-wide sequence number.
    fn next_id(&self) -> String {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        format!("{:08x}{:016x}", Utc::now().timestamp() as u32, seq)
    }
}

impl MeasurementStore for InMemoryMeasurementStore {
    fn exists(&self, key: &DuplicateKey) -> Result<bool, MeasurementStoreError> {
        let measurements = self
            .measurements
            .read()
            .map_err(|_| MeasurementStoreError::LockError)?;
        Ok(measurements.iter().any(|m| key.matches(m)))
    }

    fn create(&self, measurement: Measurement) -> Result<Measurement, MeasurementStoreError> {
        measurement
            .validate_record()
            .map_err(|e| MeasurementStoreError::InvalidRecord(e.to_string()))?;

        let mut measurements = self
            .measurements
            .write()
            .map_err(|_| MeasurementStoreError::LockError)?;

        let key = DuplicateKey::of(&measurement);
        if measurements.iter().any(|m| key.matches(m)) {
            return Err(MeasurementStoreError::Duplicate {
                child_id: key.child_id,
                timestamp: key.timestamp,
                measurement_type: key.measurement_type,
            });
        }

        let mut persisted = measurement;
        persisted.id = Some(self.next_id());
        persisted.created_at = Some(Utc::now());
        measurements.push(persisted.clone());
        Ok(persisted)
    }

    fn query(
        &self,
        query: MeasurementQuery,
    ) -> Result<MeasurementQueryResult, MeasurementStoreError> {
        let measurements = self
            .measurements
            .read()
            .map_err(|_| MeasurementStoreError::LockError)?;

        let mut filtered: Vec<Measurement> = measurements
            .iter()
            .filter(|m| query.matches(m))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let total_count = filtered.len();
        let offset = query.offset.unwrap_or(0);
        let limited: Vec<Measurement> = filtered
            .into_iter()
            .skip(offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(MeasurementQueryResult {
            measurements: limited,
            total_count,
        })
    }

    fn find_one(
        &self,
        id: &str,
        child_id: &str,
    ) -> Result<Option<Measurement>, MeasurementStoreError> {
        let measurements = self
            .measurements
            .read()
            .map_err(|_| MeasurementStoreError::LockError)?;
        Ok(measurements
            .iter()
            .find(|m| m.id.as_deref() == Some(id) && m.child_id == child_id)
            .cloned())
    }

    fn find_by_key(
        &self,
        key: &DuplicateKey,
    ) -> Result<Option<Measurement>, MeasurementStoreError> {
        let measurements = self
            .measurements
            .read()
            .map_err(|_| MeasurementStoreError::LockError)?;
        Ok(measurements.iter().find(|m| key.matches(m)).cloned())
    }

    fn update(
        &self,
        measurement: Measurement,
    ) -> Result<Option<Measurement>, MeasurementStoreError> {
        let mut measurements = self
            .measurements
            .write()
            .map_err(|_| MeasurementStoreError::LockError)?;

        let Some(id) = measurement.id.clone() else {
            return Ok(None);
        };
        let Some(existing) = measurements
            .iter_mut()
            .find(|m| m.id.as_deref() == Some(id.as_str()) && m.child_id == measurement.child_id)
        else {
            return Ok(None);
        };

        let created_at = existing.created_at;
        *existing = measurement;
        existing.created_at = created_at;
        Ok(Some(existing.clone()))
    }

    fn remove_one(
        &self,
        id: &str,
        child_id: &str,
        measurement_type: MeasurementType,
    ) -> Result<bool, MeasurementStoreError> {
        let mut measurements = self
            .measurements
            .write()
            .map_err(|_| MeasurementStoreError::LockError)?;
        let before = measurements.len();
        measurements.retain(|m| {
            !(m.id.as_deref() == Some(id)
                && m.child_id == child_id
                && m.measurement_type == measurement_type)
        });
        Ok(measurements.len() < before)
    }

    fn remove_all_for_child(
        &self,
        child_id: &str,
        measurement_type: MeasurementType,
    ) -> Result<bool, MeasurementStoreError> {
        let mut measurements = self
            .measurements
            .write()
            .map_err(|_| MeasurementStoreError::LockError)?;
        measurements
            .retain(|m| !(m.child_id == child_id && m.measurement_type == measurement_type));
        Ok(true)
    }

    fn count(
        &self,
        child_id: &str,
        measurement_type: MeasurementType,
    ) -> Result<usize, MeasurementStoreError> {
        let measurements = self
            .measurements
            .read()
            .map_err(|_| MeasurementStoreError::LockError)?;
        Ok(measurements
            .iter()
            .filter(|m| m.child_id == child_id && m.measurement_type == measurement_type)
            .count())
    }
}
