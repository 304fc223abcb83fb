//! Physical activity storage trait and implementations.
//!
//! Activities are owned by a child and are a dependent aggregate of the
//! cascade delete fan-out; the write pipeline itself lives in other
//! services of the fleet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during activity store operations.
#[derive(Debug, Error)]
pub enum ActivityStoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on activity store")]
    LockError,

    /// Generic storage error.
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// A physical activity session owned by a child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Store-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Activity name, e.g. "walk" or "run".
    pub name: String,

    /// Session start instant, UTC.
    pub start_time: DateTime<Utc>,

    /// Session duration in milliseconds.
    pub duration_ms: u64,

    /// Calories burned, when the tracker reports them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,

    /// Identifier of the owning child.
    pub child_id: String,
}

impl Activity {
    /// Creates a new, not-yet-persisted activity.
    pub fn new(
        name: impl Into<String>,
        start_time: DateTime<Utc>,
        duration_ms: u64,
        child_id: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            start_time,
            duration_ms,
            calories: None,
            child_id: child_id.into(),
        }
    }
}

/// Trait for activity storage implementations.
pub trait ActivityStore: Send + Sync {
    /// Persists a new activity, assigning its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn insert(&self, activity: Activity) -> Result<Activity, ActivityStoreError>;

    /// Counts the activities owned by a child.
    ///
    /// # Errors
    ///
    /// Returns an error if the count operation fails.
    fn count_for_child(&self, child_id: &str) -> Result<usize, ActivityStoreError>;

    /// Removes every activity owned by a child.
    ///
    /// Removing an already-empty set is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn remove_all_for_child(&self, child_id: &str) -> Result<bool, ActivityStoreError>;
}

/// In-memory activity store implementation.
#[derive(Debug, Default)]
pub struct InMemoryActivityStore {
    activities: Arc<RwLock<Vec<Activity>>>,
    next_seq: AtomicU64,
}

impl InMemoryActivityStore {
    /// Creates a new empty in-memory activity store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            activities: Arc::new(RwLock::new(Vec::new())),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Creates a new in-memory activity store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl ActivityStore for InMemoryActivityStore {
    fn insert(&self, activity: Activity) -> Result<Activity, ActivityStoreError> {
        let mut activities = self
            .activities
            .write()
            .map_err(|_| ActivityStoreError::LockError)?;
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let mut persisted = activity;
        persisted.id = Some(format!("{:08x}{:016x}", Utc::now().timestamp() as u32, seq));
        activities.push(persisted.clone());
        Ok(persisted)
    }

    fn count_for_child(&self, child_id: &str) -> Result<usize, ActivityStoreError> {
        let activities = self
            .activities
            .read()
            .map_err(|_| ActivityStoreError::LockError)?;
        Ok(activities.iter().filter(|a| a.child_id == child_id).count())
    }

    fn remove_all_for_child(&self, child_id: &str) -> Result<bool, ActivityStoreError> {
        let mut activities = self
            .activities
            .write()
            .map_err(|_| ActivityStoreError::LockError)?;
        activities.retain(|a| a.child_id != child_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHILD_ID: &str = "5a62be07de34500146d9c544";

    #[test]
    fn test_insert_and_count() {
        let store = InMemoryActivityStore::new();
        let activity = store
            .insert(Activity::new("walk", Utc::now(), 1_800_000, CHILD_ID))
            .unwrap();
        assert!(activity.id.is_some());
        assert_eq!(store.count_for_child(CHILD_ID).unwrap(), 1);
    }

    #[test]
    fn test_remove_all_for_child_scopes_by_owner() {
        let store = InMemoryActivityStore::new();
        store
            .insert(Activity::new("walk", Utc::now(), 1_800_000, CHILD_ID))
            .unwrap();
        store
            .insert(Activity::new(
                "run",
                Utc::now(),
                900_000,
                "5a62be07de34500146d9c545",
            ))
            .unwrap();

        assert!(store.remove_all_for_child(CHILD_ID).unwrap());
        assert_eq!(store.count_for_child(CHILD_ID).unwrap(), 0);
        assert_eq!(
            store.count_for_child("5a62be07de34500146d9c545").unwrap(),
            1
        );
        // repeat removal is a no-op success
        assert!(store.remove_all_for_child(CHILD_ID).unwrap());
    }
}
