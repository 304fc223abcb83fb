//! Weight↔BodyFat association resolution.
//!
//! A Weight submission may embed a body-fat percentage taken at the same
//! instant. Before the Weight is persisted, the resolver decides whether
//! that percentage reuses an existing body-fat record (overwriting only its
//! value, keeping its identity stable) or creates a new one. Whatever
//! happens here, the Weight write itself proceeds: resolution failures are
//! logged and yield no attachment.

use crate::models::{Measurement, MeasurementType};
use crate::storage::{DuplicateKey, MeasurementStore, MeasurementStoreError};
use chrono::{DateTime, Utc};

/// Resolves the body-fat record a Weight submission should reference.
///
/// Looks up an existing body-fat record for `(child_id, timestamp)`. If one
/// exists, its value is overwritten with the submitted one and the existing
/// (now updated) record is returned, so repeated Weight submissions for the
/// same instant never spawn a second record. Otherwise a new record is
/// created. Returns `None` when resolution fails; the caller persists the
/// Weight without an association in that case.
pub fn resolve_body_fat(
    store: &dyn MeasurementStore,
    child_id: &str,
    timestamp: DateTime<Utc>,
    value: f64,
) -> Option<Measurement> {
    let key = DuplicateKey {
        child_id: child_id.to_string(),
        timestamp,
        measurement_type: MeasurementType::BodyFat,
    };

    match store.find_by_key(&key) {
        Ok(Some(existing)) => overwrite_value(store, existing, value),
        Ok(None) => {
            let body_fat = Measurement::body_fat(timestamp, value, child_id);
            match store.create(body_fat) {
                Ok(created) => Some(created),
                // Lost the check/create race to a concurrent submission;
                // fall back to reusing whatever won.
                Err(MeasurementStoreError::Duplicate { .. }) => match store.find_by_key(&key) {
                    Ok(Some(existing)) => overwrite_value(store, existing, value),
                    _ => None,
                },
                Err(err) => {
                    tracing::warn!(
                        child_id,
                        error = %err,
                        "body-fat creation failed, weight will be saved without association"
                    );
                    None
                }
            }
        }
        Err(err) => {
            tracing::warn!(
                child_id,
                error = %err,
                "body-fat lookup failed, weight will be saved without association"
            );
            None
        }
    }
}

fn overwrite_value(
    store: &dyn MeasurementStore,
    mut existing: Measurement,
    value: f64,
) -> Option<Measurement> {
    existing.value = value;
    match store.update(existing) {
        Ok(Some(updated)) => Some(updated),
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(
                error = %err,
                "body-fat update failed, weight will be saved without association"
            );
            None
        }
    }
}
