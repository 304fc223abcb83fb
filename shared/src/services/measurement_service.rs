//! Measurement write/delete pipeline.
//!
//! Drives one-or-many submissions through validation, duplicate detection,
//! association resolution and persistence, and emits the corresponding
//! integration event through the outbox. Bulk submissions aggregate per-item
//! outcomes into a `MultiStatus` report instead of failing as a whole.

use crate::models::{
    IntegrationEvent, Measurement, MeasurementSubmission, MultiStatus, STATUS_BAD_REQUEST,
    STATUS_CONFLICT, STATUS_CREATED, STATUS_INTERNAL_ERROR,
};
use crate::messaging::EventOutbox;
use crate::services::association;
use crate::storage::{DuplicateKey, MeasurementStore, MeasurementStoreError};
use crate::validation::{self, ValidationError};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by single-item pipeline operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The submission was malformed; the caller can correct and resubmit.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The submission duplicates an existing record's logical key.
    #[error("{message}")]
    Conflict {
        /// Short reason.
        message: String,
        /// Detailed reason.
        description: String,
    },

    /// Store infrastructure failure, not attributable to caller input.
    #[error(transparent)]
    Repository(#[from] MeasurementStoreError),
}

impl ServiceError {
    fn conflict(measurement: &Measurement) -> Self {
        Self::Conflict {
            message: format!(
                "A {} measurement for this child at this timestamp already exists!",
                measurement.measurement_type
            ),
            description: format!(
                "Child {} already has a {} measurement registered at {}.",
                measurement.child_id,
                measurement.measurement_type,
                measurement.timestamp.to_rfc3339()
            ),
        }
    }

    /// HTTP-style status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => STATUS_BAD_REQUEST,
            Self::Conflict { .. } => STATUS_CONFLICT,
            Self::Repository(_) => STATUS_INTERNAL_ERROR,
        }
    }

    /// Short reason shown to the caller.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation(err) => err.message.clone(),
            Self::Conflict { message, .. } => message.clone(),
            Self::Repository(_) => "An internal error has occurred!".to_string(),
        }
    }

    /// Detailed reason shown to the caller.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Validation(err) => err.description.clone(),
            Self::Conflict { description, .. } => description.clone(),
            Self::Repository(err) => err.to_string(),
        }
    }
}

/// The measurement write/delete pipeline.
#[derive(Clone)]
pub struct MeasurementService {
    store: Arc<dyn MeasurementStore>,
    outbox: EventOutbox,
}

impl MeasurementService {
    /// Creates the pipeline over a measurement store and an event outbox.
    pub fn new(store: Arc<dyn MeasurementStore>, outbox: EventOutbox) -> Self {
        Self { store, outbox }
    }

    /// Validates, deduplicates and persists one submission, then publishes
    /// the created event.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed input, `Conflict` when the
    /// logical key is taken, and `Repository` for store failures. The event
    /// publication never fails the operation.
    pub fn add_one(
        &self,
        submission: &MeasurementSubmission,
    ) -> Result<Measurement, ServiceError> {
        let mut measurement = validation::parse_submission(submission)?;

        let key = DuplicateKey::of(&measurement);
        if self.store.exists(&key)? {
            return Err(ServiceError::conflict(&measurement));
        }

        if measurement.is_weight() {
            if let Some(body_fat_value) = submission.body_fat {
                let resolved = association::resolve_body_fat(
                    self.store.as_ref(),
                    &measurement.child_id,
                    measurement.timestamp,
                    body_fat_value,
                );
                measurement.body_fat_id = resolved.and_then(|record| record.id);
            }
        }

        let created = self.store.create(measurement).map_err(|err| match err {
            // The advisory probe lost a race; report it as the same conflict.
            MeasurementStoreError::Duplicate { .. } => ServiceError::Conflict {
                message: "A measurement for this child at this timestamp already exists!"
                    .to_string(),
                description: err.to_string(),
            },
            other => ServiceError::Repository(other),
        })?;

        let event = IntegrationEvent::measurement_created(&created);
        let routing_key = IntegrationEvent::created_routing_key(created.measurement_type);
        let outcome = self.outbox.publish_or_defer(&event, routing_key);
        tracing::debug!(
            measurement_id = created.id.as_deref().unwrap_or(""),
            ?outcome,
            "created event handed to outbox"
        );

        Ok(created)
    }

    /// Runs the single-item pipeline over each submission in order and
    /// aggregates the outcomes.
    ///
    /// Items are processed strictly sequentially so that report entries
    /// align positionally with the submitted array. One item's failure
    /// never aborts the remaining items.
    #[must_use]
    pub fn add_many(
        &self,
        submissions: &[MeasurementSubmission],
    ) -> MultiStatus<Measurement> {
        let mut report = MultiStatus::new();
        for submission in submissions {
            match self.add_one(submission) {
                Ok(created) => report.push_success(STATUS_CREATED, created),
                Err(err) => report.push_error(
                    err.status_code(),
                    err.message(),
                    err.description(),
                    serde_json::to_value(submission).unwrap_or_else(|_| json!({})),
                ),
            }
        }
        report
    }

    /// Deletes one measurement of a child and publishes the deleted event.
    ///
    /// A Weight is first detached from its body-fat reference so the link
    /// never dangles. Returns `Ok(false)` when the target does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when either id is malformed, `Repository` for
    /// store failures.
    pub fn remove_by_child(
        &self,
        measurement_id: &str,
        child_id: &str,
    ) -> Result<bool, ServiceError> {
        if !validation::is_valid_subject_id(child_id) {
            return Err(ValidationError::invalid_child_id(child_id).into());
        }
        if !validation::is_valid_subject_id(measurement_id) {
            return Err(ValidationError::invalid_measurement_id(measurement_id).into());
        }

        let Some(target) = self.store.find_one(measurement_id, child_id)? else {
            return Ok(false);
        };

        if target.is_weight() && target.body_fat_id.is_some() {
            let mut detached = target.clone();
            detached.body_fat_id = None;
            self.store.update(detached)?;
        }

        let removed =
            self.store
                .remove_one(measurement_id, child_id, target.measurement_type)?;
        if removed {
            let event =
                IntegrationEvent::measurement_deleted(target.measurement_type, measurement_id);
            let routing_key =
                IntegrationEvent::deleted_routing_key(target.measurement_type);
            let outcome = self.outbox.publish_or_defer(&event, routing_key);
            tracing::debug!(measurement_id, ?outcome, "deleted event handed to outbox");
        }
        Ok(removed)
    }
}
