//! Validation of incoming measurement submissions.
//!
//! Pure checks over the raw submission, run before anything touches a store.
//! Missing required fields are collected into one error; an unsupported type
//! tag, a malformed child id or a malformed timestamp each fail immediately
//! with their own error.

use crate::models::{Measurement, MeasurementSubmission, MeasurementType};
use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// A submission was rejected before reaching a store.
///
/// Carries a short `message` and a longer `description`; both surface
/// unchanged in single-item errors and in bulk-report error entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Short reason.
    pub message: String,
    /// Detailed reason.
    pub description: String,
}

impl ValidationError {
    fn new(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            description: description.into(),
        }
    }

    /// One or more required fields were absent.
    #[must_use]
    pub fn required_fields(fields: &[&str]) -> Self {
        Self::new(
            "Required fields were not provided!",
            format!("{} is required!", fields.join(", ")),
        )
    }

    /// The type tag is not a member of the allowed enumeration.
    #[must_use]
    pub fn unsupported_type(provided: &str) -> Self {
        Self::new(
            format!("The measurement type \"{provided}\" is not supported!"),
            format!("The allowed types are: {}.", MeasurementType::allowed_names()),
        )
    }

    /// The child id does not match the subject-id format.
    #[must_use]
    pub fn invalid_child_id(provided: &str) -> Self {
        Self::new(
            format!("Parameter \"{provided}\" is not a valid child id!"),
            "A 24-character hexadecimal string is expected.",
        )
    }

    /// The measurement id does not match the record-id format.
    #[must_use]
    pub fn invalid_measurement_id(provided: &str) -> Self {
        Self::new(
            format!("Parameter \"{provided}\" is not a valid measurement id!"),
            "A 24-character hexadecimal string is expected.",
        )
    }

    /// The timestamp is not strict ISO-8601 or is an impossible date.
    #[must_use]
    pub fn invalid_datetime(provided: &str) -> Self {
        Self::new(
            format!("Datetime \"{provided}\" is not a valid ISO 8601 date!"),
            "Use the format yyyy-MM-ddTHH:mm:ssZ, e.g. 2018-12-14T12:52:59Z.",
        )
    }

    /// The embedded body-fat value is negative.
    #[must_use]
    pub fn negative_body_fat() -> Self {
        Self::new(
            "Invalid field: body_fat!",
            "The body_fat value must not be negative.",
        )
    }

    /// The embedded body-fat value is not a well-formed number.
    #[must_use]
    pub fn non_numeric_body_fat() -> Self {
        Self::new(
            "Invalid field: body_fat!",
            "The body_fat value must be a valid number.",
        )
    }
}

/// Checks whether an identifier matches the 24-character hexadecimal
/// subject-id format. Record ids share the same format.
#[must_use]
pub fn is_valid_subject_id(id: &str) -> bool {
    id.len() == 24 && hex::decode(id).is_ok()
}

/// Parses a strict ISO-8601 timestamp into a UTC instant.
///
/// Accepted shapes are `YYYY-MM-DDTHH:MM:SS[.sss]` with either a `Z`/offset
/// suffix or none (interpreted as UTC). Structural failures and impossible
/// calendar dates both map to the same invalid-datetime error.
///
/// # Errors
///
/// Returns [`ValidationError::invalid_datetime`] when the value does not
/// parse.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| ValidationError::invalid_datetime(raw))
}

/// Validates a submission for creation.
///
/// Check order: type membership (immediate on unsupported), then field
/// presence (collected), with a present child id and a present timestamp
/// each checked immediately, then the collected missing-fields error, then
/// the Weight-specific embedded body-fat check.
///
/// # Errors
///
/// Returns the first immediate error encountered, or the aggregated
/// missing-fields error.
pub fn validate_for_create(submission: &MeasurementSubmission) -> Result<(), ValidationError> {
    let mut missing: Vec<&str> = Vec::new();

    match submission.measurement_type.as_deref() {
        None => missing.push("type"),
        Some(tag) => {
            if tag.parse::<MeasurementType>().is_err() {
                return Err(ValidationError::unsupported_type(tag));
            }
        }
    }

    match submission.timestamp.as_deref() {
        None => missing.push("timestamp"),
        Some(raw) => {
            parse_timestamp(raw)?;
        }
    }

    if submission.value.is_none() {
        missing.push("value");
    }
    if submission.unit.is_none() {
        missing.push("unit");
    }

    match submission.child_id.as_deref() {
        None => missing.push("child_id"),
        Some(id) => {
            if !is_valid_subject_id(id) {
                return Err(ValidationError::invalid_child_id(id));
            }
        }
    }

    if !missing.is_empty() {
        return Err(ValidationError::required_fields(&missing));
    }

    if let Some(body_fat) = submission.body_fat {
        if !body_fat.is_finite() {
            return Err(ValidationError::non_numeric_body_fat());
        }
        if body_fat < 0.0 {
            return Err(ValidationError::negative_body_fat());
        }
    }

    Ok(())
}

/// Validates a submission and converts it into a typed measurement.
///
/// The embedded body-fat value is not part of the returned record; the
/// association resolver consumes it separately from the submission.
///
/// # Errors
///
/// Returns the validation error of [`validate_for_create`].
pub fn parse_submission(
    submission: &MeasurementSubmission,
) -> Result<Measurement, ValidationError> {
    validate_for_create(submission)?;

    // All unwrapped fields were just checked present and well-formed.
    let measurement_type = submission
        .measurement_type
        .as_deref()
        .and_then(|tag| tag.parse::<MeasurementType>().ok())
        .ok_or_else(|| ValidationError::required_fields(&["type"]))?;
    let timestamp = parse_timestamp(
        submission
            .timestamp
            .as_deref()
            .ok_or_else(|| ValidationError::required_fields(&["timestamp"]))?,
    )?;
    let value = submission
        .value
        .ok_or_else(|| ValidationError::required_fields(&["value"]))?;
    let unit = submission
        .unit
        .clone()
        .ok_or_else(|| ValidationError::required_fields(&["unit"]))?;
    let child_id = submission
        .child_id
        .clone()
        .ok_or_else(|| ValidationError::required_fields(&["child_id"]))?;

    Ok(Measurement::new(
        measurement_type,
        timestamp,
        value,
        unit,
        child_id,
    ))
}
