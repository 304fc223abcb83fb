//! Measurement data model.
//!
//! Defines the persisted `Measurement` record, the `MeasurementType`
//! discriminator and the raw `MeasurementSubmission` accepted from callers
//! before validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Unit attached to every body-fat measurement.
pub const BODY_FAT_UNIT: &str = "%";

/// Kind of measurement stored in the shared measurement collection.
///
/// All kinds live in one logical collection and are discriminated by this
/// type tag; every type-scoped store operation must carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementType {
    /// Body weight.
    Weight,
    /// Body-fat percentage.
    BodyFat,
}

impl MeasurementType {
    /// All kinds accepted by the write path.
    #[must_use]
    pub fn allowed() -> &'static [Self] {
        &[Self::Weight, Self::BodyFat]
    }

    /// Comma-separated list of the allowed kind names, for error messages.
    #[must_use]
    pub fn allowed_names() -> String {
        Self::allowed()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weight => write!(f, "weight"),
            Self::BodyFat => write!(f, "body_fat"),
        }
    }
}

/// Error raised when a type tag is not a member of the allowed enumeration.
#[derive(Debug, Error)]
#[error("Measurement type '{0}' is not supported")]
pub struct UnsupportedMeasurementType(pub String);

impl std::str::FromStr for MeasurementType {
    type Err = UnsupportedMeasurementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight" => Ok(Self::Weight),
            "body_fat" => Ok(Self::BodyFat),
            other => Err(UnsupportedMeasurementType(other.to_string())),
        }
    }
}

/// A timestamped numeric observation owned by a child.
///
/// `id` and `created_at` are assigned by the store on creation and are `None`
/// on records that have not been persisted yet. A Weight may carry a link to
/// its associated body-fat record via `body_fat_id`.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use shared::models::{Measurement, MeasurementType};
///
/// let weight = Measurement::new(
///     MeasurementType::Weight,
///     Utc::now(),
///     31.4,
///     "kg",
///     "5a62be07de34500146d9c544",
/// );
///
/// assert!(weight.validate_record().is_ok());
/// assert!(weight.id.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Measurement {
    /// Store-assigned identifier (24-character hexadecimal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Kind discriminator.
    #[serde(rename = "type")]
    pub measurement_type: MeasurementType,

    /// Instant the observation was taken, UTC.
    pub timestamp: DateTime<Utc>,

    /// Observed numeric value.
    pub value: f64,

    /// Kind-dependent unit, e.g. "kg" or "%".
    #[validate(length(min = 1, message = "unit cannot be empty"))]
    pub unit: String,

    /// Identifier of the owning child (24-character hexadecimal).
    #[validate(length(equal = 24, message = "child_id must be 24 characters"))]
    pub child_id: String,

    /// Link to the associated body-fat record, Weight only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat_id: Option<String>,

    /// Store-assigned creation instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Errors that can occur when checking a measurement record's sanity.
#[derive(Debug, Error)]
pub enum MeasurementRecordError {
    /// The value is NaN or infinite.
    #[error("Measurement value must be a finite number")]
    NonFiniteValue,

    /// Field-level validation failed.
    #[error("Measurement validation failed: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

impl Measurement {
    /// Creates a new, not-yet-persisted measurement.
    pub fn new(
        measurement_type: MeasurementType,
        timestamp: DateTime<Utc>,
        value: f64,
        unit: impl Into<String>,
        child_id: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            measurement_type,
            timestamp,
            value,
            unit: unit.into(),
            child_id: child_id.into(),
            body_fat_id: None,
            created_at: None,
        }
    }

    /// Creates a body-fat record with the fixed "%" unit.
    pub fn body_fat(
        timestamp: DateTime<Utc>,
        value: f64,
        child_id: impl Into<String>,
    ) -> Self {
        Self::new(
            MeasurementType::BodyFat,
            timestamp,
            value,
            BODY_FAT_UNIT,
            child_id,
        )
    }

    /// Sets the body-fat association link.
    #[must_use]
    pub fn with_body_fat_id(mut self, body_fat_id: impl Into<String>) -> Self {
        self.body_fat_id = Some(body_fat_id.into());
        self
    }

    /// Returns true when this record is a Weight.
    #[must_use]
    pub fn is_weight(&self) -> bool {
        self.measurement_type == MeasurementType::Weight
    }

    /// Checks the record's structural sanity.
    ///
    /// Used by stores as defense in depth behind the validation layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is non-finite or a field constraint is
    /// violated.
    pub fn validate_record(&self) -> Result<(), MeasurementRecordError> {
        if !self.value.is_finite() {
            return Err(MeasurementRecordError::NonFiniteValue);
        }
        self.validate()?;
        Ok(())
    }
}

/// A raw measurement submission, before validation.
///
/// All fields are optional so that the validation layer can collect every
/// missing required field into one error instead of failing on the first.
/// `measurement_type` and `timestamp` stay strings here; conversion to typed
/// values happens only after validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementSubmission {
    /// Kind tag, e.g. "weight".
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub measurement_type: Option<String>,

    /// ISO-8601 timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Observed value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// Unit of the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Owning child identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_id: Option<String>,

    /// Embedded body-fat percentage, Weight submissions only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<f64>,
}

impl MeasurementSubmission {
    /// Creates an empty submission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the kind tag.
    #[must_use]
    pub fn with_type(mut self, measurement_type: impl Into<String>) -> Self {
        self.measurement_type = Some(measurement_type.into());
        self
    }

    /// Sets the timestamp string.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Sets the value.
    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the unit.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the owning child identifier.
    #[must_use]
    pub fn with_child_id(mut self, child_id: impl Into<String>) -> Self {
        self.child_id = Some(child_id.into());
        self
    }

    /// Sets the embedded body-fat percentage.
    #[must_use]
    pub fn with_body_fat(mut self, body_fat: f64) -> Self {
        self.body_fat = Some(body_fat);
        self
    }
}
