//! Integration events exchanged with the rest of the service fleet.
//!
//! Every state-changing operation on a measurement emits one event on the
//! message bus. Events are plain JSON envelopes: an event name, a
//! measurement-kind tag, the emission instant and one kind-specific payload
//! key holding the serialized entity.

use crate::models::{Measurement, MeasurementType};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// Routing keys used on the message bus.
pub mod routing {
    /// A weight record was created.
    pub const WEIGHT_CREATED: &str = "measurements.weight.created";
    /// A weight record was deleted.
    pub const WEIGHT_DELETED: &str = "measurements.weight.deleted";
    /// A body-fat record was created.
    pub const BODY_FAT_CREATED: &str = "measurements.bodyfat.created";
    /// A body-fat record was deleted.
    pub const BODY_FAT_DELETED: &str = "measurements.bodyfat.deleted";
    /// A child was deleted somewhere in the fleet (consumed).
    pub const CHILD_DELETED: &str = "children.deleted";
    /// An institution was deleted somewhere in the fleet (consumed).
    pub const INSTITUTION_DELETED: &str = "institutions.deleted";
}

/// An event destined for (or received from) the message bus.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationEvent {
    /// Event name, e.g. "WeightCreated".
    pub event_name: String,
    /// Measurement-kind tag carried on the wire as "type".
    pub event_type: String,
    /// Instant the event was emitted.
    pub timestamp: DateTime<Utc>,
    /// Kind-specific payload key and serialized entity, if any.
    pub payload: Option<(String, Value)>,
}

impl IntegrationEvent {
    /// Creates an event with no payload.
    pub fn new(event_name: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            payload: None,
        }
    }

    /// Attaches the kind-specific payload.
    #[must_use]
    pub fn with_payload(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload = Some((key.into(), value));
        self
    }

    /// Event announcing a newly created measurement.
    #[must_use]
    pub fn measurement_created(measurement: &Measurement) -> Self {
        let (name, key) = match measurement.measurement_type {
            MeasurementType::Weight => ("WeightCreated", "weight"),
            MeasurementType::BodyFat => ("BodyFatCreated", "body_fat"),
        };
        Self::new(name, measurement.measurement_type.to_string()).with_payload(
            key,
            serde_json::to_value(measurement).unwrap_or_else(|_| json!({})),
        )
    }

    /// Event announcing a deleted measurement, carrying only its id.
    #[must_use]
    pub fn measurement_deleted(measurement_type: MeasurementType, id: &str) -> Self {
        let (name, key) = match measurement_type {
            MeasurementType::Weight => ("WeightDeleted", "weight"),
            MeasurementType::BodyFat => ("BodyFatDeleted", "body_fat"),
        };
        Self::new(name, measurement_type.to_string()).with_payload(key, json!({ "id": id }))
    }

    /// Routing key for the created event of a measurement kind.
    #[must_use]
    pub fn created_routing_key(measurement_type: MeasurementType) -> &'static str {
        match measurement_type {
            MeasurementType::Weight => routing::WEIGHT_CREATED,
            MeasurementType::BodyFat => routing::BODY_FAT_CREATED,
        }
    }

    /// Routing key for the deleted event of a measurement kind.
    #[must_use]
    pub fn deleted_routing_key(measurement_type: MeasurementType) -> &'static str {
        match measurement_type {
            MeasurementType::Weight => routing::WEIGHT_DELETED,
            MeasurementType::BodyFat => routing::BODY_FAT_DELETED,
        }
    }

    /// Extracts the `id` field of the payload entity, if present.
    ///
    /// Owner-deleted events received from the fleet carry only the owner's
    /// id; this is the accessor the cascade orchestrator uses.
    #[must_use]
    pub fn payload_id(&self) -> Option<&str> {
        self.payload
            .as_ref()
            .and_then(|(_, value)| value.get("id"))
            .and_then(Value::as_str)
    }

    /// Serializes the event to its wire shape.
    ///
    /// An event without a payload serializes to the envelope fields alone,
    /// not to an absent object.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        let mut wire = json!({
            "event_name": self.event_name,
            "type": self.event_type,
            "timestamp": self.timestamp.to_rfc3339(),
        });
        if let Some((key, value)) = &self.payload {
            wire[key.as_str()] = value.clone();
        }
        wire
    }
}
