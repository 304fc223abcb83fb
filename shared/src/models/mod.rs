//! Data models for the Sprout measurement backend.
//!
//! This module contains the measurement records, the bulk-operation report
//! envelope and the integration events exchanged with the fleet.

pub mod event;
pub mod measurement;
pub mod multi_status;

pub use event::{routing, IntegrationEvent};
pub use measurement::{
    Measurement, MeasurementRecordError, MeasurementSubmission, MeasurementType,
    UnsupportedMeasurementType, BODY_FAT_UNIT,
};
pub use multi_status::{
    MultiStatus, StatusError, StatusSuccess, STATUS_BAD_REQUEST, STATUS_CONFLICT, STATUS_CREATED,
    STATUS_INTERNAL_ERROR,
};
