//! Sprout Shared Library
//!
//! This crate contains the domain core of the Sprout child health
//! measurement backend: data models, validation, storage abstractions,
//! messaging (event bus + outbox) and the services that drive the
//! measurement write/delete pipeline.
//!
//! # Modules
//!
//! - [`models`] - Measurement records, bulk reports and integration events
//! - [`validation`] - Submission validation
//! - [`storage`] - Storage traits and implementations
//! - [`messaging`] - Event bus abstraction and the event outbox
//! - [`services`] - Batch processor, association resolver, cascade delete
//!
//! # Example
//!
//! ```
//! use shared::models::MeasurementSubmission;
//! use shared::validation;
//!
//! let submission = MeasurementSubmission::new()
//!     .with_type("weight")
//!     .with_timestamp("2018-12-14T12:52:59Z")
//!     .with_value(31.4)
//!     .with_unit("kg")
//!     .with_child_id("5a62be07de34500146d9c544");
//!
//! assert!(validation::validate_for_create(&submission).is_ok());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod messaging;
pub mod models;
pub mod services;
pub mod storage;
pub mod validation;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
