//! Partial-success envelope for bulk submissions.
//!
//! A batch submission never fails as a whole: every item contributes either
//! a success or an error entry, in submission order.

use serde::{Deserialize, Serialize};

/// HTTP-style status code for an accepted item.
pub const STATUS_CREATED: u16 = 201;
/// HTTP-style status code for an item that failed validation.
pub const STATUS_BAD_REQUEST: u16 = 400;
/// HTTP-style status code for an item that duplicates an existing record.
pub const STATUS_CONFLICT: u16 = 409;
/// HTTP-style status code for an item that hit an infrastructure failure.
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Outcome report for a bulk operation.
///
/// Both lists are always present; an empty batch yields two empty lists.
/// Entry order follows submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiStatus<T> {
    /// Accepted items.
    pub success: Vec<StatusSuccess<T>>,
    /// Rejected items with the reason for each.
    pub error: Vec<StatusError>,
}

/// One accepted item of a bulk operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSuccess<T> {
    /// Status code, normally 201.
    pub code: u16,
    /// The persisted item.
    pub item: T,
}

/// One rejected item of a bulk operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusError {
    /// Mapped status code (400, 409 or 500).
    pub code: u16,
    /// Short reason.
    pub message: String,
    /// Detailed reason.
    pub description: String,
    /// The offending item as submitted.
    pub item: serde_json::Value,
}

impl<T> MultiStatus<T> {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self {
            success: Vec::new(),
            error: Vec::new(),
        }
    }

    /// Appends an accepted item.
    pub fn push_success(&mut self, code: u16, item: T) {
        self.success.push(StatusSuccess { code, item });
    }

    /// Appends a rejected item.
    pub fn push_error(
        &mut self,
        code: u16,
        message: impl Into<String>,
        description: impl Into<String>,
        item: serde_json::Value,
    ) {
        self.error.push(StatusError {
            code,
            message: message.into(),
            description: description.into(),
            item,
        });
    }

    /// Total number of reported items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.success.len() + self.error.len()
    }

    /// True when no items were reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.error.is_empty()
    }
}

impl<T> Default for MultiStatus<T> {
    fn default() -> Self {
        Self::new()
    }
}
