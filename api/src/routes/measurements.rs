//! Measurement ingestion, query and deletion endpoints.
//!
//! The submission body may be a single object or an array; arity is
//! resolved here at the transport boundary and routed to the pipeline's
//! explicit single-item and batch operations. A batch never fails as a
//! whole: it returns 207 with the per-item report.

use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::models::{Measurement, MeasurementSubmission, MeasurementType};
use shared::services::ServiceError;
use shared::storage::{MeasurementQuery, MeasurementStore};
use shared::validation::{self, ValidationError};

/// Request body for measurement ingestion: one submission or a batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MeasurementIngestRequest {
    /// A single submission.
    Single(MeasurementRequest),
    /// An ordered batch of submissions.
    Batch(Vec<MeasurementRequest>),
}

/// A single measurement request.
///
/// Mirrors [`MeasurementSubmission`], minus `child_id`, which always comes
/// from the request path.
#[derive(Debug, Deserialize, Serialize)]
pub struct MeasurementRequest {
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
    /// Embedded body-fat percentage, Weight submissions only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<f64>,
}

impl MeasurementRequest {
    fn into_submission(self, child_id: &str) -> MeasurementSubmission {
        MeasurementSubmission {
            measurement_type: self.measurement_type,
            timestamp: self.timestamp,
            value: self.value,
            unit: self.unit,
            child_id: Some(child_id.to_string()),
            body_fat: self.body_fat,
        }
    }
}

/// Query parameters for listing measurements.
#[derive(Debug, Deserialize)]
pub struct MeasurementQueryParams {
    /// Filter by measurement kind.
    #[serde(rename = "type")]
    pub measurement_type: Option<String>,
    /// Lower timestamp bound (inclusive), ISO-8601.
    pub from: Option<String>,
    /// Upper timestamp bound (exclusive), ISO-8601.
    pub to: Option<String>,
    /// Maximum number of results.
    pub limit: Option<usize>,
    /// Number of results to skip.
    pub offset: Option<usize>,
}

/// Response for measurement queries.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeasurementListResponse {
    /// Matching measurements, newest first.
    pub measurements: Vec<Measurement>,
    /// Total matches before pagination.
    pub total_count: usize,
}

/// Structured error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP-style status code.
    pub code: u16,
    /// Short reason.
    pub message: String,
    /// Detailed reason.
    pub description: String,
}

impl ApiError {
    fn of(err: &ServiceError) -> (StatusCode, Json<Self>) {
        let code = err.status_code();
        (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(Self {
                code,
                message: err.message(),
                description: err.description(),
            }),
        )
    }

    fn bad_request(err: &ValidationError) -> (StatusCode, Json<Self>) {
        (
            StatusCode::BAD_REQUEST,
            Json(Self {
                code: StatusCode::BAD_REQUEST.as_u16(),
                message: err.message.clone(),
                description: err.description.clone(),
            }),
        )
    }
}

/// Creates the measurement routes.
pub fn measurement_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/children/{child_id}/measurements",
            post(ingest_measurements).get(query_measurements),
        )
        .route(
            "/v1/children/{child_id}/measurements/{measurement_id}",
            delete(delete_measurement),
        )
        .with_state(state)
}

async fn ingest_measurements(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
    Json(request): Json<MeasurementIngestRequest>,
) -> Response {
    match request {
        MeasurementIngestRequest::Single(item) => {
            let submission = item.into_submission(&child_id);
            match state.measurements().add_one(&submission) {
                Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
                Err(err) => ApiError::of(&err).into_response(),
            }
        }
        MeasurementIngestRequest::Batch(items) => {
            let submissions: Vec<MeasurementSubmission> = items
                .into_iter()
                .map(|item| item.into_submission(&child_id))
                .collect();
            let report = state.measurements().add_many(&submissions);
            (StatusCode::MULTI_STATUS, Json(report)).into_response()
        }
    }
}

async fn query_measurements(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
    Query(params): Query<MeasurementQueryParams>,
) -> Response {
    if !validation::is_valid_subject_id(&child_id) {
        return ApiError::bad_request(&ValidationError::invalid_child_id(&child_id))
            .into_response();
    }

    let mut query = MeasurementQuery::new().with_child_id(&child_id);

    if let Some(tag) = params.measurement_type.as_deref() {
        match tag.parse::<MeasurementType>() {
            Ok(measurement_type) => query = query.with_type(measurement_type),
            Err(_) => {
                return ApiError::bad_request(&ValidationError::unsupported_type(tag))
                    .into_response();
            }
        }
    }
    if let Some(raw) = params.from.as_deref() {
        match validation::parse_timestamp(raw) {
            Ok(from) => query = query.with_start_time(from),
            Err(err) => return ApiError::bad_request(&err).into_response(),
        }
    }
    if let Some(raw) = params.to.as_deref() {
        match validation::parse_timestamp(raw) {
            Ok(to) => query = query.with_end_time(to),
            Err(err) => return ApiError::bad_request(&err).into_response(),
        }
    }
    if let Some(limit) = params.limit {
        query = query.with_limit(limit);
    }
    if let Some(offset) = params.offset {
        query = query.with_offset(offset);
    }

    match state.measurement_store().query(query) {
        Ok(result) => (
            StatusCode::OK,
            Json(MeasurementListResponse {
                measurements: result.measurements,
                total_count: result.total_count,
            }),
        )
            .into_response(),
        Err(err) => ApiError::of(&ServiceError::Repository(err)).into_response(),
    }
}

async fn delete_measurement(
    State(state): State<AppState>,
    Path((child_id, measurement_id)): Path<(String, String)>,
) -> Response {
    match state
        .measurements()
        .remove_by_child(&measurement_id, &child_id)
    {
        // deleting an absent record is an idempotent no-op
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => ApiError::of(&err).into_response(),
    }
}
