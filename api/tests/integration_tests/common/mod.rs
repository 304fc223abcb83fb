//! Common test utilities and helpers for integration tests.
//!
//! Provides the test app setup and HTTP request helpers shared across all
//! integration tests.

use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;

/// The child id used throughout the integration tests.
pub const CHILD_ID: &str = "5a62be07de34500146d9c544";

/// Creates a test router with fresh in-memory wiring.
///
/// Returns the router together with the app state, so tests can reach the
/// stores and the bus behind the HTTP surface.
pub fn test_app() -> (Router, AppState) {
    let state = AppState::with_in_memory_store();
    let router = create_router(state.clone());
    (router, state)
}

/// Sends a POST request with a JSON body and returns status plus parsed body.
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap();

    read_response(response).await
}

/// Sends a GET request and returns status plus parsed body.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
    .unwrap();

    read_response(response).await
}

/// Sends a DELETE request and returns status plus parsed body.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    read_response(response).await
}

async fn read_response(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Path of the measurement collection of the test child.
#[must_use]
pub fn measurements_uri() -> String {
    format!("/v1/children/{CHILD_ID}/measurements")
}
