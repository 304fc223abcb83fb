//! Integration tests for measurement querying and filtering.

use axum::http::StatusCode;
use serde_json::json;

use super::common::{get, measurements_uri, post_json, test_app};

async fn seed_weights(app: &axum::Router) {
    for (day, value) in [(10, 30.8), (11, 31.0), (12, 31.4)] {
        let weight = json!({
            "type": "weight",
            "timestamp": format!("2018-12-{day}T12:52:59Z"),
            "value": value,
            "unit": "kg"
        });
        let (status, _) = post_json(app.clone(), &measurements_uri(), weight).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let body_fat = json!({
        "type": "body_fat",
        "timestamp": "2018-12-11T12:52:59Z",
        "value": 21.2,
        "unit": "%"
    });
    let (status, _) = post_json(app.clone(), &measurements_uri(), body_fat).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_filter_by_type() {
    let (app, _state) = test_app();
    seed_weights(&app).await;

    let uri = format!("{}?type=weight", measurements_uri());
    let (status, response) = get(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_count"], 3);
    // newest first
    assert_eq!(response["measurements"][0]["value"], 31.4);
    assert_eq!(response["measurements"][2]["value"], 30.8);
}

#[tokio::test]
async fn test_filter_by_time_range() {
    let (app, _state) = test_app();
    seed_weights(&app).await;

    let from = urlencoding::encode("2018-12-11T00:00:00Z");
    let to = urlencoding::encode("2018-12-12T00:00:00Z");
    let uri = format!("{}?type=weight&from={from}&to={to}", measurements_uri());
    let (status, response) = get(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_count"], 1);
    assert_eq!(response["measurements"][0]["value"], 31.0);
}

#[tokio::test]
async fn test_pagination() {
    let (app, _state) = test_app();
    seed_weights(&app).await;

    let uri = format!("{}?type=weight&limit=1&offset=1", measurements_uri());
    let (status, response) = get(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_count"], 3);
    assert_eq!(response["measurements"].as_array().unwrap().len(), 1);
    assert_eq!(response["measurements"][0]["value"], 31.0);
}

#[tokio::test]
async fn test_malformed_from_bound_is_rejected() {
    let (app, _state) = test_app();

    let uri = format!("{}?from=yesterday", measurements_uri());
    let (status, error) = get(app, &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["message"].as_str().unwrap().contains("yesterday"));
}

#[tokio::test]
async fn test_malformed_child_id_in_path_is_rejected() {
    let (app, _state) = test_app();

    let (status, error) = get(app, "/v1/children/nope/measurements").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["message"].as_str().unwrap().contains("child id"));
}
