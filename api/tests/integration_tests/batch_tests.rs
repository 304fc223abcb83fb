//! Integration tests for batch submission and the MultiStatus report.

use axum::http::StatusCode;
use serde_json::json;

use super::common::{measurements_uri, post_json, test_app};

#[tokio::test]
async fn test_batch_reports_per_item_outcomes_in_order() {
    let (app, _state) = test_app();

    let batch = json!([
        {
            "type": "weight",
            "timestamp": "2018-12-14T12:52:59Z",
            "value": 31.4,
            "unit": "kg"
        },
        {
            "type": "weight"
        },
        {
            "type": "weight",
            "timestamp": "2018-12-15T12:52:59Z",
            "value": 31.6,
            "unit": "kg"
        }
    ]);

    let (status, report) = post_json(app, &measurements_uri(), batch).await;
    assert_eq!(status, StatusCode::MULTI_STATUS);

    let success = report["success"].as_array().unwrap();
    let error = report["error"].as_array().unwrap();
    assert_eq!(success.len(), 2);
    assert_eq!(error.len(), 1);

    // successes keep submission order
    assert_eq!(success[0]["code"], 201);
    assert_eq!(success[0]["item"]["value"], 31.4);
    assert_eq!(success[1]["item"]["value"], 31.6);

    // the failed item lists exactly its missing fields
    assert_eq!(error[0]["code"], 400);
    assert_eq!(
        error[0]["description"],
        "timestamp, value, unit, child_id is required!"
    );
    assert_eq!(error[0]["item"]["type"], "weight");
}

#[tokio::test]
async fn test_batch_duplicate_maps_to_conflict_entry() {
    let (app, _state) = test_app();

    let item = json!({
        "type": "body_fat",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 23.05,
        "unit": "%"
    });
    let batch = json!([item.clone(), item]);

    let (status, report) = post_json(app, &measurements_uri(), batch).await;
    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(report["success"].as_array().unwrap().len(), 1);

    let error = &report["error"][0];
    assert_eq!(error["code"], 409);
    assert!(error["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_batch_failure_never_aborts_later_items() {
    let (app, _state) = test_app();

    let batch = json!([
        { "type": "heart_rate", "timestamp": "2018-12-14T12:52:59Z", "value": 80.0, "unit": "bpm" },
        { "type": "weight", "timestamp": "2018-12-14T12:52:59Z", "value": 31.4, "unit": "kg" }
    ]);

    let (status, report) = post_json(app, &measurements_uri(), batch).await;
    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(report["error"].as_array().unwrap().len(), 1);
    assert_eq!(report["success"].as_array().unwrap().len(), 1);
    assert_eq!(report["success"][0]["item"]["value"], 31.4);
}

#[tokio::test]
async fn test_empty_batch_yields_empty_report() {
    let (app, _state) = test_app();

    let (status, report) = post_json(app, &measurements_uri(), json!([])).await;
    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(report["success"], json!([]));
    assert_eq!(report["error"], json!([]));
}
