//! Integration tests for single-measurement ingestion and deletion.

use axum::http::StatusCode;
use serde_json::json;
use shared::models::MeasurementType;
use shared::storage::MeasurementStore;

use super::common::{delete, get, measurements_uri, post_json, test_app, CHILD_ID};

#[tokio::test]
async fn test_create_and_fetch_weight() {
    let (app, _state) = test_app();

    let weight = json!({
        "type": "weight",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 31.4,
        "unit": "kg"
    });

    let (status, created) = post_json(app.clone(), &measurements_uri(), weight).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "weight");
    assert_eq!(created["value"], 31.4);
    assert_eq!(created["child_id"], CHILD_ID);
    assert!(created["id"].is_string());
    assert!(created.get("body_fat_id").is_none());

    let (status, listed) = get(app, &measurements_uri()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total_count"], 1);
    assert_eq!(listed["measurements"][0]["id"], created["id"]);
}

#[tokio::test]
async fn test_weight_with_embedded_body_fat_creates_association() {
    let (app, state) = test_app();

    let weight = json!({
        "type": "weight",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 31.4,
        "unit": "kg",
        "body_fat": 21.2
    });

    let (status, created) = post_json(app, &measurements_uri(), weight).await;
    assert_eq!(status, StatusCode::CREATED);
    let body_fat_id = created["body_fat_id"].as_str().expect("association");

    let resident = state
        .measurement_store()
        .find_one(body_fat_id, CHILD_ID)
        .unwrap()
        .expect("body-fat record persisted");
    assert_eq!(resident.measurement_type, MeasurementType::BodyFat);
    assert_eq!(resident.value, 21.2);
    assert_eq!(resident.unit, "%");
}

#[tokio::test]
async fn test_weight_reuses_existing_body_fat_keeping_its_id() {
    let (app, state) = test_app();

    let body_fat = json!({
        "type": "body_fat",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 21.2,
        "unit": "%"
    });
    let (status, existing) = post_json(app.clone(), &measurements_uri(), body_fat).await;
    assert_eq!(status, StatusCode::CREATED);

    let weight = json!({
        "type": "weight",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 31.4,
        "unit": "kg",
        "body_fat": 23.05
    });
    let (status, created) = post_json(app, &measurements_uri(), weight).await;
    assert_eq!(status, StatusCode::CREATED);

    // stable identity, overwritten value, exactly one resident record
    assert_eq!(created["body_fat_id"], existing["id"]);
    assert_eq!(
        state
            .measurement_store()
            .count(CHILD_ID, MeasurementType::BodyFat)
            .unwrap(),
        1
    );
    let refreshed = state
        .measurement_store()
        .find_one(existing["id"].as_str().unwrap(), CHILD_ID)
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.value, 23.05);
}

#[tokio::test]
async fn test_duplicate_submission_conflicts() {
    let (app, _state) = test_app();

    let body_fat = json!({
        "type": "body_fat",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 23.05,
        "unit": "%"
    });

    let (status, _) = post_json(app.clone(), &measurements_uri(), body_fat.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, error) = post_json(app, &measurements_uri(), body_fat).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], 409);
    assert!(error["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_non_iso_timestamp_is_rejected() {
    let (app, _state) = test_app();

    let weight = json!({
        "type": "weight",
        "timestamp": "2019",
        "value": 31.4,
        "unit": "kg"
    });

    let (status, error) = post_json(app, &measurements_uri(), weight).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["message"].as_str().unwrap().contains("\"2019\""));
    assert!(error["message"].as_str().unwrap().contains("ISO 8601"));
}

#[tokio::test]
async fn test_unsupported_type_names_allowed_set() {
    let (app, _state) = test_app();

    let reading = json!({
        "type": "heart_rate",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 82.0,
        "unit": "bpm"
    });

    let (status, error) = post_json(app, &measurements_uri(), reading).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error["description"],
        "The allowed types are: weight, body_fat."
    );
}

#[tokio::test]
async fn test_delete_weight_keeps_body_fat_record() {
    let (app, state) = test_app();

    let weight = json!({
        "type": "weight",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 31.4,
        "unit": "kg",
        "body_fat": 21.2
    });
    let (_, created) = post_json(app.clone(), &measurements_uri(), weight).await;
    let id = created["id"].as_str().unwrap();

    let uri = format!("{}/{id}", measurements_uri());
    let (status, _) = delete(app.clone(), &uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(
        state
            .measurement_store()
            .count(CHILD_ID, MeasurementType::Weight)
            .unwrap(),
        0
    );
    assert_eq!(
        state
            .measurement_store()
            .count(CHILD_ID, MeasurementType::BodyFat)
            .unwrap(),
        1
    );

    // deleting again is an idempotent no-op
    let (status, _) = delete(app, &uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_delete_with_malformed_id_is_rejected() {
    let (app, _state) = test_app();

    let uri = format!("{}/not-an-id", measurements_uri());
    let (status, error) = delete(app, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["message"]
        .as_str()
        .unwrap()
        .contains("not a valid measurement id"));
}
