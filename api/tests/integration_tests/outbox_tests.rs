//! Integration tests for the event outbox during a bus outage.

use axum::http::StatusCode;
use serde_json::json;
use shared::storage::OutboxStore;

use super::common::{delete, measurements_uri, post_json, test_app};

#[tokio::test]
async fn test_create_succeeds_and_defers_event_while_bus_is_down() {
    let (app, state) = test_app();
    state.bus().set_connected(false);

    let weight = json!({
        "type": "weight",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 31.4,
        "unit": "kg"
    });

    let (status, created) = post_json(app, &measurements_uri(), weight).await;

    // the write path must not fail with the broker unreachable
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].is_string());

    let pending = state.outbox_store().list_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].operation, "publish");
    assert_eq!(pending[0].routing_key, "measurements.weight.created");
    assert_eq!(pending[0].event_name, "WeightCreated");
    assert_eq!(pending[0].payload["weight"]["value"], 31.4);
}

#[tokio::test]
async fn test_delete_defers_event_while_bus_is_down() {
    let (app, state) = test_app();

    let weight = json!({
        "type": "weight",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 31.4,
        "unit": "kg"
    });
    let (_, created) = post_json(app.clone(), &measurements_uri(), weight).await;
    let id = created["id"].as_str().unwrap();

    state.bus().set_connected(false);
    let uri = format!("{}/{id}", measurements_uri());
    let (status, _) = delete(app, &uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let pending = state.outbox_store().list_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].routing_key, "measurements.weight.deleted");
    assert_eq!(pending[0].payload["weight"]["id"], id);
}

#[tokio::test]
async fn test_recovered_bus_publishes_live_again() {
    let (app, state) = test_app();
    state.bus().set_connected(false);

    let first = json!({
        "type": "weight",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 31.4,
        "unit": "kg"
    });
    post_json(app.clone(), &measurements_uri(), first).await;
    assert_eq!(state.outbox_store().count().unwrap(), 1);

    state.bus().set_connected(true);
    let second = json!({
        "type": "weight",
        "timestamp": "2018-12-15T12:52:59Z",
        "value": 31.6,
        "unit": "kg"
    });
    let (status, _) = post_json(app, &measurements_uri(), second).await;
    assert_eq!(status, StatusCode::CREATED);

    // the new event went out live; only the outage-time event is parked
    assert_eq!(state.bus().published().len(), 1);
    assert_eq!(state.outbox_store().count().unwrap(), 1);
}
