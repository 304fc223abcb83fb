//! Integration tests for the cascade reaction to fleet deletion events.

use serde_json::json;
use shared::chrono::Utc;
use shared::messaging::EventBus;
use shared::models::{routing, IntegrationEvent, MeasurementType};
use shared::storage::{
    Activity, ActivityStore, EnvironmentReading, EnvironmentStore, MeasurementStore, SleepRecord,
    SleepStore,
};

use super::common::{measurements_uri, post_json, test_app, CHILD_ID};

const INSTITUTION_ID: &str = "6b73cf18ef45611257ead655";

#[tokio::test]
async fn test_child_deleted_event_clears_every_dependent_aggregate() {
    let (app, state) = test_app();

    state
        .activity_store()
        .insert(Activity::new("walk", Utc::now(), 1_800_000, CHILD_ID))
        .unwrap();
    state
        .sleep_store()
        .insert(SleepRecord::new(Utc::now(), 28_800_000, CHILD_ID))
        .unwrap();
    let weight = json!({
        "type": "weight",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 31.4,
        "unit": "kg",
        "body_fat": 21.2
    });
    post_json(app, &measurements_uri(), weight).await;

    let event = IntegrationEvent::new("ChildDeleted", "child")
        .with_payload("child", json!({"id": CHILD_ID}));
    assert!(state.bus().publish(&event, routing::CHILD_DELETED));

    assert_eq!(state.activity_store().count_for_child(CHILD_ID).unwrap(), 0);
    assert_eq!(state.sleep_store().count_for_child(CHILD_ID).unwrap(), 0);
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
        0
    );
}

#[tokio::test]
async fn test_invalid_owner_id_leaves_records_untouched() {
    let (app, state) = test_app();

    let weight = json!({
        "type": "weight",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 31.4,
        "unit": "kg"
    });
    post_json(app, &measurements_uri(), weight).await;

    let event = IntegrationEvent::new("ChildDeleted", "child")
        .with_payload("child", json!({"id": "not-an-id"}));
    state.bus().publish(&event, routing::CHILD_DELETED);

    assert_eq!(
        state
            .measurement_store()
            .count(CHILD_ID, MeasurementType::Weight)
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_institution_deleted_event_clears_environment_readings() {
    let (_app, state) = test_app();

    state
        .environment_store()
        .insert(EnvironmentReading::new(
            "room 3",
            Utc::now(),
            22.5,
            48.0,
            INSTITUTION_ID,
        ))
        .unwrap();

    let event = IntegrationEvent::new("InstitutionDeleted", "institution")
        .with_payload("institution", json!({"id": INSTITUTION_ID}));
    state.bus().publish(&event, routing::INSTITUTION_DELETED);

    assert_eq!(
        state
            .environment_store()
            .count_for_institution(INSTITUTION_ID)
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_child_deletion_does_not_touch_other_children() {
    let (app, state) = test_app();
    let other_child = "5a62be07de34500146d9c545";

    let weight = json!({
        "type": "weight",
        "timestamp": "2018-12-14T12:52:59Z",
        "value": 31.4,
        "unit": "kg"
    });
    post_json(app.clone(), &measurements_uri(), weight.clone()).await;
    post_json(
        app,
        &format!("/v1/children/{other_child}/measurements"),
        weight,
    )
    .await;

    let event = IntegrationEvent::new("ChildDeleted", "child")
        .with_payload("child", json!({"id": CHILD_ID}));
    state.bus().publish(&event, routing::CHILD_DELETED);

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
            .count(other_child, MeasurementType::Weight)
            .unwrap(),
        1
    );
}
