use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use trackify_config::{AppConfig, GpsloggerConfig, ServerConfig};
use trackify_gpslogger::routes::routes;
use trackify_gpslogger::store::{MemoryStore, SnapshotStore, TrackerSnapshot};

const WEBHOOK_ID: &str = "abc123";

fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        server: ServerConfig::default(),
        gpslogger: Some(GpsloggerConfig {
            webhook_id: WEBHOOK_ID.to_string(),
            state_path: None,
        }),
    })
}

fn test_app(store: Arc<MemoryStore>) -> Router {
    routes(test_config(), store)
}

fn webhook_request(webhook_id: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/gpslogger/webhook/{webhook_id}"))
        .header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_webhook_end_to_end() {
    let app = test_app(Arc::new(MemoryStore::new()));

    let response = app
        .clone()
        .oneshot(webhook_request(
            WEBHOOK_ID,
            "device=abc&latitude=10.0&longitude=20.0",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response.into_body()).await,
        "Setting location for abc"
    );

    // tracker state reflects the report, with defaulted accuracy and
    // the battery sentinel surfaced as unknown
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/gpslogger/devices/abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let state: Value =
        serde_json::from_str(&body_string(response.into_body()).await).unwrap();
    assert_eq!(state["latitude"], 10.0);
    assert_eq!(state["longitude"], 20.0);
    assert_eq!(state["gps_accuracy"], 200);
    assert_eq!(state["battery_level"], Value::Null);
    assert_eq!(state["source_type"], "gps");
    assert_eq!(state["device_info"]["name"], "abc");
}

#[tokio::test]
async fn test_webhook_validation_failure_is_422() {
    let store = Arc::new(MemoryStore::new());
    let app = test_app(store.clone());

    let response = app
        .clone()
        .oneshot(webhook_request(WEBHOOK_ID, "device=abc&longitude=20.0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_string(response.into_body()).await.contains("latitude"));

    // nothing was tracked or persisted
    let response = app
        .oneshot(
            Request::builder()
                .uri("/gpslogger/devices")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let devices: Value =
        serde_json::from_str(&body_string(response.into_body()).await).unwrap();
    assert_eq!(devices["devices"], Value::Array(vec![]));
    assert!(store.device_ids().unwrap().is_empty());
}

#[tokio::test]
async fn test_webhook_rejects_bad_coordinates() {
    let app = test_app(Arc::new(MemoryStore::new()));
    for body in [
        "device=abc&latitude=91.0&longitude=20.0",
        "device=abc&latitude=10.0&longitude=220.0",
        "device=abc&latitude=north&longitude=20.0",
    ] {
        let response = app
            .clone()
            .oneshot(webhook_request(WEBHOOK_ID, body))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "payload should be rejected: {body}"
        );
    }
}

#[tokio::test]
async fn test_unknown_webhook_id_is_404() {
    let app = test_app(Arc::new(MemoryStore::new()));
    let response = app
        .oneshot(webhook_request(
            "wrong-id",
            "device=abc&latitude=10.0&longitude=20.0",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_device_ids_deduplicate_after_normalization() {
    let app = test_app(Arc::new(MemoryStore::new()));

    for device in ["a-b-c", "abc"] {
        let response = app
            .clone()
            .oneshot(webhook_request(
                WEBHOOK_ID,
                &format!("device={device}&latitude=10.0&longitude=20.0"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/gpslogger/devices")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let devices: Value =
        serde_json::from_str(&body_string(response.into_body()).await).unwrap();
    assert_eq!(devices["devices"], serde_json::json!(["abc"]));
}

#[tokio::test]
async fn test_out_of_order_reports_do_not_regress_state() {
    let app = test_app(Arc::new(MemoryStore::new()));

    let first = "device=abc&latitude=10.0&longitude=20.0&last_seen=2024-01-01T12:00:00Z";
    let stale = "device=abc&latitude=99.0&longitude=99.0&last_seen=2024-01-01T11:00:00Z";
    for body in [first, stale] {
        let response = app
            .clone()
            .oneshot(webhook_request(WEBHOOK_ID, body))
            .await
            .unwrap();
        // a stale report is still a 200; it is discarded, not an error
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/gpslogger/devices/abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let state: Value =
        serde_json::from_str(&body_string(response.into_body()).await).unwrap();
    assert_eq!(state["latitude"], 10.0);
}

#[tokio::test]
async fn test_restore_from_persisted_state() {
    let store = Arc::new(MemoryStore::new());
    store
        .save(
            "abc",
            &TrackerSnapshot {
                latitude: Some(1.0),
                longitude: Some(2.0),
                gps_accuracy: Some(5.0),
                battery_level: Some(80.0),
                last_seen: Some("2024-01-01T00:00:00+00:00".to_string()),
                ..TrackerSnapshot::default()
            },
        )
        .unwrap();

    // simulates a process restart: a fresh router over the same store
    let app = test_app(store);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/gpslogger/devices/abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let state: Value =
        serde_json::from_str(&body_string(response.into_body()).await).unwrap();
    assert_eq!(state["latitude"], 1.0);
    assert_eq!(state["longitude"], 2.0);
    assert_eq!(state["gps_accuracy"], 5);
    assert_eq!(state["battery_level"], 80);
    assert_eq!(state["attributes"]["last_seen"], "2024-01-01T00:00:00Z");
}

#[tokio::test]
async fn test_unknown_device_is_404() {
    let app = test_app(Arc::new(MemoryStore::new()));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/gpslogger/devices/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
