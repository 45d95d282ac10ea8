//! Integration tests for the HTTP endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` without
//! binding a TCP listener.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use hazard_core::config::DispatchConfig;
use hazard_core::dispatch::Dispatcher;
use hazard_geo::ZoneSet;
use hazard_observer::router::build_router;
use hazard_observer::state::{AppState, CycleBroadcast};
use hazard_sim::operator::OperatorState;
use hazard_types::{HazardEvent, HazardEventId, HazardKind, Phase, Severity};
use serde_json::Value;
use tower::ServiceExt;

fn dispatcher() -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(&DispatchConfig::default(), ZoneSet::coastal()))
}

fn make_state() -> Arc<AppState> {
    Arc::new(AppState::new(dispatcher()))
}

fn make_operated_state() -> (Arc<AppState>, Arc<OperatorState>) {
    let operator = Arc::new(OperatorState::new(5000, 0));
    let state = Arc::new(AppState::with_operator(dispatcher(), Arc::clone(&operator)));
    (state, operator)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn quake(message: &str) -> HazardEvent {
    HazardEvent {
        id: HazardEventId::new(),
        timestamp: Utc::now(),
        kind: HazardKind::Earthquake,
        severity: Severity::High,
        message: message.to_owned(),
        latitude: 31.2,
        longitude: 77.4,
        location: "Shimla".to_owned(),
        distance_km: 1220.5,
        forced: false,
    }
}

// =========================================================================
// Status page
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let response = build_router(make_state()).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

// =========================================================================
// Ingestion
// =========================================================================

#[tokio::test]
async fn test_ingest_reference_report() {
    let response = build_router(make_state())
        .oneshot(post_json(
            "/ingest",
            r#"{"latitude":13.0,"longitude":80.3,"affected_people":900,"intensity":0.9}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "processed");
    assert!((json["density"].as_f64().unwrap() - 0.81).abs() < 1e-9);
}

#[tokio::test]
async fn test_ingest_declared_report() {
    let response = build_router(make_state())
        .oneshot(post_json(
            "/ingest",
            r#"{"latitude":19.8,"longitude":85.8,"affected_people":400,
                "disaster_type":"Cyclone","severity":"high","place":"Puri"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!((json["density"].as_f64().unwrap() - 0.36).abs() < 1e-9);
}

#[tokio::test]
async fn test_ingest_missing_field_is_unprocessable() {
    let response = build_router(make_state())
        .oneshot(post_json("/ingest", r#"{"latitude":13.0,"affected_people":900}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_ingest_out_of_range_latitude_is_bad_request() {
    let response = build_router(make_state())
        .oneshot(post_json(
            "/ingest",
            r#"{"latitude":91.0,"longitude":80.3,"affected_people":10}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("latitude"));
}

#[tokio::test]
async fn test_ingest_unknown_severity_is_bad_request() {
    let response = build_router(make_state())
        .oneshot(post_json(
            "/ingest",
            r#"{"latitude":13.0,"longitude":80.3,"affected_people":10,
                "disaster_type":"Cyclone","severity":"apocalyptic"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =========================================================================
// Queries
// =========================================================================

#[tokio::test]
async fn test_events_empty_then_recorded() {
    let state = make_state();

    let response = build_router(Arc::clone(&state))
        .oneshot(get("/events"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await, serde_json::json!([]));

    state
        .record(CycleBroadcast {
            cycle: 7,
            phase: Phase::Event,
            stress: 18.4,
            events: vec![quake("M7.4 earthquake near Shimla")],
            gap_counters: BTreeMap::from([(HazardKind::Tsunami, 2), (HazardKind::Landslide, 0)]),
            model_failures: Vec::new(),
            published_at: Utc::now(),
        })
        .await;

    let response = build_router(Arc::clone(&state))
        .oneshot(get("/events"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    let events = json.as_array().unwrap();
    assert_eq!(events.len(), 1);
    let event = events.first().unwrap();
    assert_eq!(event["kind"], "earthquake");
    assert_eq!(event["severity"], "HIGH");
    assert_eq!(event["location"], "Shimla");

    let response = build_router(state).oneshot(get("/api/status")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cycle"], 7);
    assert_eq!(json["phase"], "EVENT");
    assert_eq!(json["gap_counters"]["tsunami"], 2);
}

#[tokio::test]
async fn test_status_reflects_track_and_subscribers() {
    let state = make_state();
    let (_id, _rx) = state.dispatcher.groups().monitor.subscribe(8).await;

    let response = build_router(Arc::clone(&state))
        .oneshot(post_json(
            "/ingest",
            r#"{"latitude":13.0,"longitude":80.3,"affected_people":900,"intensity":0.9}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = build_router(state).oneshot(get("/api/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["track"]["active"], true);
    assert_eq!(json["track"]["positions"], 1);
    assert_eq!(json["subscribers"]["monitor"], 1);
    assert_eq!(json["subscribers"]["civilian"], 0);
    assert_eq!(json["pending_civilian_alerts"], 1);
    assert!(json["cycle"].is_null());
}

// =========================================================================
// Operator
// =========================================================================

#[tokio::test]
async fn test_operator_unavailable_without_simulation() {
    let response = build_router(make_state())
        .oneshot(post_empty("/api/operator/pause"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_operator_pause_resume() {
    let (state, operator) = make_operated_state();

    let response = build_router(Arc::clone(&state))
        .oneshot(post_empty("/api/operator/pause"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(operator.is_paused());

    let response = build_router(Arc::clone(&state))
        .oneshot(get("/api/operator/status"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["paused"], true);
    assert_eq!(json["tick_interval_ms"], 5000);

    let response = build_router(state)
        .oneshot(post_empty("/api/operator/resume"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!operator.is_paused());
}

#[tokio::test]
async fn test_operator_speed() {
    let (state, operator) = make_operated_state();

    let response = build_router(Arc::clone(&state))
        .oneshot(post_json("/api/operator/speed", r#"{"tick_interval_ms":50}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(operator.tick_interval_ms(), 5000);

    let response = build_router(state)
        .oneshot(post_json("/api/operator/speed", r#"{"tick_interval_ms":750}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["previous_interval_ms"], 5000);
    assert_eq!(operator.tick_interval_ms(), 750);
}

#[tokio::test]
async fn test_operator_stop() {
    let (state, operator) = make_operated_state();

    let response = build_router(state)
        .oneshot(post_empty("/api/operator/stop"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(operator.is_stop_requested());
}

// =========================================================================
// Simulation stream
// =========================================================================

#[tokio::test]
async fn test_broadcast_channel() {
    let state = make_state();
    let mut rx = state.subscribe();

    let summary = CycleBroadcast {
        cycle: 3,
        phase: Phase::Buildup,
        stress: 41.0,
        events: Vec::new(),
        gap_counters: BTreeMap::new(),
        model_failures: vec![HazardKind::Tsunami],
        published_at: Utc::now(),
    };
    assert_eq!(state.broadcast(&summary), 1);

    let received = rx.recv().await.unwrap();
    assert_eq!(received.cycle, 3);
    assert_eq!(received.model_failures, vec![HazardKind::Tsunami]);
}
