mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::{Harness, T0};
use serde_json::{json, Value};
use studytrack_lib::api::{router, AppState};
use tower::ServiceExt;

fn app(h: &Harness) -> Router {
    router(AppState::new(h.timer.clone()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_reports_service() {
    let h = Harness::new();
    let (status, body) = send(&app(&h), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["service"], "studytrack");
}

#[tokio::test]
async fn full_session_lifecycle() {
    let h = Harness::new();
    let app = app(&h);

    let (status, body) = send(
        &app,
        "POST",
        "/api/start",
        Some(json!({"name": " Calculus ", "tags": "math,  exam"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["session"]["name"], "Calculus");
    assert_eq!(body["session"]["tags"], "math, exam");
    let id = body["session"]["id"].as_i64().unwrap();

    h.clock.set(T0 + 100);
    let (status, body) = send(&app, "POST", "/api/pause", Some(json!({"session_id": id}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "paused");

    h.clock.set(T0 + 140);
    let (_, body) = send(&app, "POST", "/api/resume", Some(json!({"session_id": id}))).await;
    assert_eq!(body["status"], "running");

    h.clock.set(T0 + 150);
    let (_, body) = send(&app, "GET", "/api/status", None).await;
    assert_eq!(body["running"], true);
    assert_eq!(body["status"], "running");
    assert_eq!(body["elapsed"], 110);
    assert_eq!(body["elapsed_str"], "00:01:50");
    assert_eq!(body["session"]["id"], id);

    h.clock.set(T0 + 200);
    let (status, body) = send(&app, "POST", "/api/stop", Some(json!({"session_id": id}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duration"], 160);
    assert_eq!(body["duration_str"], "00:02:40");
    assert_eq!(body["total_break"], 40);

    let (_, body) = send(&app, "GET", "/api/status", None).await;
    assert_eq!(body["running"], false);
    assert_eq!(body["status"], "idle");

    let (_, body) = send(&app, "GET", "/api/recent", None).await;
    assert_eq!(body["sessions"][0]["id"], id);
    assert_eq!(body["sessions"][0]["duration_str"], "00:02:40");

    let (_, body) = send(&app, "GET", "/api/tags", None).await;
    assert_eq!(body["tags"], json!(["exam", "math"]));
}

#[tokio::test]
async fn start_errors_map_to_status_codes() {
    let h = Harness::new();
    let app = app(&h);

    let (status, body) = send(&app, "POST", "/api/start", Some(json!({"name": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["field"], "name");

    send(&app, "POST", "/api/start", Some(json!({"name": "First"}))).await;
    let (status, body) = send(&app, "POST", "/api/start", Some(json!({"name": "Second"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn missing_session_id_is_a_validation_error() {
    let h = Harness::new();
    let app = app(&h);

    for uri in ["/api/pause", "/api/resume", "/api/stop", "/api/session/delete"] {
        let (status, body) = send(&app, "POST", uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["field"], "session_id", "{uri}");
    }
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let h = Harness::new();
    let app = app(&h);

    let (status, body) = send(&app, "POST", "/api/stop", Some(json!({"session_id": 42}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = send(&app, "GET", "/api/session/42/summary", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/session/abc/summary", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_summary_groups_activity() {
    let h = Harness::new();
    let app = app(&h);

    let (_, body) = send(&app, "POST", "/api/start", Some(json!({"name": "Reading"}))).await;
    let id = body["session"]["id"].as_i64().unwrap();
    h.wait_for_samples(id, 1).await;

    h.clock.advance(90);
    send(&app, "POST", "/api/stop", Some(json!({"session_id": id}))).await;

    let (status, body) = send(&app, "GET", &format!("/api/session/{id}/summary"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["id"], id);
    assert_eq!(body["session"]["running"], false);
    assert_eq!(body["session"]["duration_str"], "00:01:30");
    assert_eq!(body["session"]["sample_count"], 1);
    assert_eq!(body["top_apps"][0]["app_name"], "kitty");
    assert_eq!(body["activity"][0]["window_title"], "nvim");
}

#[tokio::test]
async fn all_sessions_filters_by_name_and_tag() {
    let h = Harness::new();
    let app = app(&h);

    for (name, tags) in [("Linear algebra", "math"), ("Poetry", "lit"), ("Algebra II", "math, exam")] {
        let (_, body) = send(&app, "POST", "/api/start", Some(json!({"name": name, "tags": tags}))).await;
        h.clock.advance(60);
        let id = body["session"]["id"].clone();
        send(&app, "POST", "/api/stop", Some(json!({"session_id": id}))).await;
    }

    let (_, body) = send(&app, "GET", "/api/all_sessions?name=algebra", None).await;
    assert_eq!(body["sessions"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, "GET", "/api/all_sessions?tag=exam", None).await;
    assert_eq!(body["sessions"].as_array().unwrap().len(), 1);
    assert_eq!(body["sessions"][0]["name"], "Algebra II");

    let (_, body) = send(&app, "GET", "/api/all_sessions", None).await;
    assert_eq!(body["sessions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn delete_removes_session() {
    let h = Harness::new();
    let app = app(&h);

    let (_, body) = send(&app, "POST", "/api/start", Some(json!({"name": "Temp"}))).await;
    let id = body["session"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, "POST", "/api/session/delete", Some(json!({"session_id": id}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], id);

    let (_, body) = send(&app, "GET", "/api/recent", None).await;
    assert!(body["sessions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn analytics_summary_is_dense_and_validated() {
    let h = Harness::new();
    let app = app(&h);

    let (_, body) = send(&app, "POST", "/api/start", Some(json!({"name": "Stats", "tags": "math"}))).await;
    let id = body["session"]["id"].as_i64().unwrap();
    h.clock.advance(600);
    send(&app, "POST", "/api/stop", Some(json!({"session_id": id}))).await;

    let (status, body) = send(&app, "GET", "/api/analytics/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overview"]["total_sessions"], 1);
    assert_eq!(body["overview"]["total_duration"], 600);
    assert_eq!(body["top_tags"][0]["tag"], "math");

    let daily = body["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 7);
    let total: i64 = daily.iter().map(|day| day["seconds"].as_i64().unwrap()).sum();
    assert_eq!(total, 600);

    let (_, body) = send(&app, "GET", "/api/analytics/summary?tag=history", None).await;
    assert_eq!(body["overview"]["total_sessions"], 0);

    let (status, body) = send(
        &app,
        "GET",
        "/api/analytics/summary?range_type=custom&start_date=2024-02-01&end_date=2024-01-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "start_date");

    let (status, _) = send(&app, "GET", "/api/analytics/summary?range_type=hourly", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
