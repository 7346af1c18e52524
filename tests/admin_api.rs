//! REST surface tests driven through the full middleware stack.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::test_app;

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), None);

    let (status, body) = send(&app.router, get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["routes"], 0);
    assert_eq!(body["sources"], 0);
}

#[tokio::test]
async fn test_route_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), None);

    let route = json!({ "name": "blog", "path": "blog", "target": "http://blog:8000", "strip_prefix": true });
    let (status, body) = send(&app.router, post_json("/api/v1/routes", &route)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ok"], true);
    assert_eq!(body["message"], "Route added and nginx reloaded");
    assert_eq!(body["route"]["path"], "/blog/");
    assert!(body.get("warning").is_none());

    let (status, body) = send(&app.router, get("/api/v1/routes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["routes"][0]["name"], "blog");

    let (status, body) = send(&app.router, get("/api/v1/routes/blog")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["target"], "http://blog:8000");

    let (status, body) = send(&app.router, delete("/api/v1/routes/blog")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], "blog");
    assert_eq!(body["message"], "Route deleted and nginx reloaded");

    let (status, body) = send(&app.router, get("/api/v1/routes/blog")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["ok"], false);

    assert_eq!(app.route_reload.calls(), 2);
    assert_eq!(app.source_reload.calls(), 0);
}

#[tokio::test]
async fn test_delete_unknown_route_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), None);

    let (status, body) = send(&app.router, delete("/api/v1/routes/ghost")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("ghost"));
    assert_eq!(app.route_reload.calls(), 0);
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), None);

    let (status, body) = send(
        &app.router,
        post_json("/api/v1/routes", &json!({ "name": "blog", "path": "/blog" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("target"));
    assert!(app.state.routes.is_empty());
}

#[tokio::test]
async fn test_reserved_and_unsafe_names_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), None);

    let route = json!({ "name": "reload", "path": "/reload", "target": "http://r:80" });
    let (status, body) = send(&app.router, post_json("/api/v1/routes", &route)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("reserved"));

    let source = json!({ "name": "reload", "path": "/var/log/r.log" });
    let (status, _) = send(&app.router, post_json("/api/v1/logs/sources", &source)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let route = json!({ "name": "a?x", "path": "/a", "target": "http://a:80" });
    let (status, _) = send(&app.router, post_json("/api/v1/routes", &route)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(app.state.routes.is_empty());
    assert!(app.state.sources.is_empty());
    assert_eq!(app.route_reload.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), None);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/routes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), None);

    let padding = "x".repeat(2 * 1024 * 1024);
    let route = json!({ "name": "big", "path": "/big", "target": padding });
    let (status, _) = send(&app.router, post_json("/api/v1/routes", &route)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.state.routes.is_empty());
}

#[tokio::test]
async fn test_reload_failure_is_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), None);
    app.route_reload.set_failing(true);

    let route = json!({ "name": "api", "path": "/api", "target": "http://api:3000" });
    let (status, body) = send(&app.router, post_json("/api/v1/routes", &route)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Route added");
    assert!(body["warning"]
        .as_str()
        .unwrap()
        .starts_with("Config saved but nginx reload failed"));
    assert!(app.state.routes.get("api").is_some());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/routes/reload")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], false);

    app.route_reload.set_failing(false);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/routes/reload")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "nginx reloaded");
}

#[tokio::test]
async fn test_log_source_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), None);

    let source = json!({
        "name": "app",
        "path": "/var/log/app/*.log",
        "labels": { "environment": "prod" },
        "multiline": { "first_line": "^\\d{4}-\\d{2}-\\d{2}", "max_lines": 50 }
    });
    let (status, body) = send(&app.router, post_json("/api/v1/logs/sources", &source)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Log source added and promtail reloaded");
    assert_eq!(body["source"]["labels"]["environment"], "prod");

    let (_, body) = send(&app.router, get("/api/v1/logs/sources")).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["sources"][0]["multiline"]["max_lines"], 50);

    let (status, _) = send(&app.router, delete("/api/v1/logs/sources/app")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.source_reload.calls(), 2);
    assert_eq!(app.route_reload.calls(), 0);
}

#[tokio::test]
async fn test_relative_log_path_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), None);

    let source = json!({ "name": "app", "path": "logs/*.log" });
    let (status, body) = send(&app.router, post_json("/api/v1/logs/sources", &source)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("path"));
}

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), Some("s3cret"));

    let (status, body) = send(&app.router, get("/api/v1/routes")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], false);

    let request = Request::builder()
        .uri("/api/v1/routes")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/v1/routes")
        .header(header::AUTHORIZATION, "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    // Health stays open for probes.
    let (status, _) = send(&app.router, get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), None);

    let response = app
        .router
        .clone()
        .oneshot(get("/api/v1/health"))
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
