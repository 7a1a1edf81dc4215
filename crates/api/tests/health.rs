//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::header::HOST;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use sqlx::SqlitePool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../db/migrations")]
async fn health_check_returns_ok_with_json(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_route_returns_404(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn response_contains_x_request_id_header(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert!(response.headers().contains_key("x-request-id"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cors_preflight_allows_configured_origin(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/listings")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn disallowed_host_is_rejected(pool: SqlitePool) {
    let mut config = common::test_config();
    config.allowed_hosts = vec!["api.staybook.test".to_string()];
    let app = common::build_app_with_config(pool, config);

    let request = |host: &str| {
        Request::builder()
            .uri("/health")
            .header(HOST, host)
            .body(Body::empty())
            .unwrap()
    };

    let allowed = app.clone().oneshot(request("api.staybook.test:8000")).await.unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);

    let rejected = app.oneshot(request("evil.example")).await.unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    let json = body_json(rejected).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}
