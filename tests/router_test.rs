//! HTTP boundary: authentication, role gating, validation envelopes and
//! per-company rate limiting.
//!
//! Run with: cargo test --test router_test

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use chrono::Duration;
use flowboard::auth::Role;
use flowboard::common::AppState;
use flowboard::config::Config;
use flowboard::routes::build_router;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

fn state(extra: &[(&str, &str)]) -> AppState {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://mock".to_string()),
        "JWT_SECRET" => Some("router-test-secret".to_string()),
        other => extra
            .iter()
            .find(|(k, _)| *k == other)
            .map(|(_, v)| (*v).to_string()),
    })
    .unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    AppState::new(db, config)
}

fn app() -> (Router, AppState) {
    let state = state(&[("DISABLE_RATE_LIMITING", "true")]);
    (build_router(state.clone()).unwrap(), state)
}

fn token(state: &AppState, company_id: Uuid, role: Role) -> String {
    state
        .authenticator
        .issue_token(Uuid::new_v4(), company_id, role, Duration::minutes(5))
        .unwrap()
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, bearer: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn healthz_needs_no_token() {
    let (app, _) = app();
    let (status, _) = send(&app, get("/healthz", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/api/user-dashboard", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({"success": false, "message": "Missing authorization token"})
    );
}

#[tokio::test]
async fn forged_token_is_unauthorized() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/api/user-dashboard", Some("not.a.jwt"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Invalid or expired token"));
}

#[tokio::test]
async fn users_cannot_create_widgets() {
    let (app, state) = app();
    let bearer = token(&state, Uuid::new_v4(), Role::User);

    let (status, body) = send(&app, post_json("/api/create-widget", &bearer, &json!({}))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({"success": false, "message": "Only admins can create widgets"})
    );
}

#[tokio::test]
async fn users_cannot_browse_device_types() {
    let (app, state) = app();
    let bearer = token(&state, Uuid::new_v4(), Role::User);

    let (status, body) = send(&app, get("/api/device-types", Some(&bearer))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn missing_body_fields_are_listed() {
    let (app, state) = app();
    let bearer = token(&state, Uuid::new_v4(), Role::Admin);

    let (status, body) = send(
        &app,
        post_json("/api/create-widget", &bearer, &json!({"deviceTypeId": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("widgetTypeId, propertyIds, displayName are required")
    );

    let (status, body) = send(&app, post_json("/api/update-layout", &bearer, &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("layouts is required"));
}

#[tokio::test]
async fn malformed_json_uses_the_envelope() {
    let (app, state) = app();
    let bearer = token(&state, Uuid::new_v4(), Role::Admin);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/add-to-dashboard")
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn invalid_layout_is_rejected_before_any_query() {
    let (app, state) = app();
    let bearer = token(&state, Uuid::new_v4(), Role::Admin);

    let body = json!({
        "widgetDefinitionId": Uuid::new_v4(),
        "layoutConfig": {"x": 0, "y": 0, "w": 0, "h": 2}
    });
    let (status, _) = send(&app, post_json("/api/add-to-dashboard", &bearer, &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn available_widgets_requires_device_type() {
    let (app, state) = app();
    let bearer = token(&state, Uuid::new_v4(), Role::User);

    let (status, body) = send(&app, get("/api/available-widgets", Some(&bearer))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("deviceTypeId is required"));

    let (status, _) = send(
        &app,
        get("/api/available-widgets?deviceTypeId=pumps", Some(&bearer)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn widget_data_validates_filters_and_ids() {
    let (app, state) = app();
    let bearer = token(&state, Uuid::new_v4(), Role::User);

    let (status, _) = send(
        &app,
        get("/api/widget-data/some-widget?limit=0", Some(&bearer)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/widget-data/nonexistent-id", Some(&bearer))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Widget 'nonexistent-id' not found"));

    let (status, _) = send(
        &app,
        get("/api/widget-data/nonexistent-id/latest", Some(&bearer)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_layout_id_is_not_found() {
    let (app, state) = app();
    let bearer = token(&state, Uuid::new_v4(), Role::Admin);

    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/api/remove-widget/layout-1")
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Layout not found"));
}

#[tokio::test]
async fn rate_limit_buckets_are_per_company() {
    let state = state(&[
        ("RATE_LIMIT_DATA_PER_SECOND", "60"),
        ("RATE_LIMIT_DATA_BURST", "1"),
    ]);
    let app = build_router(state.clone()).unwrap();
    let first = token(&state, Uuid::new_v4(), Role::User);
    let second = token(&state, Uuid::new_v4(), Role::User);

    // Unparseable widget ids resolve without touching the store
    let uri = "/api/widget-data/nonexistent-id";
    let (status, _) = send(&app, get(uri, Some(&first))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get(uri, Some(&first))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = send(&app, get(uri, Some(&second))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
