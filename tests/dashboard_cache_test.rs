//! Dashboard cache: invalidation ordering against concurrent composition,
//! and invalidation on failed mutations.
//!
//! Run with: cargo test --test dashboard_cache_test

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::{Duration, Utc};
use flowboard::auth::Role;
use flowboard::common::AppState;
use flowboard::config::Config;
use flowboard::entity::{dashboard_layouts, dashboards};
use flowboard::routes::build_router;
use flowboard::services::dashboard::{
    DashboardSummary, DashboardView, cache_epoch, cache_view, compose_dashboard, invalidate,
    load_dashboard,
};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn state_with(db: MockDatabase) -> AppState {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://mock".to_string()),
        "JWT_SECRET" => Some("cache-test-secret".to_string()),
        "DISABLE_RATE_LIMITING" => Some("true".to_string()),
        _ => None,
    })
    .unwrap();
    AppState::new(db.into_connection(), config)
}

fn board(id: Uuid, company_id: Uuid, version: i32) -> dashboards::Model {
    dashboards::Model {
        id,
        company_id,
        name: "Arabco Operations".to_string(),
        description: None,
        created_by: None,
        is_active: true,
        grid_config: json!({"cols": 12}),
        version,
        created_at: (Utc::now() - Duration::hours(10)).fixed_offset(),
        updated_at: None,
    }
}

fn view(version: i32) -> Arc<DashboardView> {
    Arc::new(DashboardView {
        dashboard: DashboardSummary {
            id: Uuid::new_v4(),
            name: "Arabco Operations".to_string(),
            description: None,
            is_active: true,
            grid_config: json!({}),
            version,
            created_at: Utc::now(),
        },
        widgets: Vec::new(),
    })
}

#[tokio::test]
async fn view_composed_before_invalidation_is_not_cached() {
    let company = Uuid::new_v4();
    let state = state_with(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[board(Uuid::new_v4(), company, 1)]])
            .append_query_results([Vec::<dashboard_layouts::Model>::new()]),
    );

    // Reader reads the store, then a writer commits and invalidates
    let epoch = cache_epoch(&state);
    let composed = compose_dashboard(&state.db, company).await.unwrap();
    invalidate(&state, company).await;

    let stored = cache_view(&state, company, epoch, Arc::new(composed)).await;

    assert!(!stored);
    assert!(state.dashboard_cache.get(&company).await.is_none());
}

#[tokio::test]
async fn view_composed_after_invalidation_is_cached() {
    let company = Uuid::new_v4();
    let state = state_with(MockDatabase::new(DatabaseBackend::Postgres));

    invalidate(&state, company).await;
    let epoch = cache_epoch(&state);

    assert!(cache_view(&state, company, epoch, view(2)).await);
    let cached = state.dashboard_cache.get(&company).await.unwrap();
    assert_eq!(cached.dashboard.version, 2);
}

#[tokio::test]
async fn load_serves_from_cache_until_invalidated() {
    let company = Uuid::new_v4();
    let dashboard_id = Uuid::new_v4();
    let state = state_with(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[board(dashboard_id, company, 1)]])
            .append_query_results([Vec::<dashboard_layouts::Model>::new()])
            .append_query_results([[board(dashboard_id, company, 2)]])
            .append_query_results([Vec::<dashboard_layouts::Model>::new()]),
    );

    let first = load_dashboard(&state, company).await.unwrap();
    assert_eq!(first.dashboard.version, 1);

    // Cache hit: the second scripted version is not read yet
    let again = load_dashboard(&state, company).await.unwrap();
    assert_eq!(again.dashboard.version, 1);

    invalidate(&state, company).await;
    let fresh = load_dashboard(&state, company).await.unwrap();
    assert_eq!(fresh.dashboard.version, 2);
}

#[tokio::test]
async fn failed_mutation_still_invalidates() {
    let company = Uuid::new_v4();
    // No scripted results: the layout lookup fails inside the transaction
    let state = state_with(MockDatabase::new(DatabaseBackend::Postgres));
    let app = build_router(state.clone()).unwrap();

    state.dashboard_cache.insert(company, view(1)).await;
    let epoch = cache_epoch(&state);

    let bearer = state
        .authenticator
        .issue_token(Uuid::new_v4(), company, Role::Admin, Duration::minutes(5))
        .unwrap();
    let req = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/remove-widget/{}", Uuid::new_v4()))
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(state.dashboard_cache.get(&company).await.is_none());
    assert!(cache_epoch(&state) > epoch);
}
