pub mod dashboard;
pub mod health;
pub mod widget_data;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_scalar::{Scalar, Servable};

use crate::auth::require_auth;
use crate::common::AppState;
use crate::config::ConfigError;
use crate::error::{AppError, AppResult};
use crate::services::rate_limit::TenantKeyExtractor;
use crate::services::{dashboard as dashboard_service, latest, widget_data as series, widgets};
use crate::widget;

/// Run a resolver future under the request deadline.
///
/// # Errors
///
/// Returns `AppError::Timeout` when `deadline` elapses first, otherwise the
/// future's own result.
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| AppError::Timeout(deadline))?
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        dashboard::user_dashboard,
        dashboard::list_available_widgets,
        dashboard::list_device_types,
        dashboard::create_widget_definition,
        dashboard::add_widget_to_dashboard,
        dashboard::remove_widget,
        dashboard::update_layout,
        widget_data::get_widget_data,
        widget_data::get_widget_latest,
    ),
    components(
        schemas(
            dashboard::UserDashboardResponse,
            dashboard::CreateWidgetRequest,
            dashboard::CreateWidgetResponse,
            dashboard::AddToDashboardRequest,
            dashboard::AddToDashboardResponse,
            dashboard::LayoutUpdate,
            dashboard::UpdateLayoutRequest,
            dashboard_service::DashboardSummary,
            dashboard_service::WidgetView,
            widgets::AvailableWidgets,
            widgets::DeviceTypeCatalog,
            widgets::DeviceTypeEntry,
            widgets::WidgetTypeResponse,
            widgets::PropertyResponse,
            series::WidgetData,
            series::SeriesData,
            series::SeriesPoint,
            latest::LatestData,
            latest::LatestSeries,
            latest::LatestPoint,
            widget::FilterEcho,
            widget::TimeRange,
            widget::LayoutConfig,
            widget::SeriesConfig,
            widget::WidgetKind,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "dashboard", description = "Company dashboard and widget placement"),
        (name = "widgets", description = "Widget catalog and definitions"),
        (name = "widget-data", description = "Time-series and latest values per widget"),
    ),
    info(
        title = "Flowboard API",
        description = "Multi-tenant widget dashboards over device telemetry",
        version = "0.1.0"
    )
)]
struct ApiDoc;

/// Assemble the HTTP application.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` when a rate-limit quota is zero.
pub fn build_router(state: AppState) -> Result<Router, ConfigError> {
    let config = Arc::clone(&state.config);

    if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
    } else {
        tracing::info!(
            data_rate = %format!("{}/s burst {}", config.rate_limit_data_per_second, config.rate_limit_data_burst),
            admin_rate = %format!("{}/s burst {}", config.rate_limit_admin_per_second, config.rate_limit_admin_burst),
            "Rate limiting configured"
        );
    }

    let data_routes_base = Router::new()
        .route("/widget-data/{widget_id}", get(widget_data::get_widget_data))
        .route(
            "/widget-data/{widget_id}/latest",
            get(widget_data::get_widget_latest),
        );

    let dashboard_routes_base = Router::new()
        .route("/user-dashboard", get(dashboard::user_dashboard))
        .route("/available-widgets", get(dashboard::list_available_widgets))
        .route("/device-types", get(dashboard::list_device_types))
        .route("/create-widget", post(dashboard::create_widget_definition))
        .route("/add-to-dashboard", post(dashboard::add_widget_to_dashboard))
        .route("/remove-widget/{layout_id}", delete(dashboard::remove_widget))
        .route("/update-layout", post(dashboard::update_layout));

    let api_routes = if config.disable_rate_limiting {
        Router::new()
            .merge(data_routes_base)
            .merge(dashboard_routes_base)
    } else {
        let data_limiter = GovernorConfigBuilder::default()
            .key_extractor(TenantKeyExtractor)
            .per_second(config.rate_limit_data_per_second)
            .burst_size(config.rate_limit_data_burst)
            .finish()
            .ok_or_else(|| ConfigError::Invalid("widget-data rate limit must be non-zero".to_string()))?;

        let admin_limiter = GovernorConfigBuilder::default()
            .key_extractor(TenantKeyExtractor)
            .per_second(config.rate_limit_admin_per_second)
            .burst_size(config.rate_limit_admin_burst)
            .finish()
            .ok_or_else(|| ConfigError::Invalid("dashboard rate limit must be non-zero".to_string()))?;

        Router::new()
            .merge(data_routes_base.layer(GovernorLayer {
                config: Arc::new(data_limiter),
            }))
            .merge(dashboard_routes_base.layer(GovernorLayer {
                config: Arc::new(admin_limiter),
            }))
    }
    .layer(RequestBodyLimitLayer::new(1024 * 1024)) // 1MB body limit
    // Outermost so the tenant context exists before the limiter keys on it
    .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Health check routes (no auth, no rate limiting)
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Ok(Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
