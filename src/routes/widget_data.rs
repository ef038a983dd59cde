use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;

use crate::auth::TenantContext;
use crate::common::{ApiQuery, ApiResponse, AppState};
use crate::error::AppResult;
use crate::routes::with_deadline;
use crate::services::latest::{LatestData, resolve_latest};
use crate::services::widget_data::{WidgetData, resolve_series_data};
use crate::widget::{WidgetDataQuery, WidgetFilters};

fn filters_for(state: &AppState, query: &WidgetDataQuery) -> AppResult<WidgetFilters> {
    WidgetFilters::from_query(
        query,
        state.config.default_series_limit,
        state.config.max_series_limit,
    )
}

/// Time-series data for every series of a widget
///
/// Devices are always restricted to the caller's company. `deviceId` wins over
/// `hierarchyId` when both are given.
#[utoipa::path(
    get,
    path = "/api/widget-data/{widget_id}",
    params(
        ("widget_id" = String, Path, description = "Widget definition UUID"),
        WidgetDataQuery,
    ),
    responses(
        (status = 200, description = "Series data retrieved successfully", body = WidgetData),
        (status = 400, description = "Invalid filter"),
        (status = 404, description = "Widget not found"),
        (status = 504, description = "Resolution exceeded the request deadline"),
    ),
    security(("bearer" = [])),
    tag = "widget-data"
)]
pub async fn get_widget_data(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(widget_id): Path<String>,
    ApiQuery(query): ApiQuery<WidgetDataQuery>,
) -> AppResult<Json<ApiResponse<WidgetData>>> {
    let filters = filters_for(&state, &query)?;

    let data = with_deadline(
        state.config.request_timeout(),
        resolve_series_data(&state.db, &widget_id, tenant.company_id, &filters, Utc::now()),
    )
    .await?;

    Ok(Json(ApiResponse::ok(data)))
}

/// Current value of every series of a widget, per device and aggregated
#[utoipa::path(
    get,
    path = "/api/widget-data/{widget_id}/latest",
    params(
        ("widget_id" = String, Path, description = "Widget definition UUID"),
        WidgetDataQuery,
    ),
    responses(
        (status = 200, description = "Latest values retrieved successfully", body = LatestData),
        (status = 400, description = "Invalid filter"),
        (status = 404, description = "Widget not found"),
        (status = 504, description = "Resolution exceeded the request deadline"),
    ),
    security(("bearer" = [])),
    tag = "widget-data"
)]
pub async fn get_widget_latest(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(widget_id): Path<String>,
    ApiQuery(query): ApiQuery<WidgetDataQuery>,
) -> AppResult<Json<ApiResponse<LatestData>>> {
    // No time window or point limit applies to the latest projection.
    let query = WidgetDataQuery {
        time_range: None,
        limit: None,
        ..query
    };
    let filters = filters_for(&state, &query)?;

    let data = with_deadline(
        state.config.request_timeout(),
        resolve_latest(&state.db, &widget_id, tenant.company_id, &filters),
    )
    .await?;

    Ok(Json(ApiResponse::ok(data)))
}
