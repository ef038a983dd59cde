use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::auth::TenantContext;
use crate::common::{ApiJson, ApiQuery, ApiResponse, AppState};
use crate::error::{AppError, AppResult};
use crate::routes::with_deadline;
use crate::services::dashboard::{self, add_to_dashboard, load_dashboard, remove_layout, update_layouts};
use crate::services::widgets::{
    AvailableWidgets, DeviceTypeCatalog, NewWidget, available_widgets, create_widget,
    device_type_catalog,
};
use crate::widget::LayoutConfig;

use super::types::{
    AddToDashboardRequest, AddToDashboardResponse, AvailableWidgetsQuery, CreateWidgetRequest,
    CreateWidgetResponse, UpdateLayoutRequest, UserDashboardResponse,
};

/// Active dashboard of the caller's company with its placed widgets
#[utoipa::path(
    get,
    path = "/api/user-dashboard",
    responses(
        (status = 200, description = "Dashboard retrieved successfully", body = UserDashboardResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Company has no active dashboard"),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
pub async fn user_dashboard(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> AppResult<Json<ApiResponse<UserDashboardResponse>>> {
    let view = with_deadline(
        state.config.request_timeout(),
        load_dashboard(&state, tenant.company_id),
    )
    .await?;

    Ok(Json(ApiResponse::ok(UserDashboardResponse {
        dashboard: view.dashboard.clone(),
        widgets: view.widgets.clone(),
        can_edit: tenant.is_admin(),
    })))
}

/// Widget types and the properties a device type exposes
#[utoipa::path(
    get,
    path = "/api/available-widgets",
    params(AvailableWidgetsQuery),
    responses(
        (status = 200, description = "Catalog retrieved successfully", body = AvailableWidgets),
        (status = 400, description = "deviceTypeId missing or malformed"),
        (status = 404, description = "Device type not found"),
    ),
    security(("bearer" = [])),
    tag = "widgets"
)]
pub async fn list_available_widgets(
    State(state): State<AppState>,
    _tenant: TenantContext,
    ApiQuery(query): ApiQuery<AvailableWidgetsQuery>,
) -> AppResult<Json<ApiResponse<AvailableWidgets>>> {
    let raw = query
        .device_type_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::missing_fields(&["deviceTypeId"]))?;
    let device_type_id = raw
        .parse::<i32>()
        .map_err(|_| AppError::Validation("deviceTypeId must be an integer".to_string()))?;

    let catalog = with_deadline(
        state.config.request_timeout(),
        available_widgets(&state.db, device_type_id),
    )
    .await?;
    Ok(Json(ApiResponse::ok(catalog)))
}

/// Every device type with its properties, plus the widget types
#[utoipa::path(
    get,
    path = "/api/device-types",
    responses(
        (status = 200, description = "Catalog retrieved successfully", body = DeviceTypeCatalog),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer" = [])),
    tag = "widgets"
)]
pub async fn list_device_types(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> AppResult<Json<ApiResponse<DeviceTypeCatalog>>> {
    tenant.require_admin("view device types")?;

    let catalog =
        with_deadline(state.config.request_timeout(), device_type_catalog(&state.db)).await?;
    Ok(Json(ApiResponse::ok(catalog)))
}

/// Create a widget definition from a device type's properties
#[utoipa::path(
    post,
    path = "/api/create-widget",
    request_body = CreateWidgetRequest,
    responses(
        (status = 200, description = "Widget created", body = CreateWidgetResponse),
        (status = 400, description = "Missing fields or invalid property selection"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Device type or widget type not found"),
    ),
    security(("bearer" = [])),
    tag = "widgets"
)]
pub async fn create_widget_definition(
    State(state): State<AppState>,
    tenant: TenantContext,
    ApiJson(body): ApiJson<CreateWidgetRequest>,
) -> AppResult<Json<ApiResponse<CreateWidgetResponse>>> {
    tenant.require_admin("create widgets")?;

    let display_name = body
        .display_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    let mut missing = Vec::new();
    if body.device_type_id.is_none() {
        missing.push("deviceTypeId");
    }
    if body.widget_type_id.is_none() {
        missing.push("widgetTypeId");
    }
    if body.property_ids.is_none() {
        missing.push("propertyIds");
    }
    if display_name.is_none() {
        missing.push("displayName");
    }
    let (Some(device_type_id), Some(widget_type_id), Some(property_ids), Some(display_name)) =
        (body.device_type_id, body.widget_type_id, body.property_ids, display_name)
    else {
        return Err(AppError::missing_fields(&missing));
    };

    let input = NewWidget {
        device_type_id,
        widget_type_id,
        property_ids,
        display_name,
        description: body.description,
    };
    let widget_id = with_deadline(
        state.config.request_timeout(),
        create_widget(&state.db, tenant.user_id, input),
    )
    .await?;

    Ok(Json(ApiResponse::ok(CreateWidgetResponse { widget_id })))
}

/// Place a widget on the company's active dashboard
#[utoipa::path(
    post,
    path = "/api/add-to-dashboard",
    request_body = AddToDashboardRequest,
    responses(
        (status = 200, description = "Widget placed", body = AddToDashboardResponse),
        (status = 400, description = "Missing fields or invalid layout"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Widget definition or dashboard not found"),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
pub async fn add_widget_to_dashboard(
    State(state): State<AppState>,
    tenant: TenantContext,
    ApiJson(body): ApiJson<AddToDashboardRequest>,
) -> AppResult<Json<ApiResponse<AddToDashboardResponse>>> {
    tenant.require_admin("add widgets to dashboards")?;

    let mut missing = Vec::new();
    if body.widget_definition_id.is_none() {
        missing.push("widgetDefinitionId");
    }
    if body.layout_config.is_none() {
        missing.push("layoutConfig");
    }
    let (Some(widget_definition_id), Some(layout)) = (body.widget_definition_id, body.layout_config)
    else {
        return Err(AppError::missing_fields(&missing));
    };
    validate_layout(&layout)?;

    let outcome = with_deadline(
        state.config.request_timeout(),
        add_to_dashboard(
            &state.db,
            tenant.company_id,
            widget_definition_id,
            &layout,
            body.instance_config,
        ),
    )
    .await;
    // The commit may have landed even when the deadline fired
    dashboard::invalidate(&state, tenant.company_id).await;
    let layout_id = outcome?;

    Ok(Json(ApiResponse::ok(AddToDashboardResponse { layout_id })))
}

/// Remove a placed widget; its definition is kept
#[utoipa::path(
    delete,
    path = "/api/remove-widget/{layout_id}",
    params(
        ("layout_id" = String, Path, description = "Layout UUID"),
    ),
    responses(
        (status = 200, description = "Widget removed"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Layout not found"),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
pub async fn remove_widget(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(layout_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    tenant.require_admin("remove widgets")?;

    let layout_id = layout_id
        .parse::<Uuid>()
        .map_err(|_| AppError::NotFound("Layout not found".to_string()))?;

    let outcome = with_deadline(
        state.config.request_timeout(),
        remove_layout(&state.db, tenant.company_id, layout_id),
    )
    .await;
    dashboard::invalidate(&state, tenant.company_id).await;
    outcome?;

    Ok(Json(ApiResponse::done()))
}

/// Move or resize several placed widgets at once
#[utoipa::path(
    post,
    path = "/api/update-layout",
    request_body = UpdateLayoutRequest,
    responses(
        (status = 200, description = "Layouts updated"),
        (status = 400, description = "Missing fields or invalid layout"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "A layout was not found; nothing was written"),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
pub async fn update_layout(
    State(state): State<AppState>,
    tenant: TenantContext,
    ApiJson(body): ApiJson<UpdateLayoutRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    tenant.require_admin("update layouts")?;

    let layouts = body
        .layouts
        .ok_or_else(|| AppError::missing_fields(&["layouts"]))?;

    let mut updates = Vec::with_capacity(layouts.len());
    for entry in layouts {
        let (Some(layout_id), Some(layout)) = (entry.layout_id, entry.layout_config) else {
            return Err(AppError::missing_fields(&["layoutId", "layoutConfig"]));
        };
        validate_layout(&layout)?;
        updates.push((layout_id, layout));
    }

    if updates.is_empty() {
        return Ok(Json(ApiResponse::done()));
    }

    let outcome = with_deadline(
        state.config.request_timeout(),
        update_layouts(&state.db, tenant.company_id, &updates),
    )
    .await;
    dashboard::invalidate(&state, tenant.company_id).await;
    outcome?;

    Ok(Json(ApiResponse::done()))
}

fn validate_layout(layout: &LayoutConfig) -> AppResult<()> {
    layout
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}
