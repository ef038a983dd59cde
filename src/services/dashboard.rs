//! Active dashboard selection, composition and layout mutations.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, SimpleExpr},
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::AppState;
use crate::entity::{dashboard_layouts, dashboards, widget_definitions, widget_types};
use crate::error::{AppError, AppResult};
use crate::widget::LayoutConfig;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub grid_config: serde_json::Value,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

/// A placed widget: layout row joined with its definition and type.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    pub layout_id: Uuid,
    pub widget_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Widget type name, e.g. `line_chart`
    #[serde(rename = "type")]
    pub widget_type: String,
    pub component: String,
    pub layout_config: serde_json::Value,
    pub instance_config: Option<serde_json::Value>,
    pub data_source_config: serde_json::Value,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub dashboard: DashboardSummary,
    /// Ascending by display order
    pub widgets: Vec<WidgetView>,
}

/// The company's active dashboard: earliest created, ties broken by id.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the company has no active dashboard.
pub async fn active_dashboard<C>(db: &C, company_id: Uuid) -> AppResult<dashboards::Model>
where
    C: ConnectionTrait,
{
    dashboards::Entity::find()
        .filter(dashboards::Column::CompanyId.eq(company_id))
        .filter(dashboards::Column::IsActive.eq(true))
        .order_by_asc(dashboards::Column::CreatedAt)
        .order_by_asc(dashboards::Column::Id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dashboard not found".to_string()))
}

/// Build the dashboard view for a company straight from the store.
///
/// # Errors
///
/// Returns `AppError::NotFound` without an active dashboard and
/// `AppError::DataIntegrity` when a layout points at a missing definition.
pub async fn compose_dashboard(db: &DatabaseConnection, company_id: Uuid) -> AppResult<DashboardView> {
    let dashboard = active_dashboard(db, company_id).await?;

    let layouts = dashboard_layouts::Entity::find()
        .filter(dashboard_layouts::Column::DashboardId.eq(dashboard.id))
        .order_by_asc(dashboard_layouts::Column::DisplayOrder)
        .order_by_asc(dashboard_layouts::Column::CreatedAt)
        .all(db)
        .await?;

    let definition_ids: HashSet<Uuid> = layouts.iter().map(|l| l.widget_definition_id).collect();
    let definitions: HashMap<Uuid, widget_definitions::Model> = if definition_ids.is_empty() {
        HashMap::new()
    } else {
        widget_definitions::Entity::find()
            .filter(widget_definitions::Column::Id.is_in(definition_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect()
    };

    let type_ids: HashSet<i32> = definitions.values().map(|d| d.widget_type_id).collect();
    let types: HashMap<i32, widget_types::Model> = if type_ids.is_empty() {
        HashMap::new()
    } else {
        widget_types::Entity::find()
            .filter(widget_types::Column::Id.is_in(type_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect()
    };

    let widgets = layouts
        .into_iter()
        .map(|layout| {
            let definition = definitions.get(&layout.widget_definition_id).ok_or_else(|| {
                AppError::DataIntegrity(format!(
                    "layout {} references missing widget definition {}",
                    layout.id, layout.widget_definition_id
                ))
            })?;
            let widget_type = types.get(&definition.widget_type_id).ok_or_else(|| {
                AppError::DataIntegrity(format!(
                    "widget {} references missing widget type {}",
                    definition.id, definition.widget_type_id
                ))
            })?;

            Ok(WidgetView {
                layout_id: layout.id,
                widget_id: definition.id,
                name: definition.name.clone(),
                description: definition.description.clone(),
                widget_type: widget_type.name.clone(),
                component: widget_type.component.clone(),
                layout_config: layout.layout_config,
                instance_config: layout.instance_config,
                data_source_config: definition.data_source_config.clone(),
                display_order: layout.display_order,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    tracing::debug!(
        company_id = %company_id,
        dashboard_id = %dashboard.id,
        widgets = widgets.len(),
        "dashboard_composed"
    );

    Ok(DashboardView {
        dashboard: DashboardSummary {
            id: dashboard.id,
            name: dashboard.name,
            description: dashboard.description,
            is_active: dashboard.is_active,
            grid_config: dashboard.grid_config,
            version: dashboard.version,
            created_at: dashboard.created_at.with_timezone(&Utc),
        },
        widgets,
    })
}

/// Cached variant of [`compose_dashboard`].
///
/// # Errors
///
/// Same as [`compose_dashboard`]; failures are not cached.
pub async fn load_dashboard(state: &AppState, company_id: Uuid) -> AppResult<Arc<DashboardView>> {
    if let Some(cached) = state.dashboard_cache.get(&company_id).await {
        tracing::debug!(company_id = %company_id, "dashboard_cache_hit");
        return Ok(cached);
    }

    let epoch = cache_epoch(state);
    let view = Arc::new(compose_dashboard(&state.db, company_id).await?);
    cache_view(state, company_id, epoch, Arc::clone(&view)).await;
    Ok(view)
}

/// Current invalidation epoch. Take it before reading the store and hand it
/// to [`cache_view`].
#[must_use]
pub fn cache_epoch(state: &AppState) -> u64 {
    state.dashboard_epoch.load(Ordering::SeqCst)
}

/// Cache a view composed at `epoch`. Returns `false`, leaving no entry
/// behind, when an invalidation happened since then.
pub async fn cache_view(
    state: &AppState,
    company_id: Uuid,
    epoch: u64,
    view: Arc<DashboardView>,
) -> bool {
    if cache_epoch(state) != epoch {
        tracing::debug!(company_id = %company_id, "dashboard_cache_skip_stale");
        return false;
    }
    state.dashboard_cache.insert(company_id, view).await;

    // An invalidation between the check and the insert must still win
    if cache_epoch(state) != epoch {
        state.dashboard_cache.invalidate(&company_id).await;
        tracing::debug!(company_id = %company_id, "dashboard_cache_skip_stale");
        return false;
    }
    true
}

/// Drop the company's cached view. Views composed before this call will not
/// be cached afterwards.
pub async fn invalidate(state: &AppState, company_id: Uuid) {
    state.dashboard_epoch.fetch_add(1, Ordering::SeqCst);
    state.dashboard_cache.invalidate(&company_id).await;
    tracing::debug!(company_id = %company_id, "dashboard_cache_invalidated");
}

async fn bump_version<C>(db: &C, dashboard_id: Uuid) -> AppResult<()>
where
    C: ConnectionTrait,
{
    dashboards::Entity::update_many()
        .col_expr(
            dashboards::Column::Version,
            Expr::col(dashboards::Column::Version).add(1),
        )
        .col_expr(dashboards::Column::UpdatedAt, SimpleExpr::from(Expr::current_timestamp()))
        .filter(dashboards::Column::Id.eq(dashboard_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Append a widget to the company's active dashboard.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown widget definition or when the
/// company has no active dashboard.
pub async fn add_to_dashboard(
    db: &DatabaseConnection,
    company_id: Uuid,
    widget_definition_id: Uuid,
    layout: &LayoutConfig,
    instance_config: Option<serde_json::Value>,
) -> AppResult<Uuid> {
    let txn = db.begin().await?;

    widget_definitions::Entity::find_by_id(widget_definition_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Widget definition not found".to_string()))?;

    let dashboard = active_dashboard(&txn, company_id).await?;

    let max_order: Option<i32> = dashboard_layouts::Entity::find()
        .select_only()
        .column_as(dashboard_layouts::Column::DisplayOrder.max(), "max_order")
        .filter(dashboard_layouts::Column::DashboardId.eq(dashboard.id))
        .into_tuple::<Option<i32>>()
        .one(&txn)
        .await?
        .flatten();

    let layout_config =
        serde_json::to_value(layout).map_err(|e| AppError::Internal(e.to_string()))?;

    let inserted = dashboard_layouts::ActiveModel {
        id: Set(Uuid::new_v4()),
        dashboard_id: Set(dashboard.id),
        widget_definition_id: Set(widget_definition_id),
        layout_config: Set(layout_config),
        instance_config: Set(instance_config),
        display_order: Set(max_order.map_or(0, |max| max + 1)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    bump_version(&txn, dashboard.id).await?;
    txn.commit().await?;

    tracing::info!(
        company_id = %company_id,
        dashboard_id = %dashboard.id,
        layout_id = %inserted.id,
        display_order = inserted.display_order,
        "layout_added"
    );
    Ok(inserted.id)
}

/// Delete a layout row; the widget definition is left in place.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the layout does not exist or belongs to
/// another company's dashboard.
pub async fn remove_layout(db: &DatabaseConnection, company_id: Uuid, layout_id: Uuid) -> AppResult<()> {
    let not_found = || AppError::NotFound("Layout not found".to_string());
    let txn = db.begin().await?;

    let layout = dashboard_layouts::Entity::find_by_id(layout_id)
        .one(&txn)
        .await?
        .ok_or_else(not_found)?;

    dashboards::Entity::find_by_id(layout.dashboard_id)
        .filter(dashboards::Column::CompanyId.eq(company_id))
        .one(&txn)
        .await?
        .ok_or_else(not_found)?;

    dashboard_layouts::Entity::delete_by_id(layout.id)
        .exec(&txn)
        .await?;
    bump_version(&txn, layout.dashboard_id).await?;
    txn.commit().await?;

    tracing::info!(company_id = %company_id, layout_id = %layout_id, "layout_removed");
    Ok(())
}

/// Rewrite the placement of several layouts atomically.
///
/// # Errors
///
/// Returns `AppError::NotFound` (and writes nothing) if any layout is missing
/// or owned by another company.
pub async fn update_layouts(
    db: &DatabaseConnection,
    company_id: Uuid,
    updates: &[(Uuid, LayoutConfig)],
) -> AppResult<()> {
    let txn = db.begin().await?;

    let owned_dashboards: HashSet<Uuid> = dashboards::Entity::find()
        .filter(dashboards::Column::CompanyId.eq(company_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|d| d.id)
        .collect();

    let requested: HashSet<Uuid> = updates.iter().map(|(id, _)| *id).collect();
    let layouts: HashMap<Uuid, dashboard_layouts::Model> = dashboard_layouts::Entity::find()
        .filter(dashboard_layouts::Column::Id.is_in(requested.iter().copied()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|l| (l.id, l))
        .collect();

    let mut touched = HashSet::new();
    for (layout_id, config) in updates {
        let layout = layouts
            .get(layout_id)
            .filter(|l| owned_dashboards.contains(&l.dashboard_id))
            .ok_or_else(|| AppError::NotFound(format!("Layout '{layout_id}' not found")))?;

        let value = serde_json::to_value(config).map_err(|e| AppError::Internal(e.to_string()))?;
        dashboard_layouts::Entity::update_many()
            .col_expr(dashboard_layouts::Column::LayoutConfig, Expr::value(value))
            .filter(dashboard_layouts::Column::Id.eq(layout.id))
            .exec(&txn)
            .await?;
        touched.insert(layout.dashboard_id);
    }

    for dashboard_id in &touched {
        bump_version(&txn, *dashboard_id).await?;
    }
    txn.commit().await?;

    tracing::info!(
        company_id = %company_id,
        layouts = updates.len(),
        dashboards = touched.len(),
        "layouts_updated"
    );
    Ok(())
}
