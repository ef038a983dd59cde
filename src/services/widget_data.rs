//! Time-series data for a widget: one scoped, windowed query per series.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{device_readings, devices, widget_definitions, widget_types};
use crate::error::{AppError, AppResult};
use crate::services::hierarchy::resolve_descendants;
use crate::widget::{
    DataSourceConfig, FilterEcho, Scope, SeriesConfig, WidgetFilters, WidgetKind, series_value,
};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub serial_number: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesData {
    /// Ascending by timestamp
    pub points: Vec<SeriesPoint>,
    pub unit: String,
    pub property_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WidgetData {
    pub widget_id: Uuid,
    /// Keyed by series display name
    pub data: BTreeMap<String, SeriesData>,
    pub filters: FilterEcho,
}

/// A widget definition with its validated data-source configuration.
#[derive(Debug, Clone)]
pub struct ResolvedWidget {
    pub definition: widget_definitions::Model,
    pub widget_type: widget_types::Model,
    pub config: DataSourceConfig,
}

impl ResolvedWidget {
    #[must_use]
    pub fn kind(&self) -> WidgetKind {
        self.config.kind()
    }
}

#[derive(Debug, FromQueryResult)]
struct ReadingRow {
    serial_number: String,
    created_at: DateTimeWithTimeZone,
    value: Option<serde_json::Value>,
}

/// Load a widget definition by its path id.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the id is malformed or unknown,
/// `AppError::DataIntegrity` when the widget type row is missing, and
/// `AppError::Internal` when the stored configuration does not validate.
pub async fn load_widget(db: &DatabaseConnection, widget_id: &str) -> AppResult<ResolvedWidget> {
    let not_found = || AppError::NotFound(format!("Widget '{widget_id}' not found"));

    let id = widget_id.parse::<Uuid>().map_err(|_| not_found())?;
    let definition = widget_definitions::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)?;

    let widget_type = widget_types::Entity::find_by_id(definition.widget_type_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            AppError::DataIntegrity(format!(
                "widget {} references missing widget type {}",
                definition.id, definition.widget_type_id
            ))
        })?;

    let kind = WidgetKind::parse(&widget_type.name)?;
    let config = DataSourceConfig::parse(kind, &definition.data_source_config)?;

    Ok(ResolvedWidget {
        definition,
        widget_type,
        config,
    })
}

/// Devices visible to a widget request.
///
/// The company predicate is always applied; device type and scope only narrow
/// it further. A device filter for another company's device matches nothing.
///
/// # Errors
///
/// Propagates store failures and hierarchy integrity errors.
pub async fn scoped_devices(
    db: &DatabaseConnection,
    company_id: Uuid,
    device_type_id: Option<i32>,
    scope: Scope,
) -> AppResult<Vec<devices::Model>> {
    let mut query = devices::Entity::find().filter(devices::Column::CompanyId.eq(company_id));

    if let Some(device_type_id) = device_type_id {
        query = query.filter(devices::Column::DeviceTypeId.eq(device_type_id));
    }

    query = match scope {
        Scope::Company => query,
        Scope::Device(device_id) => query.filter(devices::Column::Id.eq(device_id)),
        Scope::Hierarchy(root) => {
            let nodes = resolve_descendants(db, root).await?;
            query.filter(devices::Column::HierarchyId.is_in(nodes))
        }
    };

    Ok(query
        .order_by_asc(devices::Column::SerialNumber)
        .all(db)
        .await?)
}

/// Resolve every configured series of a widget for the given filters.
///
/// `company_id` must come from the authenticated tenant context. `now` anchors
/// the time window so repeated calls at the same instant are comparable.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown widget; store and configuration
/// failures map to internal errors.
pub async fn resolve_series_data(
    db: &DatabaseConnection,
    widget_id: &str,
    company_id: Uuid,
    filters: &WidgetFilters,
    now: DateTime<Utc>,
) -> AppResult<WidgetData> {
    let widget = load_widget(db, widget_id).await?;
    let series = widget.config.series();

    let mut data = BTreeMap::new();
    if series.is_empty() {
        return Ok(WidgetData {
            widget_id: widget.definition.id,
            data,
            filters: filters.echo(),
        });
    }

    let device_ids: Vec<Uuid> = scoped_devices(
        db,
        company_id,
        widget.config.device_type_id(),
        filters.scope(),
    )
    .await?
    .into_iter()
    .map(|d| d.id)
    .collect();

    let since = filters.time_range.since(now);

    for descriptor in &series {
        let points = if device_ids.is_empty() {
            Vec::new()
        } else {
            series_points(db, &device_ids, descriptor, since, filters.limit).await?
        };

        tracing::debug!(
            widget_id = %widget.definition.id,
            series = %descriptor.display_name,
            points = points.len(),
            "series_resolved"
        );

        data.insert(
            descriptor.display_name.clone(),
            SeriesData {
                points,
                unit: descriptor.unit.clone(),
                property_name: descriptor.property_name.clone(),
            },
        );
    }

    tracing::info!(
        widget_id = %widget.definition.id,
        company_id = %company_id,
        series = data.len(),
        devices = device_ids.len(),
        time_range = filters.time_range.as_str(),
        "widget_data_resolved"
    );

    Ok(WidgetData {
        widget_id: widget.definition.id,
        data,
        filters: filters.echo(),
    })
}

/// Numbers, nulls and numeric text. Mirrors [`series_value`].
const NUMERIC_VALUE_SQL: &str = r#"(jsonb_typeof("device_readings"."data" -> $1) IN ('number', 'null') OR ("device_readings"."data" ->> $2) ~ '\A\s*[-+]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][-+]?[0-9]+)?\s*\Z')"#;

async fn series_points(
    db: &DatabaseConnection,
    device_ids: &[Uuid],
    descriptor: &SeriesConfig,
    since: DateTime<Utc>,
    limit: u64,
) -> AppResult<Vec<SeriesPoint>> {
    let property = descriptor.data_source_property.clone();

    let rows = device_readings::Entity::find()
        .select_only()
        .column(device_readings::Column::SerialNumber)
        .column(device_readings::Column::CreatedAt)
        .column_as(
            Expr::cust_with_values("\"device_readings\".\"data\" -> $1", [property.clone()]),
            "value",
        )
        .filter(device_readings::Column::DeviceId.is_in(device_ids.iter().copied()))
        .filter(device_readings::Column::CreatedAt.gte(since))
        .filter(Expr::cust_with_values(
            "jsonb_exists(\"device_readings\".\"data\", $1)",
            [property.clone()],
        ))
        // Usable values only, so the limit counts points that are returned
        .filter(Expr::cust_with_values(NUMERIC_VALUE_SQL, [property.clone(), property]))
        .order_by_asc(device_readings::Column::CreatedAt)
        .order_by_asc(device_readings::Column::Id)
        .limit(limit)
        .into_model::<ReadingRow>()
        .all(db)
        .await?;

    Ok(rows.into_iter().filter_map(to_point).collect())
}

fn to_point(row: ReadingRow) -> Option<SeriesPoint> {
    let value = match &row.value {
        Some(raw) => series_value(raw)?,
        None => 0.0,
    };
    Some(SeriesPoint {
        timestamp: row.created_at.with_timezone(&Utc),
        serial_number: row.serial_number,
        value,
    })
}
