//! Latest-value view of a widget, read from the one-row-per-device projection.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{device_latest, device_types, devices, hierarchies};
use crate::error::AppResult;
use crate::services::widget_data::{load_widget, scoped_devices};
use crate::widget::{FilterEcho, WidgetFilters, latest_value, mean_of_present};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatestPoint {
    pub timestamp: DateTime<Utc>,
    pub serial_number: String,
    /// Null when the device has no numeric value for the property
    pub value: Option<f64>,
    /// Name of the device's hierarchy node
    pub location: Option<String>,
    pub device_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatestSeries {
    /// Descending by timestamp
    pub latest: Vec<LatestPoint>,
    /// Mean over devices that report a value; null if none do
    pub aggregated_value: Option<f64>,
    /// Devices that contributed to the aggregate
    pub count: usize,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatestData {
    pub widget_id: Uuid,
    pub data: BTreeMap<String, LatestSeries>,
    pub filters: FilterEcho,
}

/// Resolve the current value of every configured series across the devices
/// in scope. No time window applies; the time range filter is ignored.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown widget; store and configuration
/// failures map to internal errors.
pub async fn resolve_latest(
    db: &DatabaseConnection,
    widget_id: &str,
    company_id: Uuid,
    filters: &WidgetFilters,
) -> AppResult<LatestData> {
    let widget = load_widget(db, widget_id).await?;
    let series = widget.config.series();
    let echo = FilterEcho {
        time_range: None,
        ..filters.echo()
    };

    if series.is_empty() {
        return Ok(LatestData {
            widget_id: widget.definition.id,
            data: BTreeMap::new(),
            filters: echo,
        });
    }

    let devices = scoped_devices(
        db,
        company_id,
        widget.config.device_type_id(),
        filters.scope(),
    )
    .await?;

    let snapshots = if devices.is_empty() {
        Vec::new()
    } else {
        load_snapshots(db, &devices).await?
    };

    let data = series
        .iter()
        .map(|descriptor| {
            let latest: Vec<LatestPoint> = snapshots
                .iter()
                .map(|snap| LatestPoint {
                    timestamp: snap.row.updated_at.with_timezone(&Utc),
                    serial_number: snap.row.serial_number.clone(),
                    value: latest_value(snap.row.data.get(&descriptor.data_source_property)),
                    location: snap.location.clone(),
                    device_type: snap.device_type.clone(),
                })
                .collect();

            let aggregate = mean_of_present(latest.iter().map(|p| p.value));

            (
                descriptor.display_name.clone(),
                LatestSeries {
                    latest,
                    aggregated_value: aggregate.value,
                    count: aggregate.count,
                    unit: descriptor.unit.clone(),
                },
            )
        })
        .collect::<BTreeMap<_, _>>();

    tracing::info!(
        widget_id = %widget.definition.id,
        company_id = %company_id,
        series = data.len(),
        devices = snapshots.len(),
        "widget_latest_resolved"
    );

    Ok(LatestData {
        widget_id: widget.definition.id,
        data,
        filters: echo,
    })
}

struct Snapshot {
    row: device_latest::Model,
    location: Option<String>,
    device_type: Option<String>,
}

/// Latest rows for `devices`, newest first, with display names attached.
async fn load_snapshots(
    db: &DatabaseConnection,
    devices: &[devices::Model],
) -> AppResult<Vec<Snapshot>> {
    let by_id: HashMap<Uuid, &devices::Model> = devices.iter().map(|d| (d.id, d)).collect();
    let hierarchy_ids: HashSet<Uuid> = devices.iter().map(|d| d.hierarchy_id).collect();
    let type_ids: HashSet<i32> = devices.iter().map(|d| d.device_type_id).collect();

    let locations: HashMap<Uuid, String> = hierarchies::Entity::find()
        .filter(hierarchies::Column::Id.is_in(hierarchy_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|h| (h.id, h.name))
        .collect();

    let type_names: HashMap<i32, String> = device_types::Entity::find()
        .filter(device_types::Column::Id.is_in(type_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let rows = device_latest::Entity::find()
        .filter(device_latest::Column::DeviceId.is_in(by_id.keys().copied()))
        .order_by_desc(device_latest::Column::UpdatedAt)
        .order_by_asc(device_latest::Column::SerialNumber)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let device = by_id.get(&row.device_id);
            Snapshot {
                location: device.and_then(|d| locations.get(&d.hierarchy_id).cloned()),
                device_type: device.and_then(|d| type_names.get(&d.device_type_id).cloned()),
                row,
            }
        })
        .collect())
}
