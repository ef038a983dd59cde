//! Widget catalog and widget-definition creation.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{device_type_properties, device_types, widget_definitions, widget_types};
use crate::error::{AppError, AppResult};
use crate::widget::{
    DataSourceConfig, DonutChartConfig, KpiConfig, LineChartConfig, MapConfig, SeriesConfig,
    WidgetKind,
};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WidgetTypeResponse {
    pub id: i32,
    pub name: String,
    pub component: String,
    pub default_config: serde_json::Value,
}

impl From<widget_types::Model> for WidgetTypeResponse {
    fn from(t: widget_types::Model) -> Self {
        Self {
            id: t.id,
            name: t.name,
            component: t.component,
            default_config: t.default_config,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    pub id: i32,
    pub device_type_id: i32,
    pub name: String,
    /// Key in reading data
    pub tag: String,
    pub unit: Option<String>,
    pub data_type: String,
}

impl From<device_type_properties::Model> for PropertyResponse {
    fn from(p: device_type_properties::Model) -> Self {
        Self {
            id: p.id,
            device_type_id: p.device_type_id,
            name: p.name,
            tag: p.tag,
            unit: p.unit,
            data_type: p.data_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableWidgets {
    pub widget_types: Vec<WidgetTypeResponse>,
    pub properties: Vec<PropertyResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTypeEntry {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub properties: Vec<PropertyResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTypeCatalog {
    pub device_types: Vec<DeviceTypeEntry>,
    pub widget_types: Vec<WidgetTypeResponse>,
}

/// Validated input for a new widget definition.
#[derive(Debug, Clone)]
pub struct NewWidget {
    pub device_type_id: i32,
    pub widget_type_id: i32,
    pub property_ids: Vec<i32>,
    pub display_name: String,
    pub description: Option<String>,
}

async fn widget_type_catalog(db: &DatabaseConnection) -> AppResult<Vec<WidgetTypeResponse>> {
    Ok(widget_types::Entity::find()
        .order_by_asc(widget_types::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(WidgetTypeResponse::from)
        .collect())
}

/// Widget types plus the properties a device type exposes.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown device type.
pub async fn available_widgets(db: &DatabaseConnection, device_type_id: i32) -> AppResult<AvailableWidgets> {
    device_types::Entity::find_by_id(device_type_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Device type not found".to_string()))?;

    let properties = device_type_properties::Entity::find()
        .filter(device_type_properties::Column::DeviceTypeId.eq(device_type_id))
        .order_by_asc(device_type_properties::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(PropertyResponse::from)
        .collect();

    Ok(AvailableWidgets {
        widget_types: widget_type_catalog(db).await?,
        properties,
    })
}

/// Every device type with its property catalog, plus the widget types.
///
/// # Errors
///
/// Propagates store failures.
pub async fn device_type_catalog(db: &DatabaseConnection) -> AppResult<DeviceTypeCatalog> {
    let types = device_types::Entity::find()
        .order_by_asc(device_types::Column::Name)
        .all(db)
        .await?;

    let mut properties: HashMap<i32, Vec<PropertyResponse>> = HashMap::new();
    for property in device_type_properties::Entity::find()
        .order_by_asc(device_type_properties::Column::Id)
        .all(db)
        .await?
    {
        properties
            .entry(property.device_type_id)
            .or_default()
            .push(property.into());
    }

    let device_types = types
        .into_iter()
        .map(|t| DeviceTypeEntry {
            properties: properties.remove(&t.id).unwrap_or_default(),
            id: t.id,
            name: t.name,
            description: t.description,
        })
        .collect();

    Ok(DeviceTypeCatalog {
        device_types,
        widget_types: widget_type_catalog(db).await?,
    })
}

/// Build the data-source configuration for a new widget from the selected
/// properties, in the order they were requested.
///
/// # Errors
///
/// Returns `AppError::Validation` when the property selection does not fit
/// the widget kind.
pub fn build_data_source_config(
    kind: WidgetKind,
    device_type_id: i32,
    properties: &[device_type_properties::Model],
    display_name: &str,
) -> AppResult<DataSourceConfig> {
    let config = match kind {
        WidgetKind::LineChart => {
            if properties.is_empty() {
                return Err(AppError::Validation(
                    "line_chart widgets need at least one property".to_string(),
                ));
            }
            let series_config: Vec<SeriesConfig> = properties.iter().map(series_for).collect();
            DataSourceConfig::LineChart(LineChartConfig {
                device_type_id: Some(device_type_id),
                number_of_series: series_config.len(),
                series_config,
            })
        }
        WidgetKind::Kpi => {
            let [property] = properties else {
                return Err(AppError::Validation(
                    "kpi widgets need exactly one property".to_string(),
                ));
            };
            DataSourceConfig::Kpi(KpiConfig {
                device_type_id: Some(device_type_id),
                metric: property.tag.clone(),
                unit: property.unit.clone().unwrap_or_default(),
                title: display_name.to_string(),
                display: serde_json::Map::new(),
            })
        }
        WidgetKind::DonutChart => {
            if properties.is_empty() {
                return Err(AppError::Validation(
                    "donut_chart widgets need at least one property".to_string(),
                ));
            }
            DataSourceConfig::DonutChart(DonutChartConfig {
                device_type_id: Some(device_type_id),
                metrics: properties.iter().map(|p| p.tag.clone()).collect(),
                title: display_name.to_string(),
                unit: properties
                    .first()
                    .and_then(|p| p.unit.clone())
                    .unwrap_or_default(),
            })
        }
        WidgetKind::Map => DataSourceConfig::Map(MapConfig {
            show_devices: true,
            show_statistics: true,
        }),
    };
    Ok(config)
}

fn series_for(property: &device_type_properties::Model) -> SeriesConfig {
    SeriesConfig {
        property_id: Some(property.id),
        property_name: property.name.clone(),
        display_name: property.tag.clone(),
        data_source_property: property.tag.clone(),
        unit: property.unit.clone().unwrap_or_default(),
        data_type: property.data_type.clone(),
    }
}

/// Persist a new widget definition created by `created_by`.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown device or widget type and
/// `AppError::Validation` for properties that do not belong to the device type.
pub async fn create_widget(db: &DatabaseConnection, created_by: Uuid, input: NewWidget) -> AppResult<Uuid> {
    device_types::Entity::find_by_id(input.device_type_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Device type not found".to_string()))?;

    let widget_type = widget_types::Entity::find_by_id(input.widget_type_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Widget type not found".to_string()))?;
    let kind = WidgetKind::parse(&widget_type.name)?;

    let mut found: HashMap<i32, device_type_properties::Model> = if input.property_ids.is_empty() {
        HashMap::new()
    } else {
        device_type_properties::Entity::find()
            .filter(device_type_properties::Column::Id.is_in(input.property_ids.iter().copied()))
            .filter(device_type_properties::Column::DeviceTypeId.eq(input.device_type_id))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    let unknown: Vec<String> = input
        .property_ids
        .iter()
        .filter(|id| !found.contains_key(*id))
        .map(ToString::to_string)
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::Validation(format!(
            "Unknown propertyIds for device type {}: {}",
            input.device_type_id,
            unknown.join(", ")
        )));
    }

    // Keep request order; duplicates collapse onto the first occurrence.
    let properties: Vec<device_type_properties::Model> = input
        .property_ids
        .iter()
        .filter_map(|id| found.remove(id))
        .collect();

    let config =
        build_data_source_config(kind, input.device_type_id, &properties, &input.display_name)?;

    let inserted = widget_definitions::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.display_name),
        description: Set(input.description),
        widget_type_id: Set(widget_type.id),
        data_source_config: Set(config.to_json()),
        created_by: Set(created_by),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        widget_id = %inserted.id,
        kind = %kind,
        series = config.series().len(),
        "widget_created"
    );
    Ok(inserted.id)
}
