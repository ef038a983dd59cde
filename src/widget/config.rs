use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
pub enum WidgetConfigError {
    #[error("unknown widget type '{0}'")]
    UnknownKind(String),

    #[error("invalid {kind} configuration: {source}")]
    Shape {
        kind: WidgetKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate series display name '{0}'")]
    DuplicateSeries(String),

    #[error("invalid layout: {0}")]
    Layout(String),
}

/// Rendering kind, matching `widget_types.name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    LineChart,
    Kpi,
    DonutChart,
    Map,
}

impl WidgetKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LineChart => "line_chart",
            Self::Kpi => "kpi",
            Self::DonutChart => "donut_chart",
            Self::Map => "map",
        }
    }

    /// # Errors
    ///
    /// Returns `WidgetConfigError::UnknownKind` for names outside the catalog.
    pub fn parse(name: &str) -> Result<Self, WidgetConfigError> {
        match name {
            "line_chart" => Ok(Self::LineChart),
            "kpi" => Ok(Self::Kpi),
            "donut_chart" => Ok(Self::DonutChart),
            "map" => Ok(Self::Map),
            other => Err(WidgetConfigError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One measured property rendered as a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesConfig {
    #[serde(default)]
    pub property_id: Option<i32>,
    pub property_name: String,
    pub display_name: String,
    /// Key looked up in each reading's `data` object.
    pub data_source_property: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_data_type")]
    pub data_type: String,
}

fn default_data_type() -> String {
    "number".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChartConfig {
    pub device_type_id: Option<i32>,
    #[serde(default)]
    pub number_of_series: usize,
    #[serde(default)]
    pub series_config: Vec<SeriesConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiConfig {
    #[serde(default)]
    pub device_type_id: Option<i32>,
    pub metric: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub title: String,
    /// Display hints (precision, thresholds, colors) passed through untouched.
    #[serde(flatten)]
    pub display: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonutChartConfig {
    #[serde(default)]
    pub device_type_id: Option<i32>,
    pub metrics: Vec<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    #[serde(default = "default_true")]
    pub show_devices: bool,
    #[serde(default = "default_true")]
    pub show_statistics: bool,
}

fn default_true() -> bool {
    true
}

/// Validated `dataSourceConfig`, one case per widget kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSourceConfig {
    LineChart(LineChartConfig),
    Kpi(KpiConfig),
    DonutChart(DonutChartConfig),
    Map(MapConfig),
}

impl DataSourceConfig {
    /// Validate a stored JSON blob against the shape its widget kind requires.
    ///
    /// # Errors
    ///
    /// Returns `WidgetConfigError::Shape` when the JSON does not match, and
    /// `WidgetConfigError::DuplicateSeries` when two series would share a
    /// response key.
    pub fn parse(kind: WidgetKind, raw: &Value) -> Result<Self, WidgetConfigError> {
        let shape = |source| WidgetConfigError::Shape { kind, source };
        let config = match kind {
            WidgetKind::LineChart => {
                Self::LineChart(LineChartConfig::deserialize(raw).map_err(shape)?)
            }
            WidgetKind::Kpi => Self::Kpi(KpiConfig::deserialize(raw).map_err(shape)?),
            WidgetKind::DonutChart => {
                Self::DonutChart(DonutChartConfig::deserialize(raw).map_err(shape)?)
            }
            WidgetKind::Map => Self::Map(MapConfig::deserialize(raw).map_err(shape)?),
        };

        let mut seen = HashSet::new();
        for series in config.series() {
            if !seen.insert(series.display_name.clone()) {
                return Err(WidgetConfigError::DuplicateSeries(series.display_name));
            }
        }

        Ok(config)
    }

    #[must_use]
    pub fn kind(&self) -> WidgetKind {
        match self {
            Self::LineChart(_) => WidgetKind::LineChart,
            Self::Kpi(_) => WidgetKind::Kpi,
            Self::DonutChart(_) => WidgetKind::DonutChart,
            Self::Map(_) => WidgetKind::Map,
        }
    }

    #[must_use]
    pub fn device_type_id(&self) -> Option<i32> {
        match self {
            Self::LineChart(c) => c.device_type_id,
            Self::Kpi(c) => c.device_type_id,
            Self::DonutChart(c) => c.device_type_id,
            Self::Map(_) => None,
        }
    }

    /// Series descriptors in configuration order.
    ///
    /// KPI and donut widgets name their properties directly, so each metric
    /// becomes a series keyed by its own name. Map widgets carry no series.
    #[must_use]
    pub fn series(&self) -> Vec<SeriesConfig> {
        match self {
            Self::LineChart(c) => c.series_config.clone(),
            Self::Kpi(c) => vec![metric_series(&c.metric, &c.unit)],
            Self::DonutChart(c) => c
                .metrics
                .iter()
                .map(|metric| metric_series(metric, &c.unit))
                .collect(),
            Self::Map(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        let value = match self {
            Self::LineChart(c) => serde_json::to_value(c),
            Self::Kpi(c) => serde_json::to_value(c),
            Self::DonutChart(c) => serde_json::to_value(c),
            Self::Map(c) => serde_json::to_value(c),
        };
        // Plain structs with string keys always serialize.
        value.unwrap_or(Value::Null)
    }
}

fn metric_series(metric: &str, unit: &str) -> SeriesConfig {
    SeriesConfig {
        property_id: None,
        property_name: metric.to_string(),
        display_name: metric.to_string(),
        data_source_property: metric.to_string(),
        unit: unit.to_string(),
        data_type: default_data_type(),
    }
}

/// Grid placement of a widget instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

impl LayoutConfig {
    /// # Errors
    ///
    /// Returns `WidgetConfigError::Layout` for zero sizes or a size below its minimum.
    pub fn validate(&self) -> Result<(), WidgetConfigError> {
        if self.w == 0 || self.h == 0 {
            return Err(WidgetConfigError::Layout(
                "w and h must be greater than zero".to_string(),
            ));
        }
        if self.min_w.is_some_and(|min| self.w < min) || self.min_h.is_some_and(|min| self.h < min)
        {
            return Err(WidgetConfigError::Layout(
                "w and h must not be smaller than minW and minH".to_string(),
            ));
        }
        Ok(())
    }
}
