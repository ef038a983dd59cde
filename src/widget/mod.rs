//! Typed widget configuration and request filters.
//!
//! Stored `dataSourceConfig` blobs are validated into [`DataSourceConfig`]
//! as soon as a widget definition is loaded; the resolvers never read the raw
//! JSON.

mod config;
mod filters;
mod values;

pub use config::{
    DataSourceConfig, DonutChartConfig, KpiConfig, LayoutConfig, LineChartConfig, MapConfig,
    SeriesConfig, WidgetConfigError, WidgetKind,
};
pub use filters::{FilterEcho, Scope, TimeRange, WidgetDataQuery, WidgetFilters};
pub use values::{Aggregate, latest_value, mean_of_present, series_value};
