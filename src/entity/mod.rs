pub mod dashboard_layouts;
pub mod dashboards;
pub mod device_latest;
pub mod device_readings;
pub mod device_type_properties;
pub mod device_types;
pub mod devices;
pub mod hierarchies;
pub mod widget_definitions;
pub mod widget_types;
