use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::services::dashboard::{DashboardSummary, WidgetView};
use crate::widget::LayoutConfig;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDashboardResponse {
    pub dashboard: DashboardSummary,
    pub widgets: Vec<WidgetView>,
    /// True for admins
    pub can_edit: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct AvailableWidgetsQuery {
    /// Device type whose properties are listed
    pub device_type_id: Option<String>,
}

// Required fields are optional here so that missing ones are reported together.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWidgetRequest {
    pub device_type_id: Option<i32>,
    pub widget_type_id: Option<i32>,
    pub property_ids: Option<Vec<i32>>,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWidgetResponse {
    pub widget_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToDashboardRequest {
    pub widget_definition_id: Option<Uuid>,
    pub layout_config: Option<LayoutConfig>,
    /// Per-placement overrides, stored as given
    pub instance_config: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToDashboardResponse {
    pub layout_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LayoutUpdate {
    pub layout_id: Option<Uuid>,
    pub layout_config: Option<LayoutConfig>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLayoutRequest {
    pub layouts: Option<Vec<LayoutUpdate>>,
}
