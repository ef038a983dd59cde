mod handlers;
mod types;

pub use handlers::{
    add_widget_to_dashboard, create_widget_definition, list_available_widgets, list_device_types,
    remove_widget, update_layout, user_dashboard,
};
pub use types::{
    AddToDashboardRequest, AddToDashboardResponse, CreateWidgetRequest, CreateWidgetResponse,
    LayoutUpdate, UpdateLayoutRequest, UserDashboardResponse,
};

// Re-export utoipa path structs for OpenAPI documentation
pub use handlers::{
    __path_add_widget_to_dashboard, __path_create_widget_definition, __path_list_available_widgets,
    __path_list_device_types, __path_remove_widget, __path_update_layout, __path_user_dashboard,
};
