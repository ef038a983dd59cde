use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dashboard_layouts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dashboard_id: Uuid,
    pub widget_definition_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub layout_config: Json,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub instance_config: Option<Json>,
    pub display_order: i32,
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dashboards::Entity",
        from = "Column::DashboardId",
        to = "super::dashboards::Column::Id"
    )]
    Dashboard,
    #[sea_orm(
        belongs_to = "super::widget_definitions::Entity",
        from = "Column::WidgetDefinitionId",
        to = "super::widget_definitions::Column::Id"
    )]
    WidgetDefinition,
}

impl Related<super::dashboards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dashboard.def()
    }
}

impl Related<super::widget_definitions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WidgetDefinition.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
