use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "widget_definitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub widget_type_id: i32,
    /// Shape depends on the widget type, see `crate::widget::DataSourceConfig`.
    #[sea_orm(column_type = "JsonBinary")]
    pub data_source_config: Json,
    pub created_by: Uuid,
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::widget_types::Entity",
        from = "Column::WidgetTypeId",
        to = "super::widget_types::Column::Id"
    )]
    WidgetType,
    #[sea_orm(has_many = "super::dashboard_layouts::Entity")]
    Layouts,
}

impl Related<super::widget_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WidgetType.def()
    }
}

impl Related<super::dashboard_layouts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Layouts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
