use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "widget_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub component: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub default_config: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::widget_definitions::Entity")]
    WidgetDefinitions,
}

impl Related<super::widget_definitions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WidgetDefinitions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
