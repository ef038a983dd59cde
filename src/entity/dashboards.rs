use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dashboards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
    pub is_active: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub grid_config: Json,
    pub version: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::dashboard_layouts::Entity")]
    Layouts,
}

impl Related<super::dashboard_layouts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Layouts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
