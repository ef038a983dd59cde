use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "devices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub device_type_id: i32,
    pub hierarchy_id: Uuid,
    #[sea_orm(unique)]
    pub serial_number: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub metadata: Option<Json>,
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::device_types::Entity",
        from = "Column::DeviceTypeId",
        to = "super::device_types::Column::Id"
    )]
    DeviceType,
    #[sea_orm(
        belongs_to = "super::hierarchies::Entity",
        from = "Column::HierarchyId",
        to = "super::hierarchies::Column::Id"
    )]
    Hierarchy,
    #[sea_orm(has_many = "super::device_readings::Entity")]
    Readings,
    #[sea_orm(has_one = "super::device_latest::Entity")]
    Latest,
}

impl Related<super::device_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeviceType.def()
    }
}

impl Related<super::hierarchies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hierarchy.def()
    }
}

impl Related<super::device_readings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Readings.def()
    }
}

impl Related<super::device_latest::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Latest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
