use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A measured property reported by every device of a type.
///
/// `tag` is the key under which the value appears in a reading's `data`
/// object; `name` is the human-readable label.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "device_type_properties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub device_type_id: i32,
    pub name: String,
    pub tag: String,
    pub unit: Option<String>,
    pub data_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::device_types::Entity",
        from = "Column::DeviceTypeId",
        to = "super::device_types::Column::Id"
    )]
    DeviceType,
}

impl Related<super::device_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeviceType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
