use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// On-hand stock of a consumable. Quantity never goes negative; deductions
/// run as guarded conditional updates.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory_items")]
#[schema(as = InventoryItem)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub unit_cost: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_inventory_usage::Entity")]
    ServiceUsage,
}

impl Related<super::service_inventory_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceUsage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
