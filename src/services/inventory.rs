use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::financial_log::LogType;
use crate::entities::{inventory_item, service_inventory_usage};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::financial_logs;

/// One item whose on-hand quantity cannot cover a service's configured usage.
#[derive(Debug, Clone)]
pub struct Shortfall {
    pub item_id: i64,
    pub item_name: String,
    pub required: i32,
    pub available: i32,
}

/// Returns every usage row of the service whose requirement exceeds the
/// on-hand quantity. An empty result means the service can be confirmed.
pub async fn shortfalls_for_service<C: ConnectionTrait>(
    db: &C,
    service_id: i64,
) -> Result<Vec<Shortfall>, ServiceError> {
    let usages = service_inventory_usage::Entity::find()
        .filter(service_inventory_usage::Column::ServiceId.eq(service_id))
        .all(db)
        .await?;

    let mut shortfalls = Vec::new();
    for usage in usages {
        let item = inventory_item::Entity::find_by_id(usage.item_id)
            .one(db)
            .await?;
        match item {
            Some(item) if item.quantity >= usage.quantity_used => {}
            Some(item) => shortfalls.push(Shortfall {
                item_id: item.item_id,
                item_name: item.item_name,
                required: usage.quantity_used,
                available: item.quantity,
            }),
            None => shortfalls.push(Shortfall {
                item_id: usage.item_id,
                item_name: format!("item {}", usage.item_id),
                required: usage.quantity_used,
                available: 0,
            }),
        }
    }
    Ok(shortfalls)
}

/// True iff every usage row of the service is covered by on-hand stock.
pub async fn check_availability<C: ConnectionTrait>(
    db: &C,
    service_id: i64,
) -> Result<bool, ServiceError> {
    Ok(shortfalls_for_service(db, service_id).await?.is_empty())
}

/// Deducts every usage row of the service from stock. Each item is deducted
/// with a guarded conditional update so the quantity can never go negative,
/// even under concurrent confirmations; zero rows affected aborts the whole
/// operation. Returns the (item_id, quantity) pairs actually deducted.
pub async fn deduct_for_service<C: ConnectionTrait>(
    db: &C,
    service_id: i64,
) -> Result<Vec<(i64, i32)>, ServiceError> {
    let usages = service_inventory_usage::Entity::find()
        .filter(service_inventory_usage::Column::ServiceId.eq(service_id))
        .all(db)
        .await?;

    let mut deducted = Vec::with_capacity(usages.len());
    for usage in usages {
        let result = inventory_item::Entity::update_many()
            .col_expr(
                inventory_item::Column::Quantity,
                Expr::col(inventory_item::Column::Quantity).sub(usage.quantity_used),
            )
            .filter(inventory_item::Column::ItemId.eq(usage.item_id))
            .filter(inventory_item::Column::Quantity.gte(usage.quantity_used))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::BusinessRule(format!(
                "insufficient inventory: item {} cannot cover {} units",
                usage.item_id, usage.quantity_used
            )));
        }
        deducted.push((usage.item_id, usage.quantity_used));
    }
    Ok(deducted)
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateInventoryItemRequest {
    #[validate(length(min = 1, message = "item_name is required"))]
    pub item_name: String,
    #[validate(range(min = 0, message = "quantity must be non-negative"))]
    #[serde(default)]
    pub quantity: i32,
    pub unit_cost: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateInventoryItemRequest {
    #[validate(length(min = 1, message = "item_name must not be empty"))]
    pub item_name: Option<String>,
    pub unit_cost: Option<Decimal>,
    /// New absolute quantity; increases are logged as inventory expenses.
    #[validate(range(min = 0, message = "quantity must be non-negative"))]
    pub quantity: Option<i32>,
}

/// Admin-facing stock management. Confirmation-time deduction goes through
/// the module-level helpers inside the appointment transaction instead.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
    events: EventSender,
}

impl InventoryService {
    pub fn new(db: Arc<DbPool>, events: EventSender) -> Self {
        Self { db, events }
    }

    #[instrument(skip(self))]
    pub async fn list_items(&self) -> Result<Vec<inventory_item::Model>, ServiceError> {
        Ok(inventory_item::Entity::find()
            .order_by_asc(inventory_item::Column::ItemId)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, item_id: i64) -> Result<inventory_item::Model, ServiceError> {
        inventory_item::Entity::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Inventory item with id {item_id} not found"))
            })
    }

    /// Creates an item. A non-zero initial quantity with a positive unit
    /// cost is treated as a purchase and logged as an expense.
    #[instrument(skip(self, request), fields(item_name = %request.item_name))]
    pub async fn create_item(
        &self,
        request: CreateInventoryItemRequest,
    ) -> Result<inventory_item::Model, ServiceError> {
        request.validate()?;
        if request.unit_cost < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "unit_cost must be non-negative".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let created = inventory_item::ActiveModel {
            item_name: Set(request.item_name),
            quantity: Set(request.quantity),
            unit_cost: Set(request.unit_cost),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if created.quantity > 0 && created.unit_cost > Decimal::ZERO {
            let cost = created.unit_cost * Decimal::from(created.quantity);
            financial_logs::append(
                &txn,
                LogType::Expense,
                Some("inventory"),
                Some(created.item_id),
                Some(format!(
                    "Initial stock of {} x{}",
                    created.item_name, created.quantity
                )),
                cost,
            )
            .await?;
        }

        txn.commit().await?;

        info!(item_id = created.item_id, "inventory item created");
        self.events
            .publish(Event::InventoryRestocked {
                item_id: created.item_id,
                quantity: created.quantity,
            })
            .await;

        Ok(created)
    }

    /// Updates an item; a quantity increase is logged as a restock expense
    /// priced at the item's unit cost.
    #[instrument(skip(self, request), fields(item_id = %item_id))]
    pub async fn update_item(
        &self,
        item_id: i64,
        request: UpdateInventoryItemRequest,
    ) -> Result<inventory_item::Model, ServiceError> {
        request.validate()?;
        if matches!(request.unit_cost, Some(cost) if cost < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "unit_cost must be non-negative".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let existing = inventory_item::Entity::find_by_id(item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Inventory item with id {item_id} not found"))
            })?;

        let old_quantity = existing.quantity;
        let unit_cost = request.unit_cost.unwrap_or(existing.unit_cost);
        let item_name = request.item_name.unwrap_or_else(|| existing.item_name.clone());

        let mut active: inventory_item::ActiveModel = existing.into();
        active.item_name = Set(item_name);
        active.unit_cost = Set(unit_cost);
        if let Some(quantity) = request.quantity {
            active.quantity = Set(quantity);
        }
        let updated = active.update(&txn).await?;

        let added = updated.quantity - old_quantity;
        if added > 0 && updated.unit_cost > Decimal::ZERO {
            financial_logs::append(
                &txn,
                LogType::Expense,
                Some("inventory"),
                Some(updated.item_id),
                Some(format!("Restock of {} x{}", updated.item_name, added)),
                updated.unit_cost * Decimal::from(added),
            )
            .await?;
        }

        txn.commit().await?;

        if added > 0 {
            self.events
                .publish(Event::InventoryRestocked {
                    item_id: updated.item_id,
                    quantity: added,
                })
                .await;
        }

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, item_id: i64) -> Result<(), ServiceError> {
        let result = inventory_item::Entity::delete_by_id(item_id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Inventory item with id {item_id} not found"
            )));
        }
        Ok(())
    }
}
