use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{appointment, inventory_item, service_inventory_usage, tan_service};
use crate::errors::ServiceError;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateServiceRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    #[validate(range(min = 1, message = "duration_minutes must be positive"))]
    #[serde(default = "default_duration")]
    pub duration_minutes: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_duration() -> i32 {
    30
}
fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateServiceRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<Decimal>,
    #[validate(range(min = 1, message = "duration_minutes must be positive"))]
    pub duration_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SetUsageRequest {
    #[validate(range(min = 1, message = "quantity_used must be positive"))]
    pub quantity_used: i32,
}

/// The service catalog plus per-service inventory usage configuration.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_services(
        &self,
        active_only: bool,
    ) -> Result<Vec<tan_service::Model>, ServiceError> {
        let mut query =
            tan_service::Entity::find().order_by_asc(tan_service::Column::ServiceId);
        if active_only {
            query = query.filter(tan_service::Column::IsActive.eq(true));
        }
        Ok(query.all(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_service(&self, service_id: i64) -> Result<tan_service::Model, ServiceError> {
        tan_service::Entity::find_by_id(service_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Service with id {service_id} not found"))
            })
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_service(
        &self,
        request: CreateServiceRequest,
    ) -> Result<tan_service::Model, ServiceError> {
        request.validate()?;
        if request.base_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "base_price must be non-negative".to_string(),
            ));
        }

        Ok(tan_service::ActiveModel {
            name: Set(request.name),
            description: Set(request.description),
            base_price: Set(request.base_price),
            duration_minutes: Set(request.duration_minutes),
            is_active: Set(request.is_active),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?)
    }

    #[instrument(skip(self, request), fields(service_id = %service_id))]
    pub async fn update_service(
        &self,
        service_id: i64,
        request: UpdateServiceRequest,
    ) -> Result<tan_service::Model, ServiceError> {
        request.validate()?;
        if matches!(request.base_price, Some(price) if price < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "base_price must be non-negative".to_string(),
            ));
        }

        let existing = self.get_service(service_id).await?;

        let mut active: tan_service::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if request.description.is_some() {
            active.description = Set(request.description);
        }
        if let Some(price) = request.base_price {
            active.base_price = Set(price);
        }
        if let Some(duration) = request.duration_minutes {
            active.duration_minutes = Set(duration);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        Ok(active.update(&*self.db).await?)
    }

    /// Services with booked appointments stay; deactivate them instead.
    #[instrument(skip(self))]
    pub async fn delete_service(&self, service_id: i64) -> Result<(), ServiceError> {
        self.get_service(service_id).await?;

        let referenced = appointment::Entity::find()
            .filter(appointment::Column::ServiceId.eq(service_id))
            .count(&*self.db)
            .await?;
        if referenced > 0 {
            return Err(ServiceError::BusinessRule(format!(
                "service {service_id} has appointments and cannot be deleted"
            )));
        }

        tan_service::Entity::delete_by_id(service_id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_usage(
        &self,
        service_id: i64,
    ) -> Result<Vec<service_inventory_usage::Model>, ServiceError> {
        self.get_service(service_id).await?;
        Ok(service_inventory_usage::Entity::find()
            .filter(service_inventory_usage::Column::ServiceId.eq(service_id))
            .order_by_asc(service_inventory_usage::Column::ItemId)
            .all(&*self.db)
            .await?)
    }

    /// Upserts the usage row for (service, item).
    #[instrument(skip(self, request), fields(service_id = %service_id, item_id = %item_id))]
    pub async fn set_usage(
        &self,
        service_id: i64,
        item_id: i64,
        request: SetUsageRequest,
    ) -> Result<service_inventory_usage::Model, ServiceError> {
        request.validate()?;
        self.get_service(service_id).await?;
        inventory_item::Entity::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Inventory item with id {item_id} not found"))
            })?;

        let existing = service_inventory_usage::Entity::find_by_id((service_id, item_id))
            .one(&*self.db)
            .await?;

        match existing {
            Some(row) => {
                let mut active: service_inventory_usage::ActiveModel = row.into();
                active.quantity_used = Set(request.quantity_used);
                Ok(active.update(&*self.db).await?)
            }
            None => Ok(service_inventory_usage::ActiveModel {
                service_id: Set(service_id),
                item_id: Set(item_id),
                quantity_used: Set(request.quantity_used),
            }
            .insert(&*self.db)
            .await?),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_usage(&self, service_id: i64, item_id: i64) -> Result<(), ServiceError> {
        let result = service_inventory_usage::Entity::delete_by_id((service_id, item_id))
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "No inventory usage configured for service {service_id} and item {item_id}"
            )));
        }
        Ok(())
    }
}
