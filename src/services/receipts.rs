use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::receipt;
use crate::errors::ServiceError;

pub async fn find_by_appointment<C: ConnectionTrait>(
    db: &C,
    appointment_id: i64,
) -> Result<Option<receipt::Model>, ServiceError> {
    Ok(receipt::Entity::find()
        .filter(receipt::Column::AppointmentId.eq(appointment_id))
        .one(db)
        .await?)
}

/// Issues the one receipt an appointment gets, stamped "Unpaid". The unique
/// index on appointment_id backs up the caller's existence check.
pub async fn create_unpaid<C: ConnectionTrait>(
    db: &C,
    appointment_id: i64,
    total_amount: Decimal,
) -> Result<receipt::Model, ServiceError> {
    Ok(receipt::ActiveModel {
        appointment_id: Set(appointment_id),
        total_amount: Set(total_amount),
        payment_method: Set(receipt::UNPAID.to_string()),
        issued_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateReceiptRequest {
    #[validate(length(min = 1, message = "payment_method must not be empty"))]
    pub payment_method: Option<String>,
    pub total_amount: Option<Decimal>,
}

#[derive(Clone)]
pub struct ReceiptService {
    db: Arc<DbPool>,
}

impl ReceiptService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_receipts(&self) -> Result<Vec<receipt::Model>, ServiceError> {
        Ok(receipt::Entity::find()
            .order_by_asc(receipt::Column::ReceiptId)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_receipt(&self, receipt_id: i64) -> Result<receipt::Model, ServiceError> {
        receipt::Entity::find_by_id(receipt_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Receipt with id {receipt_id} not found"))
            })
    }

    #[instrument(skip(self))]
    pub async fn get_for_appointment(
        &self,
        appointment_id: i64,
    ) -> Result<receipt::Model, ServiceError> {
        find_by_appointment(&*self.db, appointment_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No receipt exists for appointment {appointment_id}"
                ))
            })
    }

    /// Settles or corrects a receipt: payment method and amount only. The
    /// appointment link never changes.
    #[instrument(skip(self, request), fields(receipt_id = %receipt_id))]
    pub async fn update_receipt(
        &self,
        receipt_id: i64,
        request: UpdateReceiptRequest,
    ) -> Result<receipt::Model, ServiceError> {
        request.validate()?;
        if matches!(request.total_amount, Some(amount) if amount < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "total_amount must be non-negative".to_string(),
            ));
        }

        let existing = self.get_receipt(receipt_id).await?;

        let mut active: receipt::ActiveModel = existing.into();
        if let Some(method) = request.payment_method {
            active.payment_method = Set(method);
        }
        if let Some(amount) = request.total_amount {
            active.total_amount = Set(amount);
        }
        Ok(active.update(&*self.db).await?)
    }
}
