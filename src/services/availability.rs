use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::entities::availability;
use crate::errors::ServiceError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSlotRequest {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateSlotRequest {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Clone)]
pub struct AvailabilityService {
    db: Arc<DbPool>,
}

impl AvailabilityService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_slots(
        &self,
        available_only: bool,
    ) -> Result<Vec<availability::Model>, ServiceError> {
        let mut query = availability::Entity::find()
            .order_by_asc(availability::Column::Date)
            .order_by_asc(availability::Column::StartTime);
        if available_only {
            query = query.filter(availability::Column::IsBooked.eq(false));
        }
        Ok(query.all(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_slot(&self, slot_id: i64) -> Result<availability::Model, ServiceError> {
        availability::Entity::find_by_id(slot_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Availability slot with id {slot_id} not found"))
            })
    }

    #[instrument(skip(self, request))]
    pub async fn create_slot(
        &self,
        request: CreateSlotRequest,
    ) -> Result<availability::Model, ServiceError> {
        let date = request
            .date
            .ok_or_else(|| ServiceError::ValidationError("date is required".to_string()))?;
        let start_time = request
            .start_time
            .ok_or_else(|| ServiceError::ValidationError("start_time is required".to_string()))?;
        let end_time = request
            .end_time
            .ok_or_else(|| ServiceError::ValidationError("end_time is required".to_string()))?;
        ensure_ordered(start_time, end_time)?;

        Ok(availability::ActiveModel {
            date: Set(date),
            start_time: Set(start_time),
            end_time: Set(end_time),
            is_booked: Set(false),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?)
    }

    #[instrument(skip(self, request), fields(slot_id = %slot_id))]
    pub async fn update_slot(
        &self,
        slot_id: i64,
        request: UpdateSlotRequest,
    ) -> Result<availability::Model, ServiceError> {
        let existing = self.get_slot(slot_id).await?;

        let start_time = request.start_time.unwrap_or(existing.start_time);
        let end_time = request.end_time.unwrap_or(existing.end_time);
        ensure_ordered(start_time, end_time)?;

        let mut active: availability::ActiveModel = existing.into();
        if let Some(date) = request.date {
            active.date = Set(date);
        }
        active.start_time = Set(start_time);
        active.end_time = Set(end_time);
        Ok(active.update(&*self.db).await?)
    }

    /// Booked slots are anchored by an appointment and cannot be removed.
    #[instrument(skip(self))]
    pub async fn delete_slot(&self, slot_id: i64) -> Result<(), ServiceError> {
        let existing = self.get_slot(slot_id).await?;
        if existing.is_booked {
            return Err(ServiceError::BusinessRule(format!(
                "availability slot {slot_id} is booked and cannot be deleted"
            )));
        }
        availability::Entity::delete_by_id(slot_id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }
}

fn ensure_ordered(start_time: NaiveTime, end_time: NaiveTime) -> Result<(), ServiceError> {
    if start_time >= end_time {
        return Err(ServiceError::ValidationError(
            "start_time must be before end_time".to_string(),
        ));
    }
    Ok(())
}
