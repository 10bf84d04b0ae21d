use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
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

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::entities::appointment::{self, AppointmentStatus};
use crate::entities::financial_log::LogType;
use crate::entities::{appointment_status_history, availability, tan_service};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::{financial_logs, inventory, receipts};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAppointmentRequest {
    pub service_id: Option<i64>,
    pub slot_id: Option<i64>,
    pub client_name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub client_email: Option<String>,
    pub client_address: Option<String>,
    pub appointment_date_time: Option<DateTime<Utc>>,
    pub travel_fee: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAppointmentRequest {
    pub service_id: Option<i64>,
    pub client_name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub client_email: Option<String>,
    pub client_address: Option<String>,
    pub appointment_date_time: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub travel_fee: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Owns the appointment lifecycle, including the confirmation workflow:
/// status history, inventory deduction, receipt issuance, and revenue
/// logging are committed in one transaction or not at all.
#[derive(Clone)]
pub struct AppointmentService {
    db: Arc<DbPool>,
    events: EventSender,
}

impl AppointmentService {
    pub fn new(db: Arc<DbPool>, events: EventSender) -> Self {
        Self { db, events }
    }

    #[instrument(skip(self))]
    pub async fn list_appointments(&self) -> Result<Vec<appointment::Model>, ServiceError> {
        Ok(appointment::Entity::find()
            .order_by_asc(appointment::Column::AppointmentId)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_appointment(
        &self,
        appointment_id: i64,
    ) -> Result<Option<appointment::Model>, ServiceError> {
        Ok(appointment::Entity::find_by_id(appointment_id)
            .one(&*self.db)
            .await?)
    }

    /// Appointments whose client email matches the authenticated caller.
    #[instrument(skip(self))]
    pub async fn list_for_client(
        &self,
        client_email: &str,
    ) -> Result<Vec<appointment::Model>, ServiceError> {
        Ok(appointment::Entity::find()
            .filter(appointment::Column::ClientEmail.eq(client_email))
            .order_by_asc(appointment::Column::AppointmentId)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn status_history(
        &self,
        appointment_id: i64,
    ) -> Result<Vec<appointment_status_history::Model>, ServiceError> {
        Ok(appointment_status_history::Entity::find()
            .filter(appointment_status_history::Column::AppointmentId.eq(appointment_id))
            .order_by_asc(appointment_status_history::Column::HistoryId)
            .all(&*self.db)
            .await?)
    }

    /// Books an appointment: claims the slot, persists the record with
    /// status PENDING, and writes the initial history entry.
    #[instrument(skip(self, request))]
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<appointment::Model, ServiceError> {
        request.validate()?;

        let service_id = required(request.service_id, "service_id")?;
        let slot_id = required(request.slot_id, "slot_id")?;
        let client_name = required_text(&request.client_name, "client_name")?;
        let client_email = required_text(&request.client_email, "client_email")?;
        let client_address = required_text(&request.client_address, "client_address")?;
        let appointment_date_time = required(request.appointment_date_time, "appointment_date_time")?;
        ensure_non_negative(request.travel_fee, "travel_fee")?;
        ensure_non_negative(request.total_price, "total_price")?;

        let txn = self.db.begin().await?;

        let service = tan_service::Entity::find_by_id(service_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("service {service_id} does not exist"))
            })?;
        if !service.is_active {
            return Err(ServiceError::BusinessRule(format!(
                "service '{}' is not currently offered",
                service.name
            )));
        }

        availability::Entity::find_by_id(slot_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "availability slot {slot_id} does not exist"
                ))
            })?;
        claim_slot(&txn, slot_id).await?;

        let total_price = request
            .total_price
            .unwrap_or_else(|| estimate_total(service.base_price, request.travel_fee));

        let created = appointment::ActiveModel {
            service_id: Set(service_id),
            slot_id: Set(slot_id),
            client_name: Set(client_name),
            client_email: Set(client_email),
            client_address: Set(client_address),
            appointment_date_time: Set(appointment_date_time),
            status: Set(AppointmentStatus::Pending.to_string()),
            travel_fee: Set(request.travel_fee),
            total_price: Set(Some(total_price)),
            notes: Set(request.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        record_status(&txn, created.appointment_id, AppointmentStatus::Pending, None).await?;

        txn.commit().await?;

        info!(
            appointment_id = created.appointment_id,
            service_id, slot_id, "appointment booked"
        );
        self.events
            .publish(Event::AppointmentCreated {
                appointment_id: created.appointment_id,
            })
            .await;

        Ok(created)
    }

    /// Applies field updates and, when the status changes, the transition
    /// side effects described in the workflow: history entry always; on
    /// CONFIRMED, inventory check + deduction, one receipt, one revenue log;
    /// on CANCELLED, slot release. Any failure rolls everything back.
    #[instrument(skip(self, request, actor), fields(appointment_id = %appointment_id))]
    pub async fn update_appointment(
        &self,
        appointment_id: i64,
        request: UpdateAppointmentRequest,
        actor: &AuthUser,
    ) -> Result<appointment::Model, ServiceError> {
        request.validate()?;

        let client_name = required_text(&request.client_name, "client_name")?;
        let client_address = required_text(&request.client_address, "client_address")?;
        ensure_non_negative(request.travel_fee, "travel_fee")?;
        ensure_non_negative(request.total_price, "total_price")?;

        let txn = self.db.begin().await?;

        let existing = appointment::Entity::find_by_id(appointment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Appointment with id {appointment_id} not found"
                ))
            })?;

        let old_status = parse_status(&existing.status)?;
        let new_status = request.status.unwrap_or(old_status);

        let service_id = request.service_id.unwrap_or(existing.service_id);
        let service = tan_service::Entity::find_by_id(service_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("service {service_id} does not exist"))
            })?;

        let effective_total = request.total_price.or(existing.total_price);
        let effective_travel = request.travel_fee.or(existing.travel_fee);

        let mut active: appointment::ActiveModel = existing.clone().into();
        active.service_id = Set(service_id);
        active.client_name = Set(client_name);
        active.client_address = Set(client_address);
        if let Some(email) = request.client_email {
            active.client_email = Set(email);
        }
        if let Some(date_time) = request.appointment_date_time {
            active.appointment_date_time = Set(date_time);
        }
        if request.travel_fee.is_some() {
            active.travel_fee = Set(request.travel_fee);
        }
        if request.total_price.is_some() {
            active.total_price = Set(request.total_price);
        }
        if request.notes.is_some() {
            active.notes = Set(request.notes);
        }
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(Utc::now()));

        let mut deducted: Vec<(i64, i32)> = Vec::new();
        let mut issued: Option<(i64, Decimal)> = None;

        if new_status != old_status {
            record_status(&txn, appointment_id, new_status, Some(actor.user_id)).await?;

            if new_status == AppointmentStatus::Confirmed {
                let shortfalls = inventory::shortfalls_for_service(&txn, service_id).await?;
                if let Some(short) = shortfalls.first() {
                    return Err(ServiceError::BusinessRule(format!(
                        "insufficient inventory for service '{}': item '{}' requires {} but only {} on hand",
                        service.name, short.item_name, short.required, short.available
                    )));
                }
                deducted = inventory::deduct_for_service(&txn, service_id).await?;

                // Re-confirmation after a cancellation must not issue a
                // second receipt; the history entry above still stands.
                if receipts::find_by_appointment(&txn, appointment_id)
                    .await?
                    .is_none()
                {
                    let amount =
                        receipt_amount(effective_total, service.base_price, effective_travel);
                    let receipt = receipts::create_unpaid(&txn, appointment_id, amount).await?;
                    financial_logs::append(
                        &txn,
                        LogType::Revenue,
                        Some("appointment"),
                        Some(appointment_id),
                        Some(format!("Revenue for appointment #{appointment_id}")),
                        amount,
                    )
                    .await?;
                    issued = Some((receipt.receipt_id, amount));
                }
            }

            if new_status == AppointmentStatus::Cancelled {
                release_slot(&txn, existing.slot_id).await?;
            } else if old_status == AppointmentStatus::Cancelled {
                claim_slot(&txn, existing.slot_id).await?;
            }
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        if new_status != old_status {
            info!(
                appointment_id,
                old_status = %old_status,
                new_status = %new_status,
                "appointment status changed"
            );
            self.events
                .publish(Event::AppointmentStatusChanged {
                    appointment_id,
                    old_status: old_status.to_string(),
                    new_status: new_status.to_string(),
                })
                .await;
            for (item_id, quantity) in deducted {
                self.events
                    .publish(Event::InventoryDeducted { item_id, quantity })
                    .await;
            }
            if let Some((receipt_id, total_amount)) = issued {
                self.events
                    .publish(Event::AppointmentConfirmed {
                        appointment_id,
                        receipt_id,
                        total_amount,
                    })
                    .await;
            }
            if new_status == AppointmentStatus::Cancelled {
                self.events
                    .publish(Event::SlotReleased {
                        slot_id: existing.slot_id,
                    })
                    .await;
            }
        }

        Ok(updated)
    }

    /// Removes an appointment and its owned history chain (and receipt, via
    /// cascade), releasing the slot for rebooking.
    #[instrument(skip(self))]
    pub async fn delete_appointment(&self, appointment_id: i64) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let existing = appointment::Entity::find_by_id(appointment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Appointment with id {appointment_id} not found"
                ))
            })?;

        release_slot(&txn, existing.slot_id).await?;
        appointment::Entity::delete_by_id(appointment_id)
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!(appointment_id, "appointment deleted");
        self.events
            .publish(Event::AppointmentDeleted { appointment_id })
            .await;
        Ok(())
    }
}

/// The amount billed at confirmation: the stored total when present,
/// otherwise the service base price plus any travel fee.
fn receipt_amount(
    total_price: Option<Decimal>,
    base_price: Decimal,
    travel_fee: Option<Decimal>,
) -> Decimal {
    total_price.unwrap_or_else(|| estimate_total(base_price, travel_fee))
}

fn estimate_total(base_price: Decimal, travel_fee: Option<Decimal>) -> Decimal {
    base_price + travel_fee.unwrap_or(Decimal::ZERO)
}

fn parse_status(raw: &str) -> Result<AppointmentStatus, ServiceError> {
    AppointmentStatus::from_str(raw)
        .map_err(|_| ServiceError::InternalError(format!("unknown appointment status: {raw}")))
}

async fn record_status<C: ConnectionTrait>(
    db: &C,
    appointment_id: i64,
    status: AppointmentStatus,
    changed_by_user_id: Option<i64>,
) -> Result<(), ServiceError> {
    appointment_status_history::ActiveModel {
        appointment_id: Set(appointment_id),
        status: Set(status.to_string()),
        changed_at: Set(Utc::now()),
        changed_by_user_id: Set(changed_by_user_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Guarded flip to booked; losing the race to another booking is a
/// business-rule rejection, not a partial write.
async fn claim_slot<C: ConnectionTrait>(db: &C, slot_id: i64) -> Result<(), ServiceError> {
    let result = availability::Entity::update_many()
        .col_expr(availability::Column::IsBooked, Expr::value(true))
        .filter(availability::Column::SlotId.eq(slot_id))
        .filter(availability::Column::IsBooked.eq(false))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::BusinessRule(format!(
            "availability slot {slot_id} is already booked"
        )));
    }
    Ok(())
}

async fn release_slot<C: ConnectionTrait>(db: &C, slot_id: i64) -> Result<(), ServiceError> {
    availability::Entity::update_many()
        .col_expr(availability::Column::IsBooked, Expr::value(false))
        .filter(availability::Column::SlotId.eq(slot_id))
        .exec(db)
        .await?;
    Ok(())
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::ValidationError(format!("{field} is required")))
}

fn required_text(value: &Option<String>, field: &str) -> Result<String, ServiceError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ServiceError::ValidationError(format!("{field} is required")))
}

fn ensure_non_negative(value: Option<Decimal>, field: &str) -> Result<(), ServiceError> {
    match value {
        Some(amount) if amount < Decimal::ZERO => Err(ServiceError::ValidationError(format!(
            "{field} must be non-negative"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn receipt_amount_prefers_stored_total() {
        assert_eq!(
            receipt_amount(Some(dec!(100.00)), dec!(50.00), Some(dec!(50.00))),
            dec!(100.00)
        );
    }

    #[test]
    fn receipt_amount_falls_back_to_base_plus_travel() {
        assert_eq!(
            receipt_amount(None, dec!(50.00), Some(dec!(25.00))),
            dec!(75.00)
        );
        assert_eq!(receipt_amount(None, dec!(50.00), None), dec!(50.00));
    }

    #[test]
    fn required_text_rejects_blank_and_missing() {
        assert!(required_text(&None, "client_name").is_err());
        assert!(required_text(&Some("   ".to_string()), "client_name").is_err());
        assert_eq!(
            required_text(&Some("  Brenna ".to_string()), "client_name").unwrap(),
            "Brenna"
        );
    }

    #[test]
    fn negative_money_is_rejected() {
        assert!(ensure_non_negative(Some(dec!(-1)), "travel_fee").is_err());
        assert!(ensure_non_negative(Some(dec!(0)), "travel_fee").is_ok());
        assert!(ensure_non_negative(None, "travel_fee").is_ok());
    }

    #[test]
    fn corrupt_status_surfaces_as_internal_error() {
        assert!(parse_status("PENDING").is_ok());
        assert!(matches!(
            parse_status("LIMBO"),
            Err(ServiceError::InternalError(_))
        ));
    }
}
