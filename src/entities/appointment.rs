use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "appointments")]
#[schema(as = Appointment)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub appointment_id: i64,
    pub service_id: i64,
    /// Unique: at most one appointment per availability slot.
    #[sea_orm(unique)]
    pub slot_id: i64,
    pub client_name: String,
    pub client_email: String,
    #[sea_orm(column_type = "Text")]
    pub client_address: String,
    pub appointment_date_time: DateTime<Utc>,
    pub status: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub travel_fee: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub total_price: Option<Decimal>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tan_service::Entity",
        from = "Column::ServiceId",
        to = "super::tan_service::Column::ServiceId"
    )]
    Service,
    #[sea_orm(
        belongs_to = "super::availability::Entity",
        from = "Column::SlotId",
        to = "super::availability::Column::SlotId"
    )]
    Slot,
    #[sea_orm(has_many = "super::appointment_status_history::Entity")]
    StatusHistory,
    #[sea_orm(has_one = "super::receipt::Entity")]
    Receipt,
}

impl Related<super::tan_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<super::availability::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Slot.def()
    }
}

impl Related<super::appointment_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistory.def()
    }
}

impl Related<super::receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Appointment lifecycle states. Persisted as their SCREAMING_SNAKE_CASE
/// string form in the `status` column.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::AppointmentStatus;

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            let stored = status.to_string();
            assert_eq!(AppointmentStatus::from_str(&stored).unwrap(), status);
        }
    }

    #[test]
    fn status_storage_form_is_screaming_snake_case() {
        assert_eq!(AppointmentStatus::Confirmed.to_string(), "CONFIRMED");
        assert_eq!(AppointmentStatus::Pending.to_string(), "PENDING");
    }
}
