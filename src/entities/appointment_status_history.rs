use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Append-only audit trail of every status an appointment has held,
/// including the initial PENDING entry written at booking time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "appointment_status_history")]
#[schema(as = AppointmentStatusHistoryEntry)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub history_id: i64,
    pub appointment_id: i64,
    pub status: String,
    pub changed_at: DateTime<Utc>,
    pub changed_by_user_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::appointment::Entity",
        from = "Column::AppointmentId",
        to = "super::appointment::Column::AppointmentId"
    )]
    Appointment,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ChangedByUserId",
        to = "super::user::Column::UserId"
    )]
    ChangedBy,
}

impl Related<super::appointment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointment.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChangedBy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
