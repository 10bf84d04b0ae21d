use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::UserId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TanServices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TanServices::ServiceId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TanServices::Name).string().not_null())
                    .col(ColumnDef::new(TanServices::Description).text().null())
                    .col(
                        ColumnDef::new(TanServices::BasePrice)
                            .decimal_len(10, 2)
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(TanServices::DurationMinutes)
                            .integer()
                            .not_null()
                            .default(30),
                    )
                    .col(
                        ColumnDef::new(TanServices::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TanServices::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AvailabilitySlots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AvailabilitySlots::SlotId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AvailabilitySlots::Date).date().not_null())
                    .col(
                        ColumnDef::new(AvailabilitySlots::StartTime)
                            .time()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AvailabilitySlots::EndTime).time().not_null())
                    .col(
                        ColumnDef::new(AvailabilitySlots::IsBooked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Appointments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Appointments::AppointmentId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Appointments::ServiceId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::SlotId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Appointments::ClientName).string().not_null())
                    .col(
                        ColumnDef::new(Appointments::ClientEmail)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::ClientAddress)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::AppointmentDateTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Appointments::TravelFee)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::TotalPrice)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .col(ColumnDef::new(Appointments::Notes).text().null())
                    .col(
                        ColumnDef::new(Appointments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_service")
                            .from(Appointments::Table, Appointments::ServiceId)
                            .to(TanServices::Table, TanServices::ServiceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_slot")
                            .from(Appointments::Table, Appointments::SlotId)
                            .to(AvailabilitySlots::Table, AvailabilitySlots::SlotId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AppointmentStatusHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppointmentStatusHistory::HistoryId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AppointmentStatusHistory::AppointmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppointmentStatusHistory::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppointmentStatusHistory::ChangedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppointmentStatusHistory::ChangedByUserId)
                            .big_integer()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_history_appointment")
                            .from(
                                AppointmentStatusHistory::Table,
                                AppointmentStatusHistory::AppointmentId,
                            )
                            .to(Appointments::Table, Appointments::AppointmentId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_status_history_appointment")
                    .table(AppointmentStatusHistory::Table)
                    .col(AppointmentStatusHistory::AppointmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_client_email")
                    .table(Appointments::Table)
                    .col(Appointments::ClientEmail)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(AppointmentStatusHistory::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Appointments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AvailabilitySlots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TanServices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    UserId,
    Name,
    Email,
    PasswordHash,
    IsAdmin,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum TanServices {
    Table,
    ServiceId,
    Name,
    Description,
    BasePrice,
    DurationMinutes,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum AvailabilitySlots {
    Table,
    SlotId,
    Date,
    StartTime,
    EndTime,
    IsBooked,
}

#[derive(DeriveIden)]
pub enum Appointments {
    Table,
    AppointmentId,
    ServiceId,
    SlotId,
    ClientName,
    ClientEmail,
    ClientAddress,
    AppointmentDateTime,
    Status,
    TravelFee,
    TotalPrice,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum AppointmentStatusHistory {
    Table,
    HistoryId,
    AppointmentId,
    Status,
    ChangedAt,
    ChangedByUserId,
}
