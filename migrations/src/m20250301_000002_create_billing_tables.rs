use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_booking_tables::{Appointments, TanServices};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InventoryItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryItems::ItemId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InventoryItems::ItemName).string().not_null())
                    .col(
                        ColumnDef::new(InventoryItems::Quantity)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::UnitCost)
                            .decimal_len(10, 2)
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ServiceInventoryUsage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceInventoryUsage::ServiceId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceInventoryUsage::ItemId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceInventoryUsage::QuantityUsed)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ServiceInventoryUsage::ServiceId)
                            .col(ServiceInventoryUsage::ItemId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usage_service")
                            .from(
                                ServiceInventoryUsage::Table,
                                ServiceInventoryUsage::ServiceId,
                            )
                            .to(TanServices::Table, TanServices::ServiceId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usage_item")
                            .from(ServiceInventoryUsage::Table, ServiceInventoryUsage::ItemId)
                            .to(InventoryItems::Table, InventoryItems::ItemId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Receipts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Receipts::ReceiptId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Receipts::AppointmentId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Receipts::TotalAmount)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Receipts::PaymentMethod)
                            .string()
                            .not_null()
                            .default("Unpaid"),
                    )
                    .col(
                        ColumnDef::new(Receipts::IssuedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_receipts_appointment")
                            .from(Receipts::Table, Receipts::AppointmentId)
                            .to(Appointments::Table, Appointments::AppointmentId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FinancialLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinancialLogs::LogId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FinancialLogs::LogType).string().not_null())
                    .col(ColumnDef::new(FinancialLogs::Source).string().null())
                    .col(
                        ColumnDef::new(FinancialLogs::ReferenceId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(FinancialLogs::Description).text().null())
                    .col(
                        ColumnDef::new(FinancialLogs::Amount)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialLogs::LoggedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_financial_logs_type")
                    .table(FinancialLogs::Table)
                    .col(FinancialLogs::LogType)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FinancialLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Receipts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServiceInventoryUsage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum InventoryItems {
    Table,
    ItemId,
    ItemName,
    Quantity,
    UnitCost,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum ServiceInventoryUsage {
    Table,
    ServiceId,
    ItemId,
    QuantityUsed,
}

#[derive(DeriveIden)]
pub enum Receipts {
    Table,
    ReceiptId,
    AppointmentId,
    TotalAmount,
    PaymentMethod,
    IssuedAt,
}

#[derive(DeriveIden)]
pub enum FinancialLogs {
    Table,
    LogId,
    LogType,
    Source,
    ReferenceId,
    Description,
    Amount,
    LoggedAt,
}
