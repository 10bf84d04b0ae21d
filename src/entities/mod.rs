pub mod appointment;
pub mod appointment_status_history;
pub mod availability;
pub mod financial_log;
pub mod inventory_item;
pub mod receipt;
pub mod service_inventory_usage;
pub mod tan_service;
pub mod user;
