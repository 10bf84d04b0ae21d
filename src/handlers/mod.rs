pub mod appointments;
pub mod auth;
pub mod availability;
pub mod financial_logs;
pub mod inventory;
pub mod receipts;
pub mod services;
pub mod users;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Business-logic services used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub appointments: Arc<crate::services::appointments::AppointmentService>,
    pub availability: Arc<crate::services::availability::AvailabilityService>,
    pub catalog: Arc<crate::services::catalog::CatalogService>,
    pub inventory: Arc<crate::services::inventory::InventoryService>,
    pub receipts: Arc<crate::services::receipts::ReceiptService>,
    pub financial_logs: Arc<crate::services::financial_logs::FinancialLogService>,
    pub users: Arc<crate::services::users::UserService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            appointments: Arc::new(crate::services::appointments::AppointmentService::new(
                db.clone(),
                event_sender.clone(),
            )),
            availability: Arc::new(crate::services::availability::AvailabilityService::new(
                db.clone(),
            )),
            catalog: Arc::new(crate::services::catalog::CatalogService::new(db.clone())),
            inventory: Arc::new(crate::services::inventory::InventoryService::new(
                db.clone(),
                event_sender,
            )),
            receipts: Arc::new(crate::services::receipts::ReceiptService::new(db.clone())),
            financial_logs: Arc::new(crate::services::financial_logs::FinancialLogService::new(
                db.clone(),
            )),
            users: Arc::new(crate::services::users::UserService::new(db)),
        }
    }
}
