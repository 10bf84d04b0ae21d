use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;

/// Aggregated OpenAPI document, served as plain JSON from
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::appointments::list_appointments,
        handlers::appointments::create_appointment,
        handlers::appointments::my_appointments,
        handlers::appointments::get_appointment,
        handlers::appointments::update_appointment,
        handlers::appointments::delete_appointment,
        handlers::appointments::get_status_history,
        handlers::appointments::get_appointment_receipt,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::availability::list_slots,
        handlers::availability::get_slot,
        handlers::availability::create_slot,
        handlers::availability::update_slot,
        handlers::availability::delete_slot,
        handlers::services::list_services,
        handlers::services::get_service,
        handlers::services::create_service,
        handlers::services::update_service,
        handlers::services::delete_service,
        handlers::services::list_usage,
        handlers::services::set_usage,
        handlers::services::delete_usage,
        handlers::inventory::list_items,
        handlers::inventory::get_item,
        handlers::inventory::create_item,
        handlers::inventory::update_item,
        handlers::inventory::delete_item,
        handlers::receipts::list_receipts,
        handlers::receipts::get_receipt,
        handlers::receipts::update_receipt,
        handlers::financial_logs::list_logs,
        handlers::financial_logs::get_log,
        handlers::financial_logs::create_log,
        handlers::financial_logs::update_log,
        handlers::financial_logs::delete_log,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::delete_user,
    ),
    components(schemas(
        crate::entities::user::Model,
        crate::entities::tan_service::Model,
        crate::entities::availability::Model,
        crate::entities::appointment::Model,
        crate::entities::appointment::AppointmentStatus,
        crate::entities::appointment_status_history::Model,
        crate::entities::inventory_item::Model,
        crate::entities::service_inventory_usage::Model,
        crate::entities::receipt::Model,
        crate::entities::financial_log::Model,
        crate::entities::financial_log::LogType,
        crate::errors::ErrorResponse,
        crate::auth::RegisterRequest,
        crate::handlers::auth::LoginRequest,
        crate::handlers::auth::TokenResponse,
        crate::services::appointments::CreateAppointmentRequest,
        crate::services::appointments::UpdateAppointmentRequest,
        crate::services::availability::CreateSlotRequest,
        crate::services::availability::UpdateSlotRequest,
        crate::services::catalog::CreateServiceRequest,
        crate::services::catalog::UpdateServiceRequest,
        crate::services::catalog::SetUsageRequest,
        crate::services::inventory::CreateInventoryItemRequest,
        crate::services::inventory::UpdateInventoryItemRequest,
        crate::services::receipts::UpdateReceiptRequest,
        crate::services::financial_logs::FinancialLogRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "appointments", description = "Booking and the status-transition workflow"),
        (name = "catalog", description = "Services and their inventory usage"),
        (name = "billing", description = "Receipts and the financial ledger"),
    ),
    info(
        title = "tansalon-api",
        description = "Tanning-salon appointment booking backend"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_serializes_and_covers_core_routes() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();
        let paths = json.get("paths").and_then(|p| p.as_object()).unwrap();
        assert!(paths.contains_key("/api/appointments"));
        assert!(paths.contains_key("/api/appointments/{id}"));
        assert!(paths.contains_key("/api/financial-logs"));
    }
}
