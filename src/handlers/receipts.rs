use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::auth::policy::{self, Action, Resource};
use crate::auth::MaybeAuthUser;
use crate::entities::receipt;
use crate::errors::ServiceError;
use crate::services::receipts::UpdateReceiptRequest;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_receipts))
        .route("/{id}", get(get_receipt).put(update_receipt))
}

#[utoipa::path(
    get,
    path = "/api/receipts",
    responses(
        (status = 200, description = "All receipts", body = [receipt::Model]),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_receipts(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
) -> Result<Json<Vec<receipt::Model>>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Read)?;
    Ok(Json(state.services.receipts.list_receipts().await?))
}

#[utoipa::path(
    get,
    path = "/api/receipts/{id}",
    params(("id" = i64, Path, description = "Receipt id")),
    responses(
        (status = 200, description = "The receipt", body = receipt::Model),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown receipt", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_receipt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<Json<receipt::Model>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Read)?;
    Ok(Json(state.services.receipts.get_receipt(id).await?))
}

/// Settle or correct a receipt (payment method, amount).
#[utoipa::path(
    put,
    path = "/api/receipts/{id}",
    params(("id" = i64, Path, description = "Receipt id")),
    request_body = UpdateReceiptRequest,
    responses(
        (status = 200, description = "Updated receipt", body = receipt::Model),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown receipt", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_receipt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
    Json(request): Json<UpdateReceiptRequest>,
) -> Result<Json<receipt::Model>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Update)?;
    Ok(Json(state.services.receipts.update_receipt(id, request).await?))
}
