use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::auth::policy::{self, Action, Resource};
use crate::auth::MaybeAuthUser;
use crate::entities::inventory_item;
use crate::errors::ServiceError;
use crate::services::inventory::{CreateInventoryItemRequest, UpdateInventoryItemRequest};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/{id}", get(get_item).put(update_item).delete(delete_item))
}

#[utoipa::path(
    get,
    path = "/api/inventory",
    responses(
        (status = 200, description = "All inventory items", body = [inventory_item::Model]),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_items(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
) -> Result<Json<Vec<inventory_item::Model>>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Read)?;
    Ok(Json(state.services.inventory.list_items().await?))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    params(("id" = i64, Path, description = "Inventory item id")),
    responses(
        (status = 200, description = "The item", body = inventory_item::Model),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown item", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<Json<inventory_item::Model>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Read)?;
    Ok(Json(state.services.inventory.get_item(id).await?))
}

/// Stock a new consumable; initial quantity is logged as an expense.
#[utoipa::path(
    post,
    path = "/api/inventory",
    request_body = CreateInventoryItemRequest,
    responses(
        (status = 201, description = "Item created", body = inventory_item::Model),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_item(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Json(request): Json<CreateInventoryItemRequest>,
) -> Result<(StatusCode, Json<inventory_item::Model>), ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Create)?;
    let created = state.services.inventory.create_item(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Rename, reprice, or adjust quantity; restocks are logged as expenses.
#[utoipa::path(
    put,
    path = "/api/inventory/{id}",
    params(("id" = i64, Path, description = "Inventory item id")),
    request_body = UpdateInventoryItemRequest,
    responses(
        (status = 200, description = "Updated item", body = inventory_item::Model),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown item", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
    Json(request): Json<UpdateInventoryItemRequest>,
) -> Result<Json<inventory_item::Model>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Update)?;
    Ok(Json(state.services.inventory.update_item(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/{id}",
    params(("id" = i64, Path, description = "Inventory item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown item", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<StatusCode, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Delete)?;
    state.services.inventory.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
