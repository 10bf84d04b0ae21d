use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::policy::{self, Action, Resource};
use crate::auth::MaybeAuthUser;
use crate::entities::{service_inventory_usage, tan_service};
use crate::errors::ServiceError;
use crate::services::catalog::{CreateServiceRequest, SetUsageRequest, UpdateServiceRequest};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_services).post(create_service))
        .route(
            "/{id}",
            get(get_service).put(update_service).delete(delete_service),
        )
        .route("/{id}/inventory-usage", get(list_usage))
        .route(
            "/{id}/inventory-usage/{item_id}",
            put(set_usage).delete(delete_usage),
        )
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ServiceFilter {
    /// Only return services currently offered.
    #[serde(default)]
    pub active: bool,
}

/// Public service catalog.
#[utoipa::path(
    get,
    path = "/api/services",
    params(ServiceFilter),
    responses((status = 200, description = "Service catalog", body = [tan_service::Model]))
)]
pub async fn list_services(
    State(state): State<AppState>,
    Query(filter): Query<ServiceFilter>,
) -> Result<Json<Vec<tan_service::Model>>, ServiceError> {
    Ok(Json(state.services.catalog.list_services(filter.active).await?))
}

#[utoipa::path(
    get,
    path = "/api/services/{id}",
    params(("id" = i64, Path, description = "Service id")),
    responses(
        (status = 200, description = "The service", body = tan_service::Model),
        (status = 404, description = "Unknown service", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<tan_service::Model>, ServiceError> {
    Ok(Json(state.services.catalog.get_service(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/services",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = tan_service::Model),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_service(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<tan_service::Model>), ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Create)?;
    let created = state.services.catalog.create_service(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/services/{id}",
    params(("id" = i64, Path, description = "Service id")),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Updated service", body = tan_service::Model),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown service", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<tan_service::Model>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Update)?;
    Ok(Json(state.services.catalog.update_service(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    params(("id" = i64, Path, description = "Service id")),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 400, description = "Service has appointments", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown service", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<StatusCode, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Delete)?;
    state.services.catalog.delete_service(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Configured consumable usage for a service.
#[utoipa::path(
    get,
    path = "/api/services/{id}/inventory-usage",
    params(("id" = i64, Path, description = "Service id")),
    responses(
        (status = 200, description = "Usage rows", body = [service_inventory_usage::Model]),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown service", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_usage(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<Json<Vec<service_inventory_usage::Model>>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Read)?;
    Ok(Json(state.services.catalog.list_usage(id).await?))
}

/// Create or replace the usage row for (service, item).
#[utoipa::path(
    put,
    path = "/api/services/{id}/inventory-usage/{item_id}",
    params(
        ("id" = i64, Path, description = "Service id"),
        ("item_id" = i64, Path, description = "Inventory item id"),
    ),
    request_body = SetUsageRequest,
    responses(
        (status = 200, description = "Usage row upserted", body = service_inventory_usage::Model),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown service or item", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn set_usage(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i64, i64)>,
    auth: MaybeAuthUser,
    Json(request): Json<SetUsageRequest>,
) -> Result<Json<service_inventory_usage::Model>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Update)?;
    Ok(Json(
        state.services.catalog.set_usage(id, item_id, request).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/services/{id}/inventory-usage/{item_id}",
    params(
        ("id" = i64, Path, description = "Service id"),
        ("item_id" = i64, Path, description = "Inventory item id"),
    ),
    responses(
        (status = 204, description = "Usage row removed"),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such usage row", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_usage(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i64, i64)>,
    auth: MaybeAuthUser,
) -> Result<StatusCode, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Delete)?;
    state.services.catalog.delete_usage(id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
