use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::policy::{self, Action, Resource};
use crate::auth::MaybeAuthUser;
use crate::entities::availability;
use crate::errors::ServiceError;
use crate::services::availability::{CreateSlotRequest, UpdateSlotRequest};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_slots).post(create_slot))
        .route("/{id}", get(get_slot).put(update_slot).delete(delete_slot))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SlotFilter {
    /// Only return slots that are still open for booking.
    #[serde(default)]
    pub available: bool,
}

/// Public listing of slots; clients browse these before booking.
#[utoipa::path(
    get,
    path = "/api/availability",
    params(SlotFilter),
    responses((status = 200, description = "Slots, soonest first", body = [availability::Model]))
)]
pub async fn list_slots(
    State(state): State<AppState>,
    Query(filter): Query<SlotFilter>,
) -> Result<Json<Vec<availability::Model>>, ServiceError> {
    Ok(Json(
        state.services.availability.list_slots(filter.available).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/availability/{id}",
    params(("id" = i64, Path, description = "Slot id")),
    responses(
        (status = 200, description = "The slot", body = availability::Model),
        (status = 404, description = "Unknown slot", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_slot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<availability::Model>, ServiceError> {
    Ok(Json(state.services.availability.get_slot(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/availability",
    request_body = CreateSlotRequest,
    responses(
        (status = 201, description = "Slot created", body = availability::Model),
        (status = 400, description = "Invalid slot times", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_slot(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Json(request): Json<CreateSlotRequest>,
) -> Result<(StatusCode, Json<availability::Model>), ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Create)?;
    let created = state.services.availability.create_slot(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/availability/{id}",
    params(("id" = i64, Path, description = "Slot id")),
    request_body = UpdateSlotRequest,
    responses(
        (status = 200, description = "Updated slot", body = availability::Model),
        (status = 400, description = "Invalid slot times", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown slot", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_slot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
    Json(request): Json<UpdateSlotRequest>,
) -> Result<Json<availability::Model>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Update)?;
    Ok(Json(
        state.services.availability.update_slot(id, request).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/availability/{id}",
    params(("id" = i64, Path, description = "Slot id")),
    responses(
        (status = 204, description = "Slot deleted"),
        (status = 400, description = "Slot is booked", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown slot", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_slot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<StatusCode, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Delete)?;
    state.services.availability.delete_slot(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
