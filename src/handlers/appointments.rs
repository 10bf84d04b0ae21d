use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::auth::policy::{self, Action, Resource};
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::entities::{appointment, appointment_status_history, receipt};
use crate::errors::ServiceError;
use crate::services::appointments::{CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route("/my-appointments", get(my_appointments))
        .route(
            "/{id}",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
        .route("/{id}/history", get(get_status_history))
        .route("/{id}/receipt", get(get_appointment_receipt))
}

async fn load_appointment(
    state: &AppState,
    appointment_id: i64,
) -> Result<appointment::Model, ServiceError> {
    state
        .services
        .appointments
        .get_appointment(appointment_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Appointment with id {appointment_id} not found"))
        })
}

/// List every appointment in the book.
#[utoipa::path(
    get,
    path = "/api/appointments",
    responses(
        (status = 200, description = "All appointments", body = [appointment::Model]),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
) -> Result<Json<Vec<appointment::Model>>, ServiceError> {
    policy::require(auth.actor(), &Resource::Appointments, Action::Read)?;
    Ok(Json(state.services.appointments.list_appointments().await?))
}

/// Book an appointment. Open to unauthenticated clients.
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 200, description = "Appointment booked", body = appointment::Model),
        (status = 400, description = "Validation failure or slot already booked", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<appointment::Model>, ServiceError> {
    Ok(Json(
        state
            .services
            .appointments
            .create_appointment(request)
            .await?,
    ))
}

/// The authenticated caller's own appointments, matched by client email.
#[utoipa::path(
    get,
    path = "/api/appointments/my-appointments",
    responses(
        (status = 200, description = "Caller's appointments", body = [appointment::Model]),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn my_appointments(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<appointment::Model>>, ServiceError> {
    Ok(Json(
        state
            .services
            .appointments
            .list_for_client(&user.email)
            .await?,
    ))
}

/// Fetch one appointment. Admins and the owning client only.
#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "The appointment", body = appointment::Model),
        (status = 403, description = "Caller is neither admin nor owner", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown appointment", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<Json<appointment::Model>, ServiceError> {
    let found = load_appointment(&state, id).await?;
    policy::require(auth.actor(), &Resource::Appointment(&found), Action::Read)?;
    Ok(Json(found))
}

/// Update fields and/or transition status. A transition to CONFIRMED runs
/// the inventory check, deducts stock, and issues the receipt and revenue
/// log atomically; insufficient inventory rejects the whole update.
#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Updated appointment", body = appointment::Model),
        (status = 400, description = "Validation failure or insufficient inventory", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is neither admin nor owner", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown appointment", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<appointment::Model>, ServiceError> {
    let found = load_appointment(&state, id).await?;
    policy::require(auth.actor(), &Resource::Appointment(&found), Action::Update)?;
    let actor = auth
        .actor()
        .cloned()
        .ok_or_else(|| ServiceError::Forbidden("authentication required".to_string()))?;

    Ok(Json(
        state
            .services
            .appointments
            .update_appointment(id, request, &actor)
            .await?,
    ))
}

/// Remove an appointment. Admin only.
#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 204, description = "Appointment deleted"),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown appointment", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<StatusCode, ServiceError> {
    policy::require(auth.actor(), &Resource::Appointments, Action::Delete)?;
    state.services.appointments.delete_appointment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The appointment's full status audit trail.
#[utoipa::path(
    get,
    path = "/api/appointments/{id}/history",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Status history, oldest first", body = [appointment_status_history::Model]),
        (status = 403, description = "Caller is neither admin nor owner", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown appointment", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_status_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<Json<Vec<appointment_status_history::Model>>, ServiceError> {
    let found = load_appointment(&state, id).await?;
    policy::require(auth.actor(), &Resource::Appointment(&found), Action::Read)?;
    Ok(Json(state.services.appointments.status_history(id).await?))
}

/// The receipt issued at confirmation, if any.
#[utoipa::path(
    get,
    path = "/api/appointments/{id}/receipt",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "The receipt", body = receipt::Model),
        (status = 403, description = "Caller is neither admin nor owner", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown appointment or no receipt issued", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_appointment_receipt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<Json<receipt::Model>, ServiceError> {
    let found = load_appointment(&state, id).await?;
    policy::require(auth.actor(), &Resource::Appointment(&found), Action::Read)?;
    Ok(Json(state.services.receipts.get_for_appointment(id).await?))
}
