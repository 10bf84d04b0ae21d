use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::auth::policy::{self, Action, Resource};
use crate::auth::MaybeAuthUser;
use crate::entities::financial_log;
use crate::errors::ServiceError;
use crate::services::financial_logs::FinancialLogRequest;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_logs).post(create_log))
        .route("/{id}", get(get_log).put(update_log).delete(delete_log))
}

#[utoipa::path(
    get,
    path = "/api/financial-logs",
    responses(
        (status = 200, description = "The full ledger, oldest first", body = [financial_log::Model]),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_logs(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
) -> Result<Json<Vec<financial_log::Model>>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Read)?;
    Ok(Json(state.services.financial_logs.list_logs().await?))
}

#[utoipa::path(
    get,
    path = "/api/financial-logs/{id}",
    params(("id" = i64, Path, description = "Log id")),
    responses(
        (status = 200, description = "The ledger entry", body = financial_log::Model),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown entry", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<Json<financial_log::Model>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Read)?;
    Ok(Json(state.services.financial_logs.get_log(id).await?))
}

/// Manual ledger entry. Type and a non-negative amount are required; a null
/// source is accepted.
#[utoipa::path(
    post,
    path = "/api/financial-logs",
    request_body = FinancialLogRequest,
    responses(
        (status = 201, description = "Entry recorded", body = financial_log::Model),
        (status = 400, description = "Missing type or negative amount", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_log(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Json(request): Json<FinancialLogRequest>,
) -> Result<(StatusCode, Json<financial_log::Model>), ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Create)?;
    let created = state.services.financial_logs.create_log(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/financial-logs/{id}",
    params(("id" = i64, Path, description = "Log id")),
    request_body = FinancialLogRequest,
    responses(
        (status = 200, description = "Updated entry", body = financial_log::Model),
        (status = 400, description = "Missing type or negative amount", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown entry", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
    Json(request): Json<FinancialLogRequest>,
) -> Result<Json<financial_log::Model>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Update)?;
    Ok(Json(
        state.services.financial_logs.update_log(id, request).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/financial-logs/{id}",
    params(("id" = i64, Path, description = "Log id")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown entry", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<StatusCode, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Delete)?;
    state.services.financial_logs.delete_log(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
