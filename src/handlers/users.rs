use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::auth::policy::{self, Action, Resource};
use crate::auth::MaybeAuthUser;
use crate::entities::user;
use crate::errors::ServiceError;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user).delete(delete_user))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [user::Model]),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
) -> Result<Json<Vec<user::Model>>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Read)?;
    Ok(Json(state.services.users.list_users().await?))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = user::Model),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown user", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<Json<user::Model>, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Read)?;
    Ok(Json(state.services.users.get_user(id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown user", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: MaybeAuthUser,
) -> Result<StatusCode, ServiceError> {
    policy::require(auth.actor(), &Resource::Admin, Action::Delete)?;
    state.services.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
