//! tansalon-api library
//!
//! Backend for tanning-salon appointment booking: appointments over
//! availability slots, a service catalog with per-service inventory usage,
//! and the confirmation workflow that deducts stock, issues receipts, and
//! writes the financial ledger.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use utoipa::OpenApi;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

/// All `/api/...` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/appointments", handlers::appointments::routes())
        .nest("/availability", handlers::availability::routes())
        .nest("/services", handlers::services::routes())
        .nest("/inventory", handlers::inventory::routes())
        .nest("/receipts", handlers::receipts::routes())
        .nest("/financial-logs", handlers::financial_logs::routes())
        .nest("/users", handlers::users::routes())
        .nest("/auth", handlers::auth::routes())
}

/// The full application router. Middleware layers (tracing, CORS,
/// compression, timeouts) are applied by the binary so tests can drive the
/// bare router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "tansalon-api up" }))
        .route("/healthz", get(health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", api_routes())
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<Value>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Ok(Json(json!({
        "status": db_status,
        "checks": { "database": db_status },
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
