#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

use tansalon_api::auth::{AuthConfig, AuthService, RegisterRequest};
use tansalon_api::config::AppConfig;
use tansalon_api::db;
use tansalon_api::entities::{
    availability, inventory_item, service_inventory_usage, tan_service, user,
};
use tansalon_api::events::{self, EventSender};
use tansalon_api::handlers::AppServices;
use tansalon_api::{app_router, AppState};

/// Test harness: a fresh SQLite database with migrations applied and the
/// real router driven through `tower::ServiceExt::oneshot`.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _tmp: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let db_path = tmp.path().join("tansalon_test.db");
        let cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "integration_test_secret_key_0123456789abcdef",
            3600,
            "127.0.0.1",
            0,
            "test",
        );

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("db connect");
        db::run_migrations(&pool).await.expect("migrations");
        let db = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        tokio::spawn(events::process_events(event_rx));

        let auth = Arc::new(AuthService::new(
            AuthConfig {
                jwt_secret: cfg.jwt_secret.clone(),
                token_expiration: Duration::from_secs(3600),
            },
            db.clone(),
        ));
        let services = AppServices::new(db.clone(), event_sender.clone());
        let state = AppState {
            db,
            config: cfg,
            event_sender,
            auth,
            services,
        };

        Self {
            router: app_router(state.clone()),
            state,
            _tmp: tmp,
        }
    }

    /// Register a regular account and return it with a bearer token.
    pub async fn register_user(&self, name: &str, email: &str) -> (user::Model, String) {
        self.state
            .auth
            .register(RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: "password123".to_string(),
            })
            .await
            .expect("register user")
    }

    /// Register an account, promote it to admin, and re-issue the token so
    /// the admin flag is present in the claims.
    pub async fn register_admin(&self, name: &str, email: &str) -> (user::Model, String) {
        let (created, _) = self.register_user(name, email).await;
        let mut active: user::ActiveModel = created.into();
        active.is_admin = Set(true);
        let admin = active.update(&*self.state.db).await.expect("promote admin");
        let token = self.state.auth.issue_token(&admin).expect("issue token");
        (admin, token)
    }

    pub async fn seed_service(&self, name: &str, base_price: &str) -> tan_service::Model {
        tan_service::ActiveModel {
            name: Set(name.to_string()),
            description: Set(None),
            base_price: Set(base_price.parse().expect("price")),
            duration_minutes: Set(30),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed service")
    }

    pub async fn seed_slot(&self, day_offset: i64) -> availability::Model {
        let date = (Utc::now() + chrono::Duration::days(day_offset)).date_naive();
        availability::ActiveModel {
            date: Set(date),
            start_time: Set(chrono::NaiveTime::from_hms_opt(14, 0, 0).unwrap()),
            end_time: Set(chrono::NaiveTime::from_hms_opt(14, 30, 0).unwrap()),
            is_booked: Set(false),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed slot")
    }

    pub async fn seed_item(
        &self,
        name: &str,
        quantity: i32,
        unit_cost: &str,
    ) -> inventory_item::Model {
        inventory_item::ActiveModel {
            item_name: Set(name.to_string()),
            quantity: Set(quantity),
            unit_cost: Set(unit_cost.parse().expect("cost")),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed item")
    }

    pub async fn seed_usage(&self, service_id: i64, item_id: i64, quantity_used: i32) {
        service_inventory_usage::ActiveModel {
            service_id: Set(service_id),
            item_id: Set(item_id),
            quantity_used: Set(quantity_used),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed usage");
    }

    /// Book an appointment through the public API and return its JSON body.
    pub async fn book_appointment(
        &self,
        service_id: i64,
        slot_id: i64,
        client_email: &str,
    ) -> Value {
        let body = serde_json::json!({
            "service_id": service_id,
            "slot_id": slot_id,
            "client_name": "Brenna",
            "client_email": client_email,
            "client_address": "123 Peach St",
            "appointment_date_time": (Utc::now() + chrono::Duration::days(2)).to_rfc3339(),
        });
        let (status, body) = self
            .request(Method::POST, "/api/appointments", None, Some(body))
            .await;
        assert_eq!(status, StatusCode::OK, "booking failed: {body}");
        body
    }

    /// Send one request through the router; returns status plus parsed JSON
    /// body (Null for empty bodies such as 204 responses).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }
}

/// Money values serialize as strings or numbers depending on the column
/// round trip; normalize to f64 for assertions.
pub fn money(value: &Value) -> f64 {
    match value {
        Value::String(s) => s.parse().expect("numeric string"),
        Value::Number(n) => n.as_f64().expect("number"),
        other => panic!("not a money value: {other}"),
    }
}
