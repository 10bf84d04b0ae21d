mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{money, TestApp};

#[tokio::test]
async fn confirming_deducts_inventory_and_creates_receipt_and_revenue_log() {
    let app = TestApp::spawn().await;
    let (_, admin_token) = app.register_admin("Admin", "admin@example.com").await;
    let service = app.seed_service("Glow Up", "50.00").await;
    let slot = app.seed_slot(1).await;
    let item = app.seed_item("Gloves", 5, "1.50").await;
    app.seed_usage(service.service_id, item.item_id, 2).await;

    let booked = app
        .book_appointment(service.service_id, slot.slot_id, "user@example.com")
        .await;
    let id = booked["appointment_id"].as_i64().unwrap();

    let (status, updated) = app
        .request(
            Method::PUT,
            &format!("/api/appointments/{id}"),
            Some(&admin_token),
            Some(json!({
                "client_name": "Brenna",
                "client_address": "123 Peach St",
                "status": "CONFIRMED",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "CONFIRMED");

    let (status, item_body) = app
        .request(
            Method::GET,
            &format!("/api/inventory/{}", item.item_id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item_body["quantity"], 3);

    let (status, receipt) = app
        .request(
            Method::GET,
            &format!("/api/appointments/{id}/receipt"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["payment_method"], "Unpaid");
    assert_eq!(money(&receipt["total_amount"]), 50.0);

    let (status, logs) = app
        .request(Method::GET, "/api/financial-logs", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["log_type"], "revenue");
    assert_eq!(logs[0]["source"], "appointment");
    assert_eq!(logs[0]["reference_id"].as_i64().unwrap(), id);
}

#[tokio::test]
async fn confirmation_fails_atomically_when_inventory_insufficient() {
    let app = TestApp::spawn().await;
    let (_, admin_token) = app.register_admin("Admin", "admin@example.com").await;
    let service = app.seed_service("Glow Up", "50.00").await;
    let slot = app.seed_slot(1).await;
    let item = app.seed_item("Cap", 1, "1.00").await;
    app.seed_usage(service.service_id, item.item_id, 5).await;

    let booked = app
        .book_appointment(service.service_id, slot.slot_id, "user@example.com")
        .await;
    let id = booked["appointment_id"].as_i64().unwrap();

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/appointments/{id}"),
            Some(&admin_token),
            Some(json!({
                "client_name": "Brenna",
                "client_address": "123 Peach St",
                "status": "CONFIRMED",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"].as_str().unwrap().contains("insufficient inventory"),
        "unexpected message: {body}"
    );

    // Nothing was persisted: status, inventory, receipts, and logs unchanged.
    let (_, current) = app
        .request(
            Method::GET,
            &format!("/api/appointments/{id}"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(current["status"], "PENDING");

    let (_, item_body) = app
        .request(
            Method::GET,
            &format!("/api/inventory/{}", item.item_id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(item_body["quantity"], 1);

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/appointments/{id}/receipt"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, logs) = app
        .request(Method::GET, "/api/financial-logs", Some(&admin_token), None)
        .await;
    assert!(logs.as_array().unwrap().is_empty());

    let (_, history) = app
        .request(
            Method::GET,
            &format!("/api/appointments/{id}/history"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reconfirming_after_cancellation_does_not_issue_second_receipt() {
    let app = TestApp::spawn().await;
    let (_, admin_token) = app.register_admin("Admin", "admin@example.com").await;
    let service = app.seed_service("Glow Up", "50.00").await;
    let slot = app.seed_slot(1).await;
    let item = app.seed_item("Gloves", 5, "1.50").await;
    app.seed_usage(service.service_id, item.item_id, 2).await;

    let booked = app
        .book_appointment(service.service_id, slot.slot_id, "user@example.com")
        .await;
    let id = booked["appointment_id"].as_i64().unwrap();

    for status_name in ["CONFIRMED", "CANCELLED", "CONFIRMED"] {
        let (status, _) = app
            .request(
                Method::PUT,
                &format!("/api/appointments/{id}"),
                Some(&admin_token),
                Some(json!({
                    "client_name": "Brenna",
                    "client_address": "123 Peach St",
                    "status": status_name,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "transition to {status_name}");
    }

    // Each confirmation deducts stock, but only the first issues billing.
    let (_, item_body) = app
        .request(
            Method::GET,
            &format!("/api/inventory/{}", item.item_id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(item_body["quantity"], 1);

    let (_, receipts) = app
        .request(Method::GET, "/api/receipts", Some(&admin_token), None)
        .await;
    assert_eq!(receipts.as_array().unwrap().len(), 1);

    let (_, logs) = app
        .request(Method::GET, "/api/financial-logs", Some(&admin_token), None)
        .await;
    assert_eq!(logs.as_array().unwrap().len(), 1);

    // PENDING + CONFIRMED + CANCELLED + CONFIRMED
    let (_, history) = app
        .request(
            Method::GET,
            &format!("/api/appointments/{id}/history"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(history.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn receipt_amount_prefers_explicit_total_price() {
    let app = TestApp::spawn().await;
    let (_, admin_token) = app.register_admin("Admin", "admin@example.com").await;
    let service = app.seed_service("Glow Up", "50.00").await;
    let slot = app.seed_slot(1).await;

    let booked = app
        .book_appointment(service.service_id, slot.slot_id, "user@example.com")
        .await;
    let id = booked["appointment_id"].as_i64().unwrap();

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/appointments/{id}"),
            Some(&admin_token),
            Some(json!({
                "client_name": "Brenna",
                "client_address": "123 Peach St",
                "status": "CONFIRMED",
                "travel_fee": 50.0,
                "total_price": 100.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, receipt) = app
        .request(
            Method::GET,
            &format!("/api/appointments/{id}/receipt"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(money(&receipt["total_amount"]), 100.0);
}

#[tokio::test]
async fn receipt_amount_defaults_to_base_price_plus_travel_fee() {
    let app = TestApp::spawn().await;
    let (_, admin_token) = app.register_admin("Admin", "admin@example.com").await;
    let service = app.seed_service("Glow Up", "50.00").await;
    let slot = app.seed_slot(1).await;

    // Book with a travel fee but no explicit total.
    let (status, booked) = app
        .request(
            Method::POST,
            "/api/appointments",
            None,
            Some(json!({
                "service_id": service.service_id,
                "slot_id": slot.slot_id,
                "client_name": "Brenna",
                "client_email": "user@example.com",
                "client_address": "123 Peach St",
                "appointment_date_time": (chrono::Utc::now() + chrono::Duration::days(2)).to_rfc3339(),
                "travel_fee": 25.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let id = booked["appointment_id"].as_i64().unwrap();

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/appointments/{id}"),
            Some(&admin_token),
            Some(json!({
                "client_name": "Brenna",
                "client_address": "123 Peach St",
                "status": "CONFIRMED",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, receipt) = app
        .request(
            Method::GET,
            &format!("/api/appointments/{id}/receipt"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(money(&receipt["total_amount"]), 75.0);
}

#[tokio::test]
async fn status_history_records_every_transition_including_initial() {
    let app = TestApp::spawn().await;
    let (admin, admin_token) = app.register_admin("Admin", "admin@example.com").await;
    let service = app.seed_service("Glow Up", "50.00").await;
    let slot = app.seed_slot(1).await;

    let booked = app
        .book_appointment(service.service_id, slot.slot_id, "user@example.com")
        .await;
    let id = booked["appointment_id"].as_i64().unwrap();

    let (status, updated) = app
        .request(
            Method::PUT,
            &format!("/api/appointments/{id}"),
            Some(&admin_token),
            Some(json!({
                "client_name": "Brenna",
                "client_address": "123 Peach St",
                "status": "CANCELLED",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "CANCELLED");

    let (_, history) = app
        .request(
            Method::GET,
            &format!("/api/appointments/{id}/history"),
            Some(&admin_token),
            None,
        )
        .await;
    let history = history.as_array().unwrap().clone();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["status"], "PENDING");
    assert_eq!(history[1]["status"], "CANCELLED");
    assert_eq!(
        history[1]["changed_by_user_id"].as_i64().unwrap(),
        admin.user_id
    );
}

#[tokio::test]
async fn cancellation_creates_no_receipt_and_releases_the_slot() {
    let app = TestApp::spawn().await;
    let (_, admin_token) = app.register_admin("Admin", "admin@example.com").await;
    let service = app.seed_service("Glow Up", "50.00").await;
    let slot = app.seed_slot(1).await;

    let booked = app
        .book_appointment(service.service_id, slot.slot_id, "user@example.com")
        .await;
    let id = booked["appointment_id"].as_i64().unwrap();

    let (_, slot_body) = app
        .request(
            Method::GET,
            &format!("/api/availability/{}", slot.slot_id),
            None,
            None,
        )
        .await;
    assert_eq!(slot_body["is_booked"], true);

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/appointments/{id}"),
            Some(&admin_token),
            Some(json!({
                "client_name": "Brenna",
                "client_address": "123 Peach St",
                "status": "CANCELLED",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/appointments/{id}/receipt"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, slot_body) = app
        .request(
            Method::GET,
            &format!("/api/availability/{}", slot.slot_id),
            None,
            None,
        )
        .await;
    assert_eq!(slot_body["is_booked"], false);
}

#[tokio::test]
async fn plain_field_update_does_not_touch_history_or_billing() {
    let app = TestApp::spawn().await;
    let (_, admin_token) = app.register_admin("Admin", "admin@example.com").await;
    let service = app.seed_service("Glow Up", "50.00").await;
    let slot = app.seed_slot(1).await;

    let booked = app
        .book_appointment(service.service_id, slot.slot_id, "user@example.com")
        .await;
    let id = booked["appointment_id"].as_i64().unwrap();

    let (status, updated) = app
        .request(
            Method::PUT,
            &format!("/api/appointments/{id}"),
            Some(&admin_token),
            Some(json!({
                "client_name": "Updated Admin",
                "client_address": "123 Peach St",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["client_name"], "Updated Admin");
    assert_eq!(updated["status"], "PENDING");

    let (_, history) = app
        .request(
            Method::GET,
            &format!("/api/appointments/{id}/history"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}
