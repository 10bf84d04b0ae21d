mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{money, TestApp};

#[tokio::test]
async fn inventory_is_admin_only() {
    let app = TestApp::spawn().await;
    let (_, user_token) = app.register_user("User", "user@example.com").await;

    let (status, _) = app
        .request(Method::GET, "/api/inventory", Some(&user_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/inventory",
            None,
            Some(json!({ "item_name": "Gloves", "quantity": 5, "unit_cost": 1.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn stocking_inventory_logs_expenses() {
    let app = TestApp::spawn().await;
    let (_, admin_token) = app.register_admin("Admin", "admin@example.com").await;

    let (status, created) = app
        .request(
            Method::POST,
            "/api/inventory",
            Some(&admin_token),
            Some(json!({ "item_name": "Lotion", "quantity": 10, "unit_cost": 2.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = created["item_id"].as_i64().unwrap();

    let (_, logs) = app
        .request(Method::GET, "/api/financial-logs", Some(&admin_token), None)
        .await;
    let logs = logs.as_array().unwrap().clone();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["log_type"], "expense");
    assert_eq!(logs[0]["source"], "inventory");
    assert_eq!(money(&logs[0]["amount"]), 25.0);

    // Restock from 10 to 14: another expense for the 4 added units.
    let (status, updated) = app
        .request(
            Method::PUT,
            &format!("/api/inventory/{item_id}"),
            Some(&admin_token),
            Some(json!({ "quantity": 14 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 14);

    let (_, logs) = app
        .request(Method::GET, "/api/financial-logs", Some(&admin_token), None)
        .await;
    let logs = logs.as_array().unwrap().clone();
    assert_eq!(logs.len(), 2);
    assert_eq!(money(&logs[1]["amount"]), 10.0);

    // Shrinking stock writes no expense.
    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/inventory/{item_id}"),
            Some(&admin_token),
            Some(json!({ "quantity": 12 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, logs) = app
        .request(Method::GET, "/api/financial-logs", Some(&admin_token), None)
        .await;
    assert_eq!(logs.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn negative_quantities_and_costs_are_rejected() {
    let app = TestApp::spawn().await;
    let (_, admin_token) = app.register_admin("Admin", "admin@example.com").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/inventory",
            Some(&admin_token),
            Some(json!({ "item_name": "Gloves", "quantity": -1, "unit_cost": 1.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/inventory",
            Some(&admin_token),
            Some(json!({ "item_name": "Gloves", "quantity": 1, "unit_cost": -1.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let item = app.seed_item("Caps", 3, "1.00").await;
    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/inventory/{}", item.item_id),
            Some(&admin_token),
            Some(json!({ "quantity": -2 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn slot_times_are_validated_and_booked_slots_are_protected() {
    let app = TestApp::spawn().await;
    let (_, admin_token) = app.register_admin("Admin", "admin@example.com").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/availability",
            Some(&admin_token),
            Some(json!({
                "date": "2026-09-01",
                "start_time": "15:00:00",
                "end_time": "14:00:00",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = app
        .request(
            Method::POST,
            "/api/availability",
            Some(&admin_token),
            Some(json!({
                "date": "2026-09-01",
                "start_time": "14:00:00",
                "end_time": "14:30:00",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let slot_id = created["slot_id"].as_i64().unwrap();

    // Booked slots cannot be deleted.
    let service = app.seed_service("Glow Up", "50.00").await;
    app.book_appointment(service.service_id, slot_id, "user@example.com")
        .await;

    let (status, body) = app
        .request(
            Method::DELETE,
            &format!("/api/availability/{slot_id}"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"].as_str().unwrap().contains("booked"),
        "unexpected message: {body}"
    );

    // Unbooked slots can.
    let open_slot = app.seed_slot(5).await;
    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/availability/{}", open_slot.slot_id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn available_filter_hides_booked_slots() {
    let app = TestApp::spawn().await;
    let service = app.seed_service("Glow Up", "50.00").await;
    let booked = app.seed_slot(1).await;
    app.seed_slot(2).await;
    app.book_appointment(service.service_id, booked.slot_id, "user@example.com")
        .await;

    let (status, all) = app.request(Method::GET, "/api/availability", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, open) = app
        .request(Method::GET, "/api/availability?available=true", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(open.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn usage_rows_are_upserted_and_validated() {
    let app = TestApp::spawn().await;
    let (_, admin_token) = app.register_admin("Admin", "admin@example.com").await;
    let service = app.seed_service("Glow Up", "50.00").await;
    let item = app.seed_item("Gloves", 5, "1.50").await;
    let uri = format!(
        "/api/services/{}/inventory-usage/{}",
        service.service_id, item.item_id
    );

    let (status, _) = app
        .request(
            Method::PUT,
            &uri,
            Some(&admin_token),
            Some(json!({ "quantity_used": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = app
        .request(
            Method::PUT,
            &uri,
            Some(&admin_token),
            Some(json!({ "quantity_used": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["quantity_used"], 2);

    // Second PUT replaces rather than duplicates.
    let (status, replaced) = app
        .request(
            Method::PUT,
            &uri,
            Some(&admin_token),
            Some(json!({ "quantity_used": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["quantity_used"], 3);

    let (status, rows) = app
        .request(
            Method::GET,
            &format!("/api/services/{}/inventory-usage", service.service_id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 1);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_is_public_to_read_and_admin_to_mutate() {
    let app = TestApp::spawn().await;
    let (_, admin_token) = app.register_admin("Admin", "admin@example.com").await;
    let (_, user_token) = app.register_user("User", "user@example.com").await;

    let (status, created) = app
        .request(
            Method::POST,
            "/api/services",
            Some(&admin_token),
            Some(json!({ "name": "Glow Up", "base_price": 50.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let service_id = created["service_id"].as_i64().unwrap();

    let (status, _) = app
        .request(
            Method::POST,
            "/api/services",
            Some(&user_token),
            Some(json!({ "name": "Sneaky", "base_price": 5.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, listed) = app.request(Method::GET, "/api/services", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Deactivated services drop out of the active listing.
    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/services/{service_id}"),
            Some(&admin_token),
            Some(json!({ "is_active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, active) = app
        .request(Method::GET, "/api/services?active=true", None, None)
        .await;
    assert!(active.as_array().unwrap().is_empty());
}
