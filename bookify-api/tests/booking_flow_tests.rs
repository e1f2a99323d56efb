//! End-to-end booking flows through the HTTP API
//!
//! Requires a PostgreSQL database at `DATABASE_URL`:
//!
//! ```bash
//! cargo test -p bookify-api --test booking_flow_tests -- --ignored
//! ```

mod common;

use axum::http::StatusCode;
use bookify_payments::{OrderRequest, PaymentGateway};
use chrono::{Days, NaiveDate, Utc};
use common::{request, send, TestContext, PASSWORD};
use serde_json::{json, Value};
use uuid::Uuid;

fn day(offset: u64) -> NaiveDate {
    Utc::now().date_naive() + Days::new(offset)
}

/// Creates a hotel with one room as the admin and returns the room id
async fn create_room(ctx: &TestContext, price_cents: i64) -> String {
    let (status, hotel) = send(
        &ctx.app,
        request(
            "POST",
            "/hotels",
            Some(&ctx.admin_token),
            Some(json!({
                "name": "Seaside Inn",
                "address": "1 Ocean Drive",
                "city": "Miami",
                "state": "FL"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, room) = send(
        &ctx.app,
        request(
            "POST",
            "/rooms",
            Some(&ctx.admin_token),
            Some(json!({
                "hotel_id": hotel["id"],
                "room_type": "Double",
                "name": "101",
                "price_cents": price_cents
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    room["id"].as_str().unwrap().to_string()
}

async fn book(ctx: &TestContext, token: &str, room_id: &str, from: u64, to: u64) -> (StatusCode, Value) {
    send(
        &ctx.app,
        request(
            "POST",
            "/reservations",
            Some(token),
            Some(json!({
                "room_id": room_id,
                "check_in_date": day(from),
                "check_out_date": day(to)
            })),
        ),
    )
    .await
}

async fn capture(ctx: &TestContext, order_id: &str, reservation_id: &str) -> (StatusCode, Value) {
    send(
        &ctx.app,
        request(
            "POST",
            "/api/payment/capture-order",
            Some(&ctx.guest_token),
            Some(json!({ "order_id": order_id, "reservation_id": reservation_id })),
        ),
    )
    .await
}

async fn status_of(ctx: &TestContext, reservation_id: &str) -> Value {
    let (status, details) = send(
        &ctx.app,
        request("GET", &format!("/reservations/{}", reservation_id), Some(&ctx.admin_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    details["status"].clone()
}

async fn payment_count(ctx: &TestContext) -> usize {
    let (_, payments) = send(&ctx.app, request("GET", "/payments", Some(&ctx.guest_token), None)).await;
    payments.as_array().unwrap().len()
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_register_login_refresh() {
    let ctx = TestContext::new().await.unwrap();
    let email = format!("flow-{}@example.com", Uuid::new_v4());

    let (status, registered) = send(
        &ctx.app,
        request(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "email": email, "password": PASSWORD, "name": "Flow" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["role"], "guest");

    let (status, _) = send(
        &ctx.app,
        request(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "email": email, "password": PASSWORD, "name": "Again" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &ctx.app,
        request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": "Wrong-password-1" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, tokens) = send(
        &ctx.app,
        request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": PASSWORD })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, refreshed) = send(
        &ctx.app,
        request(
            "POST",
            "/auth/refresh",
            None,
            Some(json!({ "refresh_token": tokens["refresh_token"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let access = refreshed["access_token"].as_str().unwrap();
    let (status, own) = send(
        &ctx.app,
        request("GET", &format!("/users/{}", registered["user_id"].as_str().unwrap()), Some(access), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(own.get("password_hash").is_none());
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_book_pay_and_confirm() {
    let ctx = TestContext::new().await.unwrap();
    let room_id = create_room(&ctx, 12_000).await;

    let (status, reservation) = book(&ctx, &ctx.guest_token, &room_id, 10, 13).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reservation["status"], "pending");
    let reservation_id = reservation["id"].as_str().unwrap().to_string();

    // Overlapping stay on the same room
    let (status, _) = book(&ctx, &ctx.guest_token, &room_id, 12, 14).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, availability) = send(
        &ctx.app,
        request(
            "GET",
            &format!("/rooms/{}/availability?check_in={}&check_out={}", room_id, day(11), day(12)),
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(availability["available"], false);

    let (status, order) = send(
        &ctx.app,
        request(
            "POST",
            "/api/payment/create-order",
            Some(&ctx.guest_token),
            Some(json!({ "reservation_id": reservation_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["amount_cents"], 36_000);
    assert_eq!(order["currency"], "USD");
    assert!(order["approval_url"].as_str().is_some());

    let (status, captured) = send(
        &ctx.app,
        request(
            "POST",
            "/api/payment/capture-order",
            Some(&ctx.guest_token),
            Some(json!({ "order_id": order["order_id"], "reservation_id": reservation_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(captured["order"]["status"], "COMPLETED");
    assert_eq!(captured["payment"]["amount_cents"], 36_000);
    assert_eq!(captured["payment"]["payment_method"], "Mock");
    assert_eq!(captured["reservation"]["status"], "confirmed");

    // A confirmed reservation cannot be paid again
    let (status, _) = send(
        &ctx.app,
        request(
            "POST",
            "/api/payment/create-order",
            Some(&ctx.guest_token),
            Some(json!({ "reservation_id": reservation_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Nor cancelled by the guest
    let (status, _) = send(
        &ctx.app,
        request(
            "PUT",
            &format!("/reservations/{}/status", reservation_id),
            Some(&ctx.guest_token),
            Some(json!({ "status": "cancelled" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, payments) = send(&ctx.app, request("GET", "/payments", Some(&ctx.guest_token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payments.as_array().unwrap().len(), 1);

    // The guest has a booking and cannot be deleted
    let (status, _) = send(
        &ctx.app,
        request("DELETE", &format!("/users/{}", ctx.guest.id), Some(&ctx.admin_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_guest_cancels_pending_reservation() {
    let ctx = TestContext::new().await.unwrap();
    let room_id = create_room(&ctx, 9_000).await;

    let (_, reservation) = book(&ctx, &ctx.guest_token, &room_id, 20, 22).await;
    let reservation_id = reservation["id"].as_str().unwrap();

    let (status, cancelled) = send(
        &ctx.app,
        request(
            "PUT",
            &format!("/reservations/{}/status", reservation_id),
            Some(&ctx.guest_token),
            Some(json!({ "status": "cancelled" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    // The dates are free again
    let (status, _) = book(&ctx, &ctx.guest_token, &room_id, 20, 22).await;
    assert_eq!(status, StatusCode::CREATED);

    // Cancelled is terminal
    let (status, _) = send(
        &ctx.app,
        request(
            "PUT",
            &format!("/reservations/{}/status", reservation_id),
            Some(&ctx.admin_token),
            Some(json!({ "status": "confirmed" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_reservations_scoped_to_owner() {
    let ctx = TestContext::new().await.unwrap();
    let room_id = create_room(&ctx, 15_000).await;

    let (_, reservation) = book(&ctx, &ctx.admin_token, &room_id, 30, 31).await;
    let reservation_id = reservation["id"].as_str().unwrap();

    let (status, _) = send(
        &ctx.app,
        request("GET", &format!("/reservations/{}", reservation_id), Some(&ctx.guest_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, own) = send(&ctx.app, request("GET", "/reservations", Some(&ctx.guest_token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(own
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["user_id"] == ctx.guest.id.to_string()));

    let (status, details) = send(
        &ctx.app,
        request("GET", &format!("/reservations/{}", reservation_id), Some(&ctx.admin_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["room_name"], "101");
    assert_eq!(details["hotel_name"], "Seaside Inn");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_order_cannot_pay_another_reservation() {
    let ctx = TestContext::new().await.unwrap();
    let room_id = create_room(&ctx, 50_000).await;

    let (_, cheap) = book(&ctx, &ctx.guest_token, &room_id, 40, 41).await;
    let (_, expensive) = book(&ctx, &ctx.guest_token, &room_id, 50, 60).await;
    let cheap_id = cheap["id"].as_str().unwrap();
    let expensive_id = expensive["id"].as_str().unwrap();

    // Orders below the stay total are refused up front
    let (status, json) = send(
        &ctx.app,
        request(
            "POST",
            "/api/payment/create-order",
            Some(&ctx.guest_token),
            Some(json!({ "reservation_id": cheap_id, "amount_cents": 1 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["details"][0]["field"], "amount_cents");

    let (status, order) = send(
        &ctx.app,
        request(
            "POST",
            "/api/payment/create-order",
            Some(&ctx.guest_token),
            Some(json!({ "reservation_id": cheap_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["amount_cents"], 50_000);

    let (status, json) = capture(&ctx, order["order_id"].as_str().unwrap(), expensive_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");

    assert_eq!(status_of(&ctx, expensive_id).await, "pending");
    assert_eq!(status_of(&ctx, cheap_id).await, "pending");
    assert_eq!(payment_count(&ctx).await, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_capture_requires_full_amount_in_configured_currency() {
    let ctx = TestContext::new().await.unwrap();
    let room_id = create_room(&ctx, 12_000).await;

    let (_, reservation) = book(&ctx, &ctx.guest_token, &room_id, 70, 73).await;
    let reservation_id = reservation["id"].as_str().unwrap();
    let id = Uuid::parse_str(reservation_id).unwrap();

    let short = ctx
        .gateway
        .create_order(&OrderRequest::for_reservation(id, 1, "USD"))
        .await
        .unwrap();
    let (status, _) = capture(&ctx, &short.id, reservation_id).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let foreign = ctx
        .gateway
        .create_order(&OrderRequest::for_reservation(id, 36_000, "EUR"))
        .await
        .unwrap();
    let (status, _) = capture(&ctx, &foreign.id, reservation_id).await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(status_of(&ctx, reservation_id).await, "pending");
    assert_eq!(payment_count(&ctx).await, 0);

    let full = ctx
        .gateway
        .create_order(&OrderRequest::for_reservation(id, 36_000, "USD"))
        .await
        .unwrap();
    let (status, captured) = capture(&ctx, &full.id, reservation_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(captured["reservation"]["status"], "confirmed");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_capture_refused_once_confirmed() {
    let ctx = TestContext::new().await.unwrap();
    let room_id = create_room(&ctx, 8_000).await;

    let (_, reservation) = book(&ctx, &ctx.guest_token, &room_id, 80, 81).await;
    let reservation_id = reservation["id"].as_str().unwrap();
    let id = Uuid::parse_str(reservation_id).unwrap();

    let first = ctx
        .gateway
        .create_order(&OrderRequest::for_reservation(id, 8_000, "USD"))
        .await
        .unwrap();
    let (status, _) = capture(&ctx, &first.id, reservation_id).await;
    assert_eq!(status, StatusCode::OK);

    let second = ctx
        .gateway
        .create_order(&OrderRequest::for_reservation(id, 8_000, "USD"))
        .await
        .unwrap();
    let (status, _) = capture(&ctx, &second.id, reservation_id).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The refused order was never sent to the gateway
    let captured = ctx.gateway.capture_order(&second.id).await.unwrap();
    assert!(captured.is_completed());
    assert_eq!(payment_count(&ctx).await, 1);
}
