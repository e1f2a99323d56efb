use bookify_payments::{
    GatewayError, OrderRequest, PayPalConfig, PayPalGateway, PaymentGateway,
};
use httpmock::prelude::*;
use serde_json::json;
use uuid::Uuid;

const ACCESS_TOKEN: &str = "A21AAtest-access-token";

// base64("client-id:client-secret")
const BASIC_AUTH: &str = "Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ=";

fn gateway(server: &MockServer) -> PayPalGateway {
    PayPalGateway::new(PayPalConfig {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        base_url: server.base_url(),
    })
    .unwrap()
}

async fn mock_token<'a>(server: &'a MockServer) -> httpmock::Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/oauth2/token")
                .header("authorization", BASIC_AUTH)
                .header("content-type", "application/x-www-form-urlencoded")
                .body("grant_type=client_credentials");
            then.status(200).json_body(json!({
                "scope": "https://uri.paypal.com/services/payments/payment",
                "access_token": ACCESS_TOKEN,
                "token_type": "Bearer",
                "expires_in": 32400
            }));
        })
        .await
}

#[tokio::test]
async fn test_create_order_sends_capture_intent() {
    let server = MockServer::start_async().await;
    let token_mock = mock_token(&server).await;

    let reservation_id = Uuid::new_v4();
    let order_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/checkout/orders")
                .header("authorization", format!("Bearer {}", ACCESS_TOKEN))
                .json_body(json!({
                    "intent": "CAPTURE",
                    "purchase_units": [{
                        "amount": { "currency_code": "USD", "value": "360.00" },
                        "description": format!("Payment for reservation #{}", reservation_id),
                        "custom_id": reservation_id.to_string()
                    }]
                }));
            then.status(201).json_body(json!({
                "id": "5O190127TN364715T",
                "status": "CREATED",
                "links": [
                    { "href": "https://api.sandbox.paypal.com/v2/checkout/orders/5O190127TN364715T", "rel": "self", "method": "GET" },
                    { "href": "https://www.sandbox.paypal.com/checkoutnow?token=5O190127TN364715T", "rel": "approve", "method": "GET" }
                ]
            }));
        })
        .await;

    let order = gateway(&server)
        .create_order(&OrderRequest::for_reservation(reservation_id, 36_000, "USD"))
        .await
        .unwrap();

    token_mock.assert_async().await;
    order_mock.assert_async().await;

    assert_eq!(order.id, "5O190127TN364715T");
    assert_eq!(order.status, "CREATED");
    assert_eq!(order.links.len(), 2);
    assert_eq!(
        order.approval_url(),
        Some("https://www.sandbox.paypal.com/checkoutnow?token=5O190127TN364715T")
    );
}

#[tokio::test]
async fn test_capture_order_reads_captured_amount() {
    let server = MockServer::start_async().await;
    let token_mock = mock_token(&server).await;
    let reservation_id = Uuid::new_v4();

    let capture_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/checkout/orders/5O190127TN364715T/capture")
                .header("authorization", format!("Bearer {}", ACCESS_TOKEN));
            then.status(201).json_body(json!({
                "id": "5O190127TN364715T",
                "status": "COMPLETED",
                "purchase_units": [{
                    "reference_id": "default",
                    "payments": {
                        "captures": [{
                            "id": "3C679366HH908993F",
                            "status": "COMPLETED",
                            "custom_id": reservation_id.to_string(),
                            "amount": { "currency_code": "USD", "value": "360.00" }
                        }]
                    }
                }]
            }));
        })
        .await;

    let captured = gateway(&server)
        .capture_order("5O190127TN364715T")
        .await
        .unwrap();

    token_mock.assert_async().await;
    capture_mock.assert_async().await;

    assert!(captured.is_completed());
    assert_eq!(captured.amount_cents, Some(36_000));
    assert_eq!(captured.currency.as_deref(), Some("USD"));
    assert!(captured.is_for(reservation_id));
}

#[tokio::test]
async fn test_rejected_credentials_stop_before_order_call() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/oauth2/token");
            then.status(401).json_body(json!({
                "error": "invalid_client",
                "error_description": "Client Authentication failed"
            }));
        })
        .await;

    let order_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/checkout/orders");
            then.status(201);
        })
        .await;

    let result = gateway(&server)
        .create_order(&OrderRequest::for_reservation(Uuid::new_v4(), 100, "USD"))
        .await;

    assert!(matches!(result, Err(GatewayError::Authentication(body)) if body.contains("invalid_client")));
    assert_eq!(order_mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_order_failure_carries_status_and_body() {
    let server = MockServer::start_async().await;
    mock_token(&server).await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/checkout/orders");
            then.status(422).json_body(json!({
                "name": "UNPROCESSABLE_ENTITY",
                "details": [{ "issue": "CURRENCY_NOT_SUPPORTED" }]
            }));
        })
        .await;

    let result = gateway(&server)
        .create_order(&OrderRequest::for_reservation(Uuid::new_v4(), 100, "XYZ"))
        .await;

    match result {
        Err(GatewayError::Upstream { status, body }) => {
            assert_eq!(status, 422);
            assert!(body.contains("CURRENCY_NOT_SUPPORTED"));
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_capture_unknown_order() {
    let server = MockServer::start_async().await;
    mock_token(&server).await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/checkout/orders/MISSING/capture");
            then.status(404).json_body(json!({ "name": "RESOURCE_NOT_FOUND" }));
        })
        .await;

    let result = gateway(&server).capture_order("MISSING").await;
    assert!(matches!(result, Err(GatewayError::UnknownOrder(id)) if id == "MISSING"));
}

#[tokio::test]
async fn test_token_response_without_access_token() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/oauth2/token");
            then.status(200).json_body(json!({ "token_type": "Bearer" }));
        })
        .await;

    let result = gateway(&server).capture_order("ANY").await;
    assert!(matches!(result, Err(GatewayError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_error() {
    let gateway = PayPalGateway::new(PayPalConfig {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        base_url: "http://127.0.0.1:1".to_string(),
    })
    .unwrap();

    let result = gateway.capture_order("ANY").await;
    assert!(matches!(result, Err(GatewayError::Transport(_))));
}
