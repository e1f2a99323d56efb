/// PayPal Orders v2 gateway
///
/// Every operation is a fresh OAuth2 client-credentials handshake followed by
/// one Orders API call:
///
/// 1. `POST {base}/v1/oauth2/token` with HTTP Basic `client_id:client_secret`
///    and form body `grant_type=client_credentials`
/// 2. `POST {base}/v2/checkout/orders` or
///    `POST {base}/v2/checkout/orders/{id}/capture` with the bearer token
///
/// # Example
///
/// ```no_run
/// use bookify_payments::{OrderRequest, PaymentGateway, PayPalConfig, PayPalGateway};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = PayPalGateway::new(PayPalConfig::sandbox("client-id", "client-secret"))?;
/// let order = gateway
///     .create_order(&OrderRequest::for_reservation(Uuid::new_v4(), 25_000, "USD"))
///     .await?;
/// println!("Approve at {:?}", order.approval_url());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use bookify_shared::models::payment::METHOD_PAYPAL;
use bookify_shared::money::{format_cents, parse_cents};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::gateway::{
    CapturedOrder, CreatedOrder, GatewayError, GatewayResult, OrderRequest, PaymentGateway,
};

/// Sandbox API host
pub const SANDBOX_BASE_URL: &str = "https://api-m.sandbox.paypal.com";

/// Default request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// PayPal credentials and endpoint
#[derive(Clone)]
pub struct PayPalConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
}

impl PayPalConfig {
    /// Credentials against the sandbox host
    pub fn sandbox(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: SANDBOX_BASE_URL.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl std::fmt::Debug for PayPalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPalConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    id: String,
    status: String,
    #[serde(default)]
    purchase_units: Vec<CaptureUnit>,
}

#[derive(Debug, Deserialize)]
struct CaptureUnit {
    custom_id: Option<String>,
    payments: Option<CapturePayments>,
}

#[derive(Debug, Deserialize)]
struct CapturePayments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
struct Capture {
    custom_id: Option<String>,
    amount: Option<Amount>,
}

#[derive(Debug, Deserialize)]
struct Amount {
    currency_code: String,
    value: String,
}

/// Gateway backed by the PayPal REST API
#[derive(Debug, Clone)]
pub struct PayPalGateway {
    config: PayPalConfig,
    client: Client,
}

impl PayPalGateway {
    /// Builds the gateway and its HTTP client
    pub fn new(config: PayPalConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &PayPalConfig {
        &self.config
    }

    /// Fetches a client-credentials access token
    async fn access_token(&self) -> GatewayResult<String> {
        debug!(base_url = %self.config.base_url, "Requesting PayPal access token");

        let response = self
            .client
            .post(self.config.url("/v1/oauth2/token"))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "PayPal rejected client credentials");
            return Err(GatewayError::Authentication(body));
        }

        let token: TokenResponse = parse_json(ensure_success(response).await?).await?;

        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::InvalidResponse("token response has no access_token".into()))
    }
}

/// Turns a non-2xx response into `GatewayError::Upstream`
async fn ensure_success(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!(status = status.as_u16(), body = %body, "PayPal request failed");
    Err(GatewayError::Upstream {
        status: status.as_u16(),
        body,
    })
}

/// Reservation id sent as `custom_id` when the order was created
///
/// PayPal echoes it on the purchase unit or on each capture.
fn captured_reservation(response: &CaptureResponse) -> GatewayResult<Option<Uuid>> {
    let custom_id = response.purchase_units.iter().find_map(|unit| {
        unit.custom_id.as_deref().or_else(|| {
            unit.payments
                .as_ref()
                .and_then(|p| p.captures.iter().find_map(|c| c.custom_id.as_deref()))
        })
    });

    custom_id
        .map(|id| {
            Uuid::parse_str(id)
                .map_err(|_| GatewayError::InvalidResponse(format!("custom_id {} is not a reservation id", id)))
        })
        .transpose()
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> GatewayResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

fn captured_amount(response: &CaptureResponse) -> GatewayResult<(Option<i64>, Option<String>)> {
    let amount = response
        .purchase_units
        .iter()
        .filter_map(|u| u.payments.as_ref())
        .flat_map(|p| p.captures.iter())
        .find_map(|c| c.amount.as_ref());

    match amount {
        Some(amount) => {
            let cents = parse_cents(&amount.value)
                .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
            Ok((Some(cents), Some(amount.currency_code.clone())))
        }
        None => Ok((None, None)),
    }
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    fn name(&self) -> &str {
        METHOD_PAYPAL
    }

    async fn create_order(&self, request: &OrderRequest) -> GatewayResult<CreatedOrder> {
        info!(
            reservation_id = %request.reservation_id,
            amount_cents = request.amount_cents,
            currency = %request.currency,
            "Creating PayPal order"
        );

        let token = self.access_token().await?;

        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": request.currency,
                    "value": format_cents(request.amount_cents),
                },
                "description": request.description,
                "custom_id": request.reservation_id.to_string(),
            }]
        });

        let response = self
            .client
            .post(self.config.url("/v2/checkout/orders"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let order: CreatedOrder = parse_json(ensure_success(response).await?).await?;

        info!(order_id = %order.id, status = %order.status, "PayPal order created");
        Ok(order)
    }

    async fn capture_order(&self, order_id: &str) -> GatewayResult<CapturedOrder> {
        info!(order_id = %order_id, "Capturing PayPal order");

        let token = self.access_token().await?;

        let response = self
            .client
            .post(self.config.url(&format!("/v2/checkout/orders/{}/capture", order_id)))
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::UnknownOrder(order_id.to_string()));
        }

        let capture: CaptureResponse = parse_json(ensure_success(response).await?).await?;
        let (amount_cents, currency) = captured_amount(&capture)?;
        let reservation_id = captured_reservation(&capture)?;

        info!(
            order_id = %capture.id,
            status = %capture.status,
            reservation_id = ?reservation_id,
            amount_cents = ?amount_cents,
            "PayPal order captured"
        );

        Ok(CapturedOrder {
            id: capture.id,
            status: capture.status,
            reservation_id,
            amount_cents,
            currency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_debug_redacts_secret() {
        let config = PayPalConfig::sandbox("client", "super-secret");
        let debug = format!("{:?}", config);

        assert!(debug.contains("client"));
        assert!(!debug.contains("super-secret"));
        assert_eq!(config.base_url, SANDBOX_BASE_URL);
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = PayPalConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..PayPalConfig::sandbox("a", "b")
        };
        assert_eq!(
            config.url("/v1/oauth2/token"),
            "http://localhost:9000/v1/oauth2/token"
        );
    }

    #[test]
    fn test_captured_amount_reads_first_capture() {
        let response: CaptureResponse = serde_json::from_value(json!({
            "id": "ORDER-1",
            "status": "COMPLETED",
            "purchase_units": [{
                "reference_id": "default",
                "payments": {
                    "captures": [{
                        "id": "CAP-1",
                        "status": "COMPLETED",
                        "amount": { "currency_code": "USD", "value": "240.50" }
                    }]
                }
            }]
        }))
        .unwrap();

        let (cents, currency) = captured_amount(&response).unwrap();
        assert_eq!(cents, Some(24_050));
        assert_eq!(currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_captured_amount_missing() {
        let response: CaptureResponse =
            serde_json::from_value(json!({ "id": "ORDER-2", "status": "PENDING" })).unwrap();

        assert_eq!(captured_amount(&response).unwrap(), (None, None));
        assert_eq!(captured_reservation(&response).unwrap(), None);
    }

    #[test]
    fn test_captured_reservation_from_unit_or_capture() {
        let id = Uuid::new_v4();

        let on_unit: CaptureResponse = serde_json::from_value(json!({
            "id": "ORDER-3",
            "status": "COMPLETED",
            "purchase_units": [{ "custom_id": id.to_string() }]
        }))
        .unwrap();
        assert_eq!(captured_reservation(&on_unit).unwrap(), Some(id));

        let on_capture: CaptureResponse = serde_json::from_value(json!({
            "id": "ORDER-4",
            "status": "COMPLETED",
            "purchase_units": [{
                "payments": { "captures": [{ "custom_id": id.to_string() }] }
            }]
        }))
        .unwrap();
        assert_eq!(captured_reservation(&on_capture).unwrap(), Some(id));
    }

    #[test]
    fn test_captured_reservation_rejects_garbage() {
        let response: CaptureResponse = serde_json::from_value(json!({
            "id": "ORDER-5",
            "status": "COMPLETED",
            "purchase_units": [{ "custom_id": "not-a-uuid" }]
        }))
        .unwrap();

        assert!(matches!(
            captured_reservation(&response),
            Err(GatewayError::InvalidResponse(_))
        ));
    }
}
