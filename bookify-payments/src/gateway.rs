/// Payment gateway contract
///
/// A gateway takes payment in two steps, mirroring hosted checkout flows:
///
/// ```text
/// create_order(amount)  ──> order id + approval link
///        (payer approves on the provider's page)
/// capture_order(id)     ──> COMPLETED + captured amount
/// ```
///
/// Calls are made once; there are no retries at this layer. Any failure is
/// surfaced to the caller as a [`GatewayError`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status reported for a successfully captured order
pub const STATUS_COMPLETED: &str = "COMPLETED";

/// Gateway error types
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Credentials were rejected when requesting an access token
    #[error("Payment provider rejected credentials: {0}")]
    Authentication(String),

    /// Provider answered with a non-success status
    #[error("Payment provider returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Request never got a response
    #[error("Payment provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response could not be understood
    #[error("Unexpected payment provider response: {0}")]
    InvalidResponse(String),

    /// Order id is not known to the provider
    #[error("Unknown payment order: {0}")]
    UnknownOrder(String),
}

/// Result type alias for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Order to be created with the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub reservation_id: Uuid,

    /// Amount in minor units
    pub amount_cents: i64,

    /// ISO 4217 code, e.g. `USD`
    pub currency: String,

    pub description: String,
}

impl OrderRequest {
    /// Builds the order for paying a reservation
    pub fn for_reservation(reservation_id: Uuid, amount_cents: i64, currency: impl Into<String>) -> Self {
        Self {
            reservation_id,
            amount_cents,
            currency: currency.into(),
            description: format!("Payment for reservation #{}", reservation_id),
        }
    }
}

/// HATEOAS link returned with an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLink {
    pub href: String,
    pub rel: String,
    #[serde(default)]
    pub method: Option<String>,
}

/// Order as created by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOrder {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub links: Vec<PaymentLink>,
}

impl CreatedOrder {
    /// URL the payer must visit to approve the order
    pub fn approval_url(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel == "approve" || l.rel == "payer-action")
            .map(|l| l.href.as_str())
    }
}

/// Result of capturing an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedOrder {
    pub id: String,
    pub status: String,

    /// Reservation the order was created for, echoed back by the provider
    pub reservation_id: Option<Uuid>,

    /// Captured amount in minor units, when the provider reports it
    pub amount_cents: Option<i64>,

    pub currency: Option<String>,
}

impl CapturedOrder {
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }

    /// True if the provider says this order pays for `reservation_id`
    pub fn is_for(&self, reservation_id: Uuid) -> bool {
        self.reservation_id == Some(reservation_id)
    }
}

/// A payment provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Short provider name used in logs and as the payment method label
    fn name(&self) -> &str;

    /// Creates an order awaiting payer approval
    async fn create_order(&self, request: &OrderRequest) -> GatewayResult<CreatedOrder>;

    /// Captures an approved order
    async fn capture_order(&self, order_id: &str) -> GatewayResult<CapturedOrder>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_request_description() {
        let id = Uuid::new_v4();
        let request = OrderRequest::for_reservation(id, 12_000, "USD");

        assert_eq!(request.description, format!("Payment for reservation #{}", id));
        assert_eq!(request.currency, "USD");
        assert_eq!(request.amount_cents, 12_000);
    }

    #[test]
    fn test_approval_url() {
        let order = CreatedOrder {
            id: "5O190127TN364715T".to_string(),
            status: "CREATED".to_string(),
            links: vec![
                PaymentLink {
                    href: "https://api.example/v2/checkout/orders/5O190127TN364715T".to_string(),
                    rel: "self".to_string(),
                    method: Some("GET".to_string()),
                },
                PaymentLink {
                    href: "https://www.example/checkoutnow?token=5O190127TN364715T".to_string(),
                    rel: "approve".to_string(),
                    method: Some("GET".to_string()),
                },
            ],
        };

        assert_eq!(
            order.approval_url(),
            Some("https://www.example/checkoutnow?token=5O190127TN364715T")
        );
    }

    #[test]
    fn test_capture_completed() {
        let captured = CapturedOrder {
            id: "X".to_string(),
            status: "COMPLETED".to_string(),
            reservation_id: None,
            amount_cents: Some(100),
            currency: Some("USD".to_string()),
        };
        assert!(captured.is_completed());

        let pending = CapturedOrder {
            status: "PENDING".to_string(),
            ..captured
        };
        assert!(!pending.is_completed());
    }

    #[test]
    fn test_capture_matches_reservation() {
        let reservation_id = Uuid::new_v4();
        let captured = CapturedOrder {
            id: "X".to_string(),
            status: "COMPLETED".to_string(),
            reservation_id: Some(reservation_id),
            amount_cents: Some(100),
            currency: Some("USD".to_string()),
        };

        assert!(captured.is_for(reservation_id));
        assert!(!captured.is_for(Uuid::new_v4()));

        let unlabelled = CapturedOrder {
            reservation_id: None,
            ..captured
        };
        assert!(!unlabelled.is_for(reservation_id));
    }
}
