/// In-memory payment gateway for tests and local development
///
/// Orders get random ids (`MOCK-ORDER-<uuid>`) so they never repeat across
/// restarts, and are kept in a process-local order book. Capturing an order
/// completes it immediately; capturing it a second time fails the way a
/// real provider refuses a duplicate capture.
///
/// # Example
///
/// ```
/// use bookify_payments::{MockGateway, OrderRequest, PaymentGateway};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = MockGateway::new();
/// let order = gateway
///     .create_order(&OrderRequest::for_reservation(Uuid::new_v4(), 10_000, "USD"))
///     .await?;
///
/// let captured = gateway.capture_order(&order.id).await?;
/// assert!(captured.is_completed());
/// assert_eq!(captured.amount_cents, Some(10_000));
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::gateway::{
    CapturedOrder, CreatedOrder, GatewayError, GatewayResult, OrderRequest, PaymentGateway,
    PaymentLink, STATUS_COMPLETED,
};

#[derive(Debug, Clone)]
struct MockOrder {
    reservation_id: Uuid,
    amount_cents: i64,
    currency: String,
    captured: bool,
}

/// Deterministic gateway with no network access
#[derive(Debug, Default)]
pub struct MockGateway {
    orders: Mutex<HashMap<String, MockOrder>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of orders created so far
    pub async fn order_count(&self) -> usize {
        self.orders.lock().await.len()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn create_order(&self, request: &OrderRequest) -> GatewayResult<CreatedOrder> {
        if request.amount_cents <= 0 {
            return Err(GatewayError::Upstream {
                status: 422,
                body: "INVALID_PARAMETER_VALUE: amount must be positive".to_string(),
            });
        }

        let id = format!("MOCK-ORDER-{}", Uuid::new_v4().simple());

        self.orders.lock().await.insert(
            id.clone(),
            MockOrder {
                reservation_id: request.reservation_id,
                amount_cents: request.amount_cents,
                currency: request.currency.clone(),
                captured: false,
            },
        );

        debug!(order_id = %id, reservation_id = %request.reservation_id, "Mock order created");

        Ok(CreatedOrder {
            links: vec![
                PaymentLink {
                    href: format!("mock://orders/{}", id),
                    rel: "self".to_string(),
                    method: Some("GET".to_string()),
                },
                PaymentLink {
                    href: format!("mock://checkout/{}", id),
                    rel: "approve".to_string(),
                    method: Some("GET".to_string()),
                },
            ],
            id,
            status: "CREATED".to_string(),
        })
    }

    async fn capture_order(&self, order_id: &str) -> GatewayResult<CapturedOrder> {
        let mut orders = self.orders.lock().await;

        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| GatewayError::UnknownOrder(order_id.to_string()))?;

        if order.captured {
            return Err(GatewayError::Upstream {
                status: 422,
                body: "ORDER_ALREADY_CAPTURED".to_string(),
            });
        }
        order.captured = true;

        debug!(order_id = %order_id, "Mock order captured");

        Ok(CapturedOrder {
            id: order_id.to_string(),
            status: STATUS_COMPLETED.to_string(),
            reservation_id: Some(order.reservation_id),
            amount_cents: Some(order.amount_cents),
            currency: Some(order.currency.clone()),
        })
    }
}
