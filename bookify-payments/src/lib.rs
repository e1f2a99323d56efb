//! # Bookify Payments
//!
//! Payment provider integrations for the Bookify API.
//!
//! ## Modules
//!
//! - `gateway`: The `PaymentGateway` trait and its request/response types
//! - `paypal`: PayPal Orders v2 over `reqwest`
//! - `mock`: Deterministic in-memory gateway
//!
//! ## Example
//!
//! ```no_run
//! use bookify_payments::{MockGateway, PaymentGateway};
//! use std::sync::Arc;
//!
//! let gateway: Arc<dyn PaymentGateway> = Arc::new(MockGateway::new());
//! println!("Using {} gateway", gateway.name());
//! ```

pub mod gateway;
pub mod mock;
pub mod paypal;

pub use gateway::{
    CapturedOrder, CreatedOrder, GatewayError, GatewayResult, OrderRequest, PaymentGateway,
    PaymentLink, STATUS_COMPLETED,
};
pub use mock::MockGateway;
pub use paypal::{PayPalConfig, PayPalGateway, SANDBOX_BASE_URL};
