/// Payment endpoints (authenticated)
///
/// - `POST /api/payment/create-order` - Open a gateway order for a pending reservation
/// - `POST /api/payment/capture-order` - Capture an approved order and record the payment
/// - `GET /payments` - All payments for admins, own for guests
/// - `POST /payments` - Record an offline payment (admin)
///
/// # Flow
///
/// ```text
/// create-order {reservation_id}        -> {order_id, approval_url}
///     (payer approves with the provider)
/// capture-order {order_id, reservation_id}
///     COMPLETED -> payment recorded, pending reservation confirmed
///     otherwise -> order returned, nothing recorded
/// ```
///
/// A completed capture is only credited if the provider reports it was made
/// for the same reservation, in the configured currency, for at least the
/// stay total. Anything else is refused with 409 and logged for refund.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use bookify_payments::{CapturedOrder, OrderRequest, PaymentLink};
use bookify_shared::{
    auth::{
        authorization::{require_admin, require_owner_or_admin},
        middleware::AuthContext,
    },
    models::{
        payment::{CreatePayment, Payment},
        reservation::{Reservation, ReservationDetails, ReservationStatus},
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub reservation_id: Uuid,

    /// Defaults to nights × nightly price; never less than that
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_cents: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub status: String,
    pub approval_url: Option<String>,
    pub links: Vec<PaymentLink>,
    pub amount_cents: i64,
    pub currency: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CaptureOrderRequest {
    #[validate(length(min = 1, message = "Order id is required"))]
    pub order_id: String,

    pub reservation_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CaptureOrderResponse {
    pub order: CapturedOrder,

    /// Present when the capture completed
    pub payment: Option<Payment>,
    pub reservation: Option<Reservation>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub reservation_id: Uuid,

    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_cents: i64,

    #[validate(length(min = 1, max = 50, message = "Payment method must be 1 to 50 characters"))]
    pub payment_method: String,

    pub payment_date: Option<DateTime<Utc>>,

    /// Also confirm the reservation if it is pending
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct RecordPaymentResponse {
    pub payment: Payment,
    pub reservation: Reservation,
}

async fn load_owned_reservation(
    state: &AppState,
    auth: &AuthContext,
    id: Uuid,
) -> ApiResult<ReservationDetails> {
    let details = Reservation::find_details(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Reservation {} not found", id)))?;

    require_owner_or_admin(auth, details.reservation.user_id)?;

    Ok(details)
}

fn stay_total(details: &ReservationDetails) -> ApiResult<i64> {
    details
        .total_cents()
        .ok_or_else(|| ApiError::validation("amount_cents", "Reservation total is out of range"))
}

fn require_pending(details: &ReservationDetails) -> ApiResult<()> {
    if details.reservation.status != ReservationStatus::Pending {
        return Err(ApiError::Conflict(format!(
            "Reservation is {} and cannot be paid",
            details.reservation.status
        )));
    }
    Ok(())
}

/// Checks that a completed capture pays for this reservation in full
///
/// Returns the captured amount.
fn verify_capture(
    order: &CapturedOrder,
    reservation_id: Uuid,
    currency: &str,
    total_cents: i64,
) -> ApiResult<i64> {
    if !order.is_for(reservation_id) {
        return Err(ApiError::Conflict(format!(
            "Payment order {} was not created for reservation {}",
            order.id, reservation_id
        )));
    }

    let (Some(amount_cents), Some(captured_currency)) = (order.amount_cents, order.currency.as_deref())
    else {
        return Err(ApiError::UpstreamPayment(format!(
            "Capture of order {} did not report an amount",
            order.id
        )));
    };

    if !captured_currency.eq_ignore_ascii_case(currency) {
        return Err(ApiError::Conflict(format!(
            "Payment order {} was paid in {}, expected {}",
            order.id, captured_currency, currency
        )));
    }

    if amount_cents < total_cents {
        return Err(ApiError::Conflict(format!(
            "Payment order {} covers {} of {} owed",
            order.id, amount_cents, total_cents
        )));
    }

    Ok(amount_cents)
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<Json<CreateOrderResponse>> {
    req.validate()?;

    let details = load_owned_reservation(&state, &auth, req.reservation_id).await?;
    require_pending(&details)?;

    let total_cents = stay_total(&details)?;
    let amount_cents = req.amount_cents.unwrap_or(total_cents);
    if amount_cents < total_cents {
        return Err(ApiError::validation(
            "amount_cents",
            format!("Amount must cover the stay total of {}", total_cents),
        ));
    }

    let order = state
        .payments
        .create_order(&OrderRequest::for_reservation(
            req.reservation_id,
            amount_cents,
            state.currency(),
        ))
        .await?;

    info!(
        order_id = %order.id,
        reservation_id = %req.reservation_id,
        amount_cents,
        provider = state.payments.name(),
        "Payment order created"
    );

    Ok(Json(CreateOrderResponse {
        order_id: order.id.clone(),
        status: order.status.clone(),
        approval_url: order.approval_url().map(str::to_string),
        links: order.links,
        amount_cents,
        currency: state.currency().to_string(),
    }))
}

pub async fn capture_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CaptureOrderRequest>,
) -> ApiResult<Json<CaptureOrderResponse>> {
    req.validate()?;

    let details = load_owned_reservation(&state, &auth, req.reservation_id).await?;
    require_pending(&details)?;
    let total_cents = stay_total(&details)?;

    let order = state.payments.capture_order(&req.order_id).await?;

    if !order.is_completed() {
        info!(order_id = %order.id, status = %order.status, "Capture not completed");
        return Ok(Json(CaptureOrderResponse {
            order,
            payment: None,
            reservation: None,
        }));
    }

    let amount_cents = verify_capture(&order, req.reservation_id, state.currency(), total_cents)
        .map_err(|e| {
            warn!(
                order_id = %order.id,
                reservation_id = %req.reservation_id,
                error = %e,
                "Captured payment not credited, needs refund"
            );
            e
        })?;

    let (payment, reservation) = state
        .bookings
        .record_payment(
            CreatePayment {
                reservation_id: req.reservation_id,
                user_id: details.reservation.user_id,
                amount_cents,
                payment_method: state.payments.name().to_string(),
                provider_reference: Some(order.id.clone()),
                payment_date: None,
            },
            true,
        )
        .await?;

    Ok(Json(CaptureOrderResponse {
        order,
        payment: Some(payment),
        reservation: Some(reservation),
    }))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Payment>>> {
    let payments = if auth.is_admin() {
        Payment::list(&state.db).await?
    } else {
        Payment::list_by_user(&state.db, auth.user_id).await?
    };

    Ok(Json(payments))
}

/// Records a payment taken outside the gateway (admin only)
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<RecordPaymentRequest>,
) -> ApiResult<(StatusCode, Json<RecordPaymentResponse>)> {
    require_admin(&auth)?;
    req.validate()?;

    let reservation = Reservation::find_by_id(&state.db, req.reservation_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Reservation {} not found", req.reservation_id))
        })?;

    let (payment, reservation) = state
        .bookings
        .record_payment(
            CreatePayment {
                reservation_id: reservation.id,
                user_id: reservation.user_id,
                amount_cents: req.amount_cents,
                payment_method: req.payment_method,
                provider_reference: None,
                payment_date: req.payment_date,
            },
            req.confirm,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordPaymentResponse {
            payment,
            reservation,
        }),
    ))
}
