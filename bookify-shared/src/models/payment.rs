/// Payment model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE payments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     reservation_id UUID NOT NULL REFERENCES reservations(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
///     amount_cents BIGINT NOT NULL CHECK (amount_cents > 0),
///     payment_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     payment_method VARCHAR(50) NOT NULL,
///     provider_reference TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `provider_reference` holds the gateway order id and is unique when set, so
/// a captured order can only be recorded once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Label used for payments captured through PayPal
pub const METHOD_PAYPAL: &str = "PayPal";

/// A recorded payment
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub user_id: Uuid,

    /// Amount in minor units
    pub amount_cents: i64,

    pub payment_date: DateTime<Utc>,
    pub payment_method: String,

    /// Gateway order id, if the payment came through a provider
    pub provider_reference: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for recording a payment
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub reservation_id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub payment_method: String,
    pub provider_reference: Option<String>,

    /// Defaults to now when absent
    pub payment_date: Option<DateTime<Utc>>,
}

const PAYMENT_COLUMNS: &str = "id, reservation_id, user_id, amount_cents, payment_date, \
                               payment_method, provider_reference, created_at";

impl Payment {
    /// Records a payment
    ///
    /// # Errors
    ///
    /// Returns a unique violation if `provider_reference` was already
    /// recorded, a foreign key violation for an unknown reservation or user,
    /// or a check violation for a non-positive amount.
    pub async fn create<'e, E>(executor: E, data: CreatePayment) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments
                (reservation_id, user_id, amount_cents, payment_method, provider_reference, payment_date)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(data.reservation_id)
        .bind(data.user_id)
        .bind(data.amount_cents)
        .bind(data.payment_method)
        .bind(data.provider_reference)
        .bind(data.payment_date)
        .fetch_one(executor)
        .await?;

        Ok(payment)
    }

    /// Finds a payment by its gateway reference
    pub async fn find_by_reference(
        pool: &PgPool,
        reference: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE provider_reference = $1"
        ))
        .bind(reference)
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }

    /// Lists all payments, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY payment_date DESC"
        ))
        .fetch_all(pool)
        .await?;

        Ok(payments)
    }

    /// Lists the payments made by one user, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE user_id = $1 ORDER BY payment_date DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(payments)
    }

    /// Lists the payments recorded against one reservation
    pub async fn list_by_reservation(
        pool: &PgPool,
        reservation_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE reservation_id = $1 ORDER BY payment_date"
        ))
        .bind(reservation_id)
        .fetch_all(pool)
        .await?;

        Ok(payments)
    }
}
