/// Reservation model and database operations
///
/// A reservation books one room for one user over the half-open date
/// interval `[check_in_date, check_out_date)`.
///
/// # State Machine
///
/// ```text
/// pending → confirmed → checked_in → checked_out
/// pending → checked_in
/// pending → cancelled
/// ```
///
/// Transition rules live in [`crate::booking::lifecycle`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE reservation_status AS ENUM (
///     'pending', 'confirmed', 'checked_in', 'checked_out', 'cancelled'
/// );
///
/// CREATE TABLE reservations (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
///     room_id UUID NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
///     check_in_date DATE NOT NULL,
///     check_out_date DATE NOT NULL,
///     status reservation_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CHECK (check_in_date < check_out_date),
///     EXCLUDE USING gist (
///         room_id WITH =,
///         daterange(check_in_date, check_out_date, '[)') WITH &&
///     ) WHERE (status <> 'cancelled')
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reservation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Created, awaiting payment or confirmation
    Pending,

    /// Paid or confirmed by an admin
    Confirmed,

    /// Guest has arrived
    CheckedIn,

    /// Guest has left
    CheckedOut,

    /// Released; no longer blocks the room
    Cancelled,
}

impl ReservationStatus {
    /// Converts status to its database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::CheckedIn => "checked_in",
            ReservationStatus::CheckedOut => "checked_out",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal statuses accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::CheckedOut | ReservationStatus::Cancelled
        )
    }

    /// Whether a reservation in this status occupies its room
    pub fn blocks_room(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reservation row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Number of nights covered by the stay
    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }
}

/// A reservation joined with its room, hotel and guest
///
/// This is the shape returned by the HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReservationDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub reservation: Reservation,
    pub room_name: String,
    pub room_type: String,
    pub price_cents: i64,
    pub hotel_id: Uuid,
    pub hotel_name: String,
    pub user_email: String,
    pub user_name: String,
}

impl ReservationDetails {
    /// Full price of the stay in minor units, or `None` on overflow
    pub fn total_cents(&self) -> Option<i64> {
        self.price_cents.checked_mul(self.reservation.nights())
    }
}

/// Input for inserting a reservation
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
}

const RESERVATION_COLUMNS: &str =
    "id, user_id, room_id, check_in_date, check_out_date, status, created_at, updated_at";

const DETAILS_SELECT: &str = r#"
    SELECT res.id, res.user_id, res.room_id, res.check_in_date, res.check_out_date,
           res.status, res.created_at, res.updated_at,
           r.name AS room_name, r.room_type, r.price_cents,
           h.id AS hotel_id, h.name AS hotel_name,
           u.email AS user_email, u.name AS user_name
    FROM reservations res
    JOIN rooms r ON r.id = res.room_id
    JOIN hotels h ON h.id = r.hotel_id
    JOIN users u ON u.id = res.user_id
"#;

impl Reservation {
    /// Inserts a reservation in `Pending` status
    ///
    /// Callers are expected to have checked availability under a room lock;
    /// the exclusion constraint rejects overlaps that slip through with
    /// SQLSTATE `23P01`.
    pub async fn insert<'e, E>(executor: E, data: NewReservation) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            r#"
            INSERT INTO reservations (user_id, room_id, check_in_date, check_out_date, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING {RESERVATION_COLUMNS}
            "#
        ))
        .bind(data.user_id)
        .bind(data.room_id)
        .bind(data.check_in_date)
        .bind(data.check_out_date)
        .fetch_one(executor)
        .await?;

        Ok(reservation)
    }

    /// Finds a reservation by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(reservation)
    }

    /// Finds a reservation and locks its row until the transaction ends
    pub async fn find_for_update<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(reservation)
    }

    /// Loads the non-cancelled reservations of a room that overlap
    /// `[check_in, check_out)`
    pub async fn find_overlapping<'e, E>(
        executor: E,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM reservations
            WHERE room_id = $1
              AND status <> 'cancelled'
              AND check_in_date < $3
              AND check_out_date > $2
            ORDER BY check_in_date
            "#
        ))
        .bind(room_id)
        .bind(check_in)
        .bind(check_out)
        .fetch_all(executor)
        .await?;

        Ok(reservations)
    }

    /// Lists every reservation of a room, oldest stay first
    pub async fn list_by_room(pool: &PgPool, room_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE room_id = $1 ORDER BY check_in_date"
        ))
        .bind(room_id)
        .fetch_all(pool)
        .await?;

        Ok(reservations)
    }

    /// Compare-and-set status update
    ///
    /// The row is only written while it is still in `expected`. Returns
    /// `None` when the reservation is missing or its status moved on.
    pub async fn update_status<'e, E>(
        executor: E,
        id: Uuid,
        expected: ReservationStatus,
        next: ReservationStatus,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            r#"
            UPDATE reservations
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {RESERVATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected)
        .bind(next)
        .fetch_optional(executor)
        .await?;

        Ok(reservation)
    }

    /// Finds a reservation with its joined details
    pub async fn find_details(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ReservationDetails>, sqlx::Error> {
        let details = sqlx::query_as::<_, ReservationDetails>(&format!(
            "{DETAILS_SELECT} WHERE res.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(details)
    }

    /// Lists all reservations with details, newest first
    pub async fn list_details(pool: &PgPool) -> Result<Vec<ReservationDetails>, sqlx::Error> {
        let details = sqlx::query_as::<_, ReservationDetails>(&format!(
            "{DETAILS_SELECT} ORDER BY res.created_at DESC"
        ))
        .fetch_all(pool)
        .await?;

        Ok(details)
    }

    /// Lists one user's reservations with details, newest first
    pub async fn list_details_by_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ReservationDetails>, sqlx::Error> {
        let details = sqlx::query_as::<_, ReservationDetails>(&format!(
            "{DETAILS_SELECT} WHERE res.user_id = $1 ORDER BY res.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(ReservationStatus::Pending.as_str(), "pending");
        assert_eq!(ReservationStatus::Confirmed.as_str(), "confirmed");
        assert_eq!(ReservationStatus::CheckedIn.as_str(), "checked_in");
        assert_eq!(ReservationStatus::CheckedOut.as_str(), "checked_out");
        assert_eq!(ReservationStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_status_serde_is_snake_case() {
        let status: ReservationStatus = serde_json::from_str("\"checked_in\"").unwrap();
        assert_eq!(status, ReservationStatus::CheckedIn);
        assert_eq!(
            serde_json::to_string(&ReservationStatus::CheckedOut).unwrap(),
            "\"checked_out\""
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ReservationStatus::CheckedOut.is_terminal());
        assert!(ReservationStatus::Cancelled.is_terminal());
        assert!(!ReservationStatus::Pending.is_terminal());
        assert!(!ReservationStatus::Confirmed.is_terminal());
        assert!(!ReservationStatus::CheckedIn.is_terminal());
    }

    #[test]
    fn test_only_cancelled_releases_room() {
        assert!(!ReservationStatus::Cancelled.blocks_room());
        assert!(ReservationStatus::CheckedOut.blocks_room());
        assert!(ReservationStatus::Pending.blocks_room());
    }

    #[test]
    fn test_nights_and_total() {
        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            check_in_date: date("2024-01-01"),
            check_out_date: date("2024-01-05"),
            status: ReservationStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(reservation.nights(), 4);

        let details = ReservationDetails {
            reservation,
            room_name: "101".to_string(),
            room_type: "single".to_string(),
            price_cents: 8_050,
            hotel_id: Uuid::new_v4(),
            hotel_name: "Seaside Inn".to_string(),
            user_email: "guest@example.com".to_string(),
            user_name: "Guest".to_string(),
        };
        assert_eq!(details.total_cents(), Some(32_200));

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["check_in_date"], "2024-01-01");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["hotel_name"], "Seaside Inn");
    }
}
