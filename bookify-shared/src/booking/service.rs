//! Transactional booking service
//!
//! Booking runs in a single transaction that locks the room row
//! (`SELECT ... FOR UPDATE`), so two requests for the same room are
//! serialized and the second one sees the first one's reservation when it
//! runs the availability check. The exclusion constraint on `reservations`
//! rejects anything that bypasses this path.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::availability::{find_conflict, validate_stay};
use super::error::BookingError;
use super::lifecycle::check_transition;
use crate::models::payment::{CreatePayment, Payment};
use crate::models::reservation::{NewReservation, Reservation, ReservationStatus};

/// Result of an availability query for one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub room_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub available: bool,
}

/// Books rooms, moves reservations through their lifecycle and records
/// payments against them
#[derive(Debug, Clone)]
pub struct BookingService {
    pool: PgPool,
}

impl BookingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates a `Pending` reservation if the room is free
    ///
    /// # Errors
    ///
    /// - `Validation` for inverted dates or a check-in before `today`
    /// - `NotFound` for an unknown user or room
    /// - `Conflict` if a non-cancelled reservation overlaps the stay
    pub async fn reserve(
        &self,
        request: NewReservation,
        today: NaiveDate,
    ) -> Result<Reservation, BookingError> {
        validate_stay(request.check_in_date, request.check_out_date, Some(today))?;

        let mut tx = self.pool.begin().await?;

        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(request.user_id)
                .fetch_one(&mut *tx)
                .await?;
        if !user_exists {
            return Err(BookingError::not_found("user", request.user_id));
        }

        // Serializes bookings per room until commit
        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM rooms WHERE id = $1 FOR UPDATE")
            .bind(request.room_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(BookingError::not_found("room", request.room_id));
        }

        let existing = Reservation::find_overlapping(
            &mut *tx,
            request.room_id,
            request.check_in_date,
            request.check_out_date,
        )
        .await?;

        if let Some(conflict) = find_conflict(
            request.room_id,
            request.check_in_date,
            request.check_out_date,
            &existing,
        ) {
            warn!(
                room_id = %request.room_id,
                conflicting_reservation = %conflict.id,
                "Room not available for requested dates"
            );
            return Err(BookingError::Conflict(format!(
                "room is already reserved from {} to {}",
                conflict.check_in_date, conflict.check_out_date
            )));
        }

        let reservation = Reservation::insert(&mut *tx, request).await?;
        tx.commit().await?;

        info!(
            reservation_id = %reservation.id,
            room_id = %reservation.room_id,
            user_id = %reservation.user_id,
            check_in = %reservation.check_in_date,
            check_out = %reservation.check_out_date,
            "Reservation created"
        );

        Ok(reservation)
    }

    /// Reports whether a room is free for `[check_in, check_out)`
    ///
    /// Past dates are accepted so admins can inspect history.
    pub async fn check_availability(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Availability, BookingError> {
        validate_stay(check_in, check_out, None)?;

        let room_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM rooms WHERE id = $1)")
                .bind(room_id)
                .fetch_one(&self.pool)
                .await?;
        if !room_exists {
            return Err(BookingError::not_found("room", room_id));
        }

        let existing =
            Reservation::find_overlapping(&self.pool, room_id, check_in, check_out).await?;
        let available = find_conflict(room_id, check_in, check_out, &existing).is_none();

        debug!(room_id = %room_id, available, "Availability checked");

        Ok(Availability {
            room_id,
            check_in_date: check_in,
            check_out_date: check_out,
            available,
        })
    }

    /// Moves a reservation to `target` following the lifecycle table
    ///
    /// The write is a compare-and-set on the status that was validated, so
    /// a concurrent change surfaces as `Conflict`.
    pub async fn change_status(
        &self,
        id: Uuid,
        target: ReservationStatus,
        today: NaiveDate,
    ) -> Result<Reservation, BookingError> {
        let current = Reservation::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| BookingError::not_found("reservation", id))?;

        check_transition(current.status, target, current.check_in_date, today)?;

        let updated = Reservation::update_status(&self.pool, id, current.status, target)
            .await?
            .ok_or_else(|| {
                BookingError::Conflict("reservation was modified concurrently".to_string())
            })?;

        info!(
            reservation_id = %id,
            from = %current.status,
            to = %target,
            "Reservation status changed"
        );

        Ok(updated)
    }

    /// Records a payment and optionally confirms the reservation
    ///
    /// Both writes happen in one transaction holding the reservation row
    /// lock. Confirmation only applies to a `Pending` reservation; any other
    /// status is left untouched.
    pub async fn record_payment(
        &self,
        data: CreatePayment,
        confirm: bool,
    ) -> Result<(Payment, Reservation), BookingError> {
        let reservation_id = data.reservation_id;
        let mut tx = self.pool.begin().await?;

        let reservation = Reservation::find_for_update(&mut *tx, reservation_id)
            .await?
            .ok_or_else(|| BookingError::not_found("reservation", reservation_id))?;

        let payment = Payment::create(&mut *tx, data).await?;

        let reservation = if confirm && reservation.status == ReservationStatus::Pending {
            Reservation::update_status(
                &mut *tx,
                reservation_id,
                ReservationStatus::Pending,
                ReservationStatus::Confirmed,
            )
            .await?
            .ok_or_else(|| {
                BookingError::Conflict("reservation was modified concurrently".to_string())
            })?
        } else {
            reservation
        };

        tx.commit().await?;

        info!(
            payment_id = %payment.id,
            reservation_id = %reservation_id,
            amount_cents = payment.amount_cents,
            method = %payment.payment_method,
            status = %reservation.status,
            "Payment recorded"
        );

        Ok((payment, reservation))
    }
}
