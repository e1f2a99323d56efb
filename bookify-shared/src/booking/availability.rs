//! Availability checking
//!
//! Stays are half-open date intervals `[check_in, check_out)`: a guest
//! leaving on the 5th frees the room for a guest arriving on the 5th.
//!
//! Two stays conflict iff `a.check_in < b.check_out && a.check_out > b.check_in`.
//! Only reservations for the same room whose status still blocks the room
//! (anything but cancelled) are considered.

use chrono::NaiveDate;
use uuid::Uuid;

use super::error::BookingError;
use crate::models::reservation::Reservation;

/// Returns true if `[a_in, a_out)` and `[b_in, b_out)` share at least one night
pub fn overlaps(a_in: NaiveDate, a_out: NaiveDate, b_in: NaiveDate, b_out: NaiveDate) -> bool {
    a_in < b_out && a_out > b_in
}

/// Returns the first existing reservation that blocks the candidate stay
pub fn find_conflict<'a>(
    room_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    existing: &'a [Reservation],
) -> Option<&'a Reservation> {
    existing.iter().find(|r| {
        r.room_id == room_id
            && r.status.blocks_room()
            && overlaps(r.check_in_date, r.check_out_date, check_in, check_out)
    })
}

/// Returns true if no existing reservation blocks the candidate stay
pub fn is_available(
    room_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    existing: &[Reservation],
) -> bool {
    find_conflict(room_id, check_in, check_out, existing).is_none()
}

/// Validates the dates of a stay
///
/// `check_in` must be strictly before `check_out`. When `today` is given the
/// stay must also not start in the past.
pub fn validate_stay(
    check_in: NaiveDate,
    check_out: NaiveDate,
    today: Option<NaiveDate>,
) -> Result<(), BookingError> {
    if check_in >= check_out {
        return Err(BookingError::validation(
            "check_out_date",
            "check-out date must be after check-in date",
        ));
    }

    if let Some(today) = today {
        if check_in < today {
            return Err(BookingError::validation(
                "check_in_date",
                "check-in date cannot be in the past",
            ));
        }
    }

    Ok(())
}
