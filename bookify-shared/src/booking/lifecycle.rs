//! Reservation lifecycle
//!
//! ```text
//! | From       | To          | Condition              |
//! |------------|-------------|------------------------|
//! | pending    | confirmed   |                        |
//! | pending    | cancelled   |                        |
//! | pending    | checked_in  | today >= check_in_date |
//! | confirmed  | checked_in  | today >= check_in_date |
//! | checked_in | checked_out |                        |
//! ```
//!
//! Every other pair, including a status "transitioning" to itself, is
//! rejected. `checked_out` and `cancelled` are terminal.

use chrono::NaiveDate;

use super::error::BookingError;
use crate::models::reservation::ReservationStatus;

impl ReservationStatus {
    /// Checks if transition to target status is allowed by the table
    pub fn can_transition_to(&self, target: ReservationStatus) -> bool {
        use ReservationStatus::*;

        matches!(
            (*self, target),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Pending, CheckedIn)
                | (Confirmed, CheckedIn)
                | (CheckedIn, CheckedOut)
        )
    }
}

/// Validates a status change for a reservation starting on `check_in`
///
/// # Errors
///
/// - `InvalidTransition` when the pair is not in the table
/// - `Validation` when checking in before the check-in date
pub fn check_transition(
    current: ReservationStatus,
    target: ReservationStatus,
    check_in: NaiveDate,
    today: NaiveDate,
) -> Result<(), BookingError> {
    if !current.can_transition_to(target) {
        return Err(BookingError::InvalidTransition {
            from: current,
            to: target,
        });
    }

    if target == ReservationStatus::CheckedIn && today < check_in {
        return Err(BookingError::validation(
            "status",
            format!("cannot check in before {}", check_in),
        ));
    }

    Ok(())
}
