//! Booking errors

use crate::models::reservation::ReservationStatus;
use thiserror::Error;
use uuid::Uuid;

/// SQLSTATE raised by the reservations exclusion constraint
pub const EXCLUSION_VIOLATION: &str = "23P01";

/// Errors produced by the booking domain
#[derive(Debug, Error)]
pub enum BookingError {
    /// A referenced entity does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// Input violates a business rule
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Date overlap or concurrent modification
    #[error("{0}")]
    Conflict(String),

    /// Status change not allowed by the lifecycle
    #[error("cannot change reservation status from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl BookingError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        BookingError::NotFound { entity, id }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        BookingError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for BookingError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            if db.code().as_deref() == Some(EXCLUSION_VIOLATION) {
                return BookingError::Conflict(
                    "room is already reserved for an overlapping date range".to_string(),
                );
            }
        }
        BookingError::Database(e)
    }
}
