//! Booking domain
//!
//! - [`availability`]: pure half-open interval overlap checks
//! - [`lifecycle`]: the reservation status transition table
//! - [`service`]: transactional booking, status changes and payment recording
//! - [`error`]: the typed error shared by all of the above

pub mod availability;
pub mod error;
pub mod lifecycle;
pub mod service;

pub use availability::{find_conflict, is_available};
pub use error::BookingError;
pub use lifecycle::check_transition;
pub use service::BookingService;
