/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and token refresh
/// - `hotels`: Hotel browsing and admin CRUD
/// - `rooms`: Room browsing, availability and admin CRUD
/// - `users`: User profiles and admin CRUD
/// - `reservations`: Booking and status changes
/// - `payments`: Gateway checkout and payment records

pub mod auth;
pub mod health;
pub mod hotels;
pub mod payments;
pub mod reservations;
pub mod rooms;
pub mod users;
