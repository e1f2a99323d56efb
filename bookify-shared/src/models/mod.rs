/// Database models for Bookify
///
/// Each model owns the SQL for its table and exposes async CRUD functions
/// taking a `&PgPool`.
///
/// # Models
///
/// - `hotel`: Hotels, which own rooms
/// - `room`: Bookable rooms with a nightly price
/// - `user`: Accounts with an argon2 password hash and a role
/// - `reservation`: Room bookings over a date range with a lifecycle status
/// - `payment`: Payments recorded against reservations
///
/// # Example
///
/// ```no_run
/// use bookify_shared::models::hotel::{CreateHotel, Hotel};
/// use bookify_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let hotel = Hotel::create(&pool, CreateHotel {
///     name: "Seaside Inn".to_string(),
///     address: "1 Ocean Drive".to_string(),
///     city: "Miami".to_string(),
///     state: "FL".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod hotel;
pub mod payment;
pub mod reservation;
pub mod room;
pub mod user;
