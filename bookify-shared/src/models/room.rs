/// Room model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE rooms (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     hotel_id UUID NOT NULL REFERENCES hotels(id) ON DELETE CASCADE,
///     room_type VARCHAR(50) NOT NULL,
///     name VARCHAR(100) NOT NULL,
///     price_cents BIGINT NOT NULL CHECK (price_cents > 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Prices are nightly rates in minor units. Deleting a room cascades to its
/// reservations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A bookable room
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Room {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_type: String,
    pub name: String,

    /// Nightly price in minor units
    pub price_cents: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A room joined with the name of its hotel, used for listings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoomWithHotel {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub room: Room,
    pub hotel_name: String,
}

/// Input for creating a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoom {
    pub hotel_id: Uuid,
    pub room_type: String,
    pub name: String,
    pub price_cents: i64,
}

/// Input for updating a room
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRoom {
    pub hotel_id: Option<Uuid>,
    pub room_type: Option<String>,
    pub name: Option<String>,
    pub price_cents: Option<i64>,
}

const ROOM_COLUMNS: &str = "id, hotel_id, room_type, name, price_cents, created_at, updated_at";

const ROOM_WITH_HOTEL_SELECT: &str = r#"
    SELECT r.id, r.hotel_id, r.room_type, r.name, r.price_cents,
           r.created_at, r.updated_at, h.name AS hotel_name
    FROM rooms r
    JOIN hotels h ON h.id = r.hotel_id
"#;

impl Room {
    /// Total price of a stay of `nights` nights, or `None` on overflow
    pub fn total_for_nights(&self, nights: i64) -> Option<i64> {
        self.price_cents.checked_mul(nights)
    }

    /// Creates a room under an existing hotel
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation if `hotel_id` does not exist, or a
    /// check violation if the price is not positive.
    pub async fn create(pool: &PgPool, data: CreateRoom) -> Result<Self, sqlx::Error> {
        let room = sqlx::query_as::<_, Room>(&format!(
            r#"
            INSERT INTO rooms (hotel_id, room_type, name, price_cents)
            VALUES ($1, $2, $3, $4)
            RETURNING {ROOM_COLUMNS}
            "#
        ))
        .bind(data.hotel_id)
        .bind(data.room_type)
        .bind(data.name)
        .bind(data.price_cents)
        .fetch_one(pool)
        .await?;

        Ok(room)
    }

    /// Finds a room by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let room = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(room)
    }

    /// Finds a room by ID together with its hotel name
    pub async fn find_with_hotel(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<RoomWithHotel>, sqlx::Error> {
        let room = sqlx::query_as::<_, RoomWithHotel>(&format!(
            "{ROOM_WITH_HOTEL_SELECT} WHERE r.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(room)
    }

    /// Lists every room with its hotel name
    pub async fn list(pool: &PgPool) -> Result<Vec<RoomWithHotel>, sqlx::Error> {
        let rooms = sqlx::query_as::<_, RoomWithHotel>(&format!(
            "{ROOM_WITH_HOTEL_SELECT} ORDER BY h.name, r.name"
        ))
        .fetch_all(pool)
        .await?;

        Ok(rooms)
    }

    /// Lists the rooms of one hotel
    pub async fn list_by_hotel(
        pool: &PgPool,
        hotel_id: Uuid,
    ) -> Result<Vec<RoomWithHotel>, sqlx::Error> {
        let rooms = sqlx::query_as::<_, RoomWithHotel>(&format!(
            "{ROOM_WITH_HOTEL_SELECT} WHERE r.hotel_id = $1 ORDER BY r.name"
        ))
        .bind(hotel_id)
        .fetch_all(pool)
        .await?;

        Ok(rooms)
    }

    /// Updates an existing room
    ///
    /// Returns `None` if the room does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateRoom,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE rooms SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.hotel_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", hotel_id = ${}", bind_count));
        }
        if data.room_type.is_some() {
            bind_count += 1;
            query.push_str(&format!(", room_type = ${}", bind_count));
        }
        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.price_cents.is_some() {
            bind_count += 1;
            query.push_str(&format!(", price_cents = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {ROOM_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Room>(&query).bind(id);

        if let Some(hotel_id) = data.hotel_id {
            q = q.bind(hotel_id);
        }
        if let Some(room_type) = data.room_type {
            q = q.bind(room_type);
        }
        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(price_cents) = data.price_cents {
            q = q.bind(price_cents);
        }

        let room = q.fetch_optional(pool).await?;

        Ok(room)
    }

    /// Deletes a room and, by cascade, its reservations
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
