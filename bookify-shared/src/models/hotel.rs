/// Hotel model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE hotels (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name TEXT NOT NULL,
///     address TEXT NOT NULL,
///     city TEXT NOT NULL,
///     state TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Deleting a hotel cascades to its rooms, and from there to the rooms'
/// reservations and payments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A hotel listing
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a hotel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHotel {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
}

/// Input for updating a hotel
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHotel {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl UpdateHotel {
    /// Returns true when no field would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none() && self.city.is_none() && self.state.is_none()
    }
}

const HOTEL_COLUMNS: &str = "id, name, address, city, state, created_at, updated_at";

impl Hotel {
    /// Creates a new hotel
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn create(pool: &PgPool, data: CreateHotel) -> Result<Self, sqlx::Error> {
        let hotel = sqlx::query_as::<_, Hotel>(&format!(
            r#"
            INSERT INTO hotels (name, address, city, state)
            VALUES ($1, $2, $3, $4)
            RETURNING {HOTEL_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.address)
        .bind(data.city)
        .bind(data.state)
        .fetch_one(pool)
        .await?;

        Ok(hotel)
    }

    /// Finds a hotel by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let hotel = sqlx::query_as::<_, Hotel>(&format!(
            "SELECT {HOTEL_COLUMNS} FROM hotels WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(hotel)
    }

    /// Lists all hotels ordered by name
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let hotels = sqlx::query_as::<_, Hotel>(&format!(
            "SELECT {HOTEL_COLUMNS} FROM hotels ORDER BY name, created_at"
        ))
        .fetch_all(pool)
        .await?;

        Ok(hotels)
    }

    /// Checks whether a hotel exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM hotels WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;

        Ok(exists)
    }

    /// Updates an existing hotel
    ///
    /// Returns `None` if the hotel does not exist. An empty update still
    /// bumps `updated_at` and returns the current row.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateHotel,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE hotels SET updated_at = NOW()");
        let mut bind_count = 1;

        for (column, present) in [
            ("name", data.name.is_some()),
            ("address", data.address.is_some()),
            ("city", data.city.is_some()),
            ("state", data.state.is_some()),
        ] {
            if present {
                bind_count += 1;
                query.push_str(&format!(", {} = ${}", column, bind_count));
            }
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {HOTEL_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Hotel>(&query).bind(id);
        for value in [data.name, data.address, data.city, data.state]
            .into_iter()
            .flatten()
        {
            q = q.bind(value);
        }

        let hotel = q.fetch_optional(pool).await?;

        Ok(hotel)
    }

    /// Deletes a hotel and, by cascade, its rooms
    ///
    /// Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM hotels WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
