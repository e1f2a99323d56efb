/// Room endpoints
///
/// - `GET /rooms`, `GET /rooms/:id`, `GET /rooms/hotel/:hotel_id` (public)
/// - `GET /rooms/:id/availability?check_in=YYYY-MM-DD&check_out=YYYY-MM-DD` (public)
/// - `POST /rooms`, `PUT /rooms/:id`, `DELETE /rooms/:id` (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use bookify_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    booking::service::Availability,
    models::{
        hotel::Hotel,
        room::{CreateRoom, Room, RoomWithHotel, UpdateRoom},
    },
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoomRequest {
    pub hotel_id: Uuid,

    #[validate(length(min = 1, max = 50, message = "Room type must be 1 to 50 characters"))]
    pub room_type: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    /// Nightly price in minor units
    #[validate(range(min = 1, message = "Price must be positive"))]
    pub price_cents: i64,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRoomRequest {
    pub hotel_id: Option<Uuid>,

    #[validate(length(min = 1, max = 50, message = "Room type must be 1 to 50 characters"))]
    pub room_type: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 1, message = "Price must be positive"))]
    pub price_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

fn room_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Room {} not found", id))
}

fn hotel_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Hotel {} not found", id))
}

pub async fn list_rooms(State(state): State<AppState>) -> ApiResult<Json<Vec<RoomWithHotel>>> {
    Ok(Json(Room::list(&state.db).await?))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RoomWithHotel>> {
    let room = Room::find_with_hotel(&state.db, id)
        .await?
        .ok_or_else(|| room_not_found(id))?;

    Ok(Json(room))
}

pub async fn list_rooms_by_hotel(
    State(state): State<AppState>,
    Path(hotel_id): Path<Uuid>,
) -> ApiResult<Json<Vec<RoomWithHotel>>> {
    if !Hotel::exists(&state.db, hotel_id).await? {
        return Err(hotel_not_found(hotel_id));
    }

    Ok(Json(Room::list_by_hotel(&state.db, hotel_id).await?))
}

pub async fn check_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<Availability>> {
    let availability = state
        .bookings
        .check_availability(id, query.check_in, query.check_out)
        .await?;

    Ok(Json(availability))
}

pub async fn create_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateRoomRequest>,
) -> ApiResult<(StatusCode, Json<Room>)> {
    require_admin(&auth)?;
    req.validate()?;

    if !Hotel::exists(&state.db, req.hotel_id).await? {
        return Err(hotel_not_found(req.hotel_id));
    }

    let room = Room::create(
        &state.db,
        CreateRoom {
            hotel_id: req.hotel_id,
            room_type: req.room_type,
            name: req.name,
            price_cents: req.price_cents,
        },
    )
    .await?;

    info!(room_id = %room.id, hotel_id = %room.hotel_id, "Room created");

    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn update_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoomRequest>,
) -> ApiResult<Json<Room>> {
    require_admin(&auth)?;
    req.validate()?;

    if let Some(hotel_id) = req.hotel_id {
        if !Hotel::exists(&state.db, hotel_id).await? {
            return Err(hotel_not_found(hotel_id));
        }
    }

    let room = Room::update(
        &state.db,
        id,
        UpdateRoom {
            hotel_id: req.hotel_id,
            room_type: req.room_type,
            name: req.name,
            price_cents: req.price_cents,
        },
    )
    .await?
    .ok_or_else(|| room_not_found(id))?;

    info!(room_id = %id, "Room updated");

    Ok(Json(room))
}

pub async fn delete_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin(&auth)?;

    if !Room::delete(&state.db, id).await? {
        return Err(room_not_found(id));
    }

    info!(room_id = %id, admin_id = %auth.user_id, "Room deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreateRoomRequest {
        CreateRoomRequest {
            hotel_id: Uuid::new_v4(),
            room_type: "Double".to_string(),
            name: "101".to_string(),
            price_cents: 12_000,
        }
    }

    #[test]
    fn test_create_room_validation() {
        assert!(valid().validate().is_ok());

        let req = CreateRoomRequest {
            price_cents: 0,
            ..valid()
        };
        assert!(req.validate().unwrap_err().field_errors().contains_key("price_cents"));

        let req = CreateRoomRequest {
            room_type: "x".repeat(51),
            ..valid()
        };
        assert!(req.validate().unwrap_err().field_errors().contains_key("room_type"));

        let req = CreateRoomRequest {
            name: "x".repeat(100),
            ..valid()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_room_validation() {
        assert!(UpdateRoomRequest::default().validate().is_ok());

        let req = UpdateRoomRequest {
            price_cents: Some(-5),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
