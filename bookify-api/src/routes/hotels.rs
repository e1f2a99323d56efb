/// Hotel endpoints
///
/// - `GET /hotels`, `GET /hotels/:id` (public)
/// - `POST /hotels`, `PUT /hotels/:id`, `DELETE /hotels/:id` (admin)
///
/// Deleting a hotel deletes its rooms and their reservations.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use bookify_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::hotel::{CreateHotel, Hotel, UpdateHotel},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHotelRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "Address must be 1 to 255 characters"))]
    pub address: String,

    #[validate(length(min = 1, max = 100, message = "City must be 1 to 100 characters"))]
    pub city: String,

    #[validate(length(min = 1, max = 100, message = "State must be 1 to 100 characters"))]
    pub state: String,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateHotelRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Address must be 1 to 255 characters"))]
    pub address: Option<String>,

    #[validate(length(min = 1, max = 100, message = "City must be 1 to 100 characters"))]
    pub city: Option<String>,

    #[validate(length(min = 1, max = 100, message = "State must be 1 to 100 characters"))]
    pub state: Option<String>,
}

fn hotel_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Hotel {} not found", id))
}

pub async fn list_hotels(State(state): State<AppState>) -> ApiResult<Json<Vec<Hotel>>> {
    Ok(Json(Hotel::list(&state.db).await?))
}

pub async fn get_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Hotel>> {
    let hotel = Hotel::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| hotel_not_found(id))?;

    Ok(Json(hotel))
}

pub async fn create_hotel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateHotelRequest>,
) -> ApiResult<(StatusCode, Json<Hotel>)> {
    require_admin(&auth)?;
    req.validate()?;

    let hotel = Hotel::create(
        &state.db,
        CreateHotel {
            name: req.name,
            address: req.address,
            city: req.city,
            state: req.state,
        },
    )
    .await?;

    info!(hotel_id = %hotel.id, admin_id = %auth.user_id, "Hotel created");

    Ok((StatusCode::CREATED, Json(hotel)))
}

pub async fn update_hotel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateHotelRequest>,
) -> ApiResult<Json<Hotel>> {
    require_admin(&auth)?;
    req.validate()?;

    let hotel = Hotel::update(
        &state.db,
        id,
        UpdateHotel {
            name: req.name,
            address: req.address,
            city: req.city,
            state: req.state,
        },
    )
    .await?
    .ok_or_else(|| hotel_not_found(id))?;

    info!(hotel_id = %id, "Hotel updated");

    Ok(Json(hotel))
}

pub async fn delete_hotel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin(&auth)?;

    if !Hotel::delete(&state.db, id).await? {
        return Err(hotel_not_found(id));
    }

    info!(hotel_id = %id, admin_id = %auth.user_id, "Hotel deleted");

    Ok(StatusCode::NO_CONTENT)
}
