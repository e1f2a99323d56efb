/// Reservation endpoints (authenticated)
///
/// - `GET /reservations` - All reservations for admins, own for guests
/// - `GET /reservations/:id` - Owner or admin
/// - `POST /reservations` - Book a room
/// - `PUT /reservations/:id/status` - Move through the lifecycle
///
/// # Status changes
///
/// Admins may apply any transition the lifecycle allows. Guests may only
/// cancel their own reservations while they are still pending.

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
    auth::{
        authorization::{require_admin, require_owner_or_admin},
        middleware::AuthContext,
    },
    models::reservation::{NewReservation, Reservation, ReservationDetails, ReservationStatus},
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub room_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,

    /// Book on behalf of another user (admin only); defaults to the caller
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ReservationStatus,
}

fn reservation_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Reservation {} not found", id))
}

pub async fn list_reservations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ReservationDetails>>> {
    let reservations = if auth.is_admin() {
        Reservation::list_details(&state.db).await?
    } else {
        Reservation::list_details_by_user(&state.db, auth.user_id).await?
    };

    Ok(Json(reservations))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReservationDetails>> {
    let details = Reservation::find_details(&state.db, id)
        .await?
        .ok_or_else(|| reservation_not_found(id))?;

    require_owner_or_admin(&auth, details.reservation.user_id)?;

    Ok(Json(details))
}

pub async fn create_reservation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateReservationRequest>,
) -> ApiResult<(StatusCode, Json<Reservation>)> {
    let user_id = match req.user_id {
        Some(user_id) if user_id != auth.user_id => {
            require_admin(&auth)?;
            user_id
        }
        _ => auth.user_id,
    };

    let reservation = state
        .bookings
        .reserve(
            NewReservation {
                user_id,
                room_id: req.room_id,
                check_in_date: req.check_in_date,
                check_out_date: req.check_out_date,
            },
            state.today(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Reservation>> {
    if !auth.is_admin() {
        let current = Reservation::find_by_id(&state.db, id)
            .await?
            .ok_or_else(|| reservation_not_found(id))?;

        require_owner_or_admin(&auth, current.user_id)?;
        check_guest_transition(current.status, req.status)?;
    }

    let reservation = state
        .bookings
        .change_status(id, req.status, state.today())
        .await?;

    Ok(Json(reservation))
}

/// Guests may only cancel while the reservation is pending
fn check_guest_transition(current: ReservationStatus, target: ReservationStatus) -> ApiResult<()> {
    if target != ReservationStatus::Cancelled {
        return Err(ApiError::Forbidden(format!(
            "Only an administrator can mark a reservation {}",
            target
        )));
    }

    if current != ReservationStatus::Pending {
        return Err(ApiError::Forbidden(format!(
            "A {} reservation can only be cancelled by an administrator",
            current
        )));
    }

    Ok(())
}
