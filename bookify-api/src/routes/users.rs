/// User endpoints
///
/// - `GET /users/:id` - Profile with reservations and payments (self or admin)
/// - `GET /users`, `GET /users/consult/:email` (admin)
/// - `POST /users`, `PUT /users/:id`, `DELETE /users/:id` (admin)
///
/// Password hashes are never serialized. A user who owns reservations or
/// payments cannot be deleted.

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
        password,
    },
    models::{
        payment::Payment,
        reservation::{Reservation, ReservationDetails},
        user::{CreateUser, UpdateUser, User, UserRole},
    },
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    pub password: String,

    /// Defaults to `guest`
    #[serde(default)]
    pub role: UserRole,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: Option<String>,

    pub password: Option<String>,

    pub role: Option<UserRole>,
}

/// A user with everything they booked and paid
#[derive(Debug, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub reservations: Vec<ReservationDetails>,
    pub payments: Vec<Payment>,
}

fn user_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("User {} not found", id))
}

fn hash_checked(password: &str) -> ApiResult<String> {
    password::validate_password_strength(password)
        .map_err(|e| ApiError::validation("password", e))?;

    Ok(password::hash_password(password)?)
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<User>>> {
    require_admin(&auth)?;

    Ok(Json(User::list(&state.db).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserProfile>> {
    require_owner_or_admin(&auth, id)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    let reservations = Reservation::list_details_by_user(&state.db, id).await?;
    let payments = Payment::list_by_user(&state.db, id).await?;

    Ok(Json(UserProfile {
        user,
        reservations,
        payments,
    }))
}

/// Looks a user up by email (admin only)
pub async fn consult_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(email): Path<String>,
) -> ApiResult<Json<User>> {
    require_admin(&auth)?;

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No user with email {}", email)))?;

    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    require_admin(&auth)?;
    req.validate()?;

    let password_hash = hash_checked(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            name: req.name,
            password_hash,
            role: req.role,
        },
    )
    .await?;

    info!(user_id = %user.id, role = %user.role, admin_id = %auth.user_id, "User created");

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    require_admin(&auth)?;
    req.validate()?;

    let password_hash = req.password.as_deref().map(hash_checked).transpose()?;

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            email: req.email,
            name: req.name,
            password_hash,
            role: req.role,
        },
    )
    .await?
    .ok_or_else(|| user_not_found(id))?;

    info!(user_id = %id, "User updated");

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin(&auth)?;

    if User::has_bookings(&state.db, id).await? {
        return Err(ApiError::Conflict(
            "User has reservations or payments and cannot be deleted".to_string(),
        ));
    }

    // A booking created after the check still trips the RESTRICT foreign key
    if !User::delete(&state.db, id).await? {
        return Err(user_not_found(id));
    }

    info!(user_id = %id, admin_id = %auth.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_role_defaults_to_guest() {
        let req: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "email": "guest@example.com",
            "name": "Guest",
            "password": "Sunny-beach-42"
        }))
        .unwrap();

        assert_eq!(req.role, UserRole::Guest);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_admin_user() {
        let req: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "email": "ops@example.com",
            "name": "Ops",
            "password": "Sunny-beach-42",
            "role": "admin"
        }))
        .unwrap();

        assert_eq!(req.role, UserRole::Admin);
    }

    #[test]
    fn test_weak_password_rejected() {
        assert!(matches!(hash_checked("short"), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_update_user_validation() {
        assert!(UpdateUserRequest::default().validate().is_ok());

        let req = UpdateUserRequest {
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
