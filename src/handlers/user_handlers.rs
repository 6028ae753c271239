use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info, instrument};

use crate::dto::{CreateUserDto, UpdateUserDto};
use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::models::{BookingWithEvent, User};
use crate::AppState;

/// Handler for creating a new user
///
/// This function handles POST requests to `/api/users`.
///
/// ### Returns
///
/// The newly created user with status 201, or 409 if the email is taken
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn create_user_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserDto>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let user = state.repos.users.create(payload).await
        .map_err(ApiError::from_write)?;

    info!("Successfully created user with id: {}", user.get_id());
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler for listing all users
///
/// This function handles GET requests to `/api/users`.
#[instrument(skip(state))]
pub async fn list_users_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.repos.users.list().await?;

    debug!("Retrieved {} users", users.len());
    Ok(Json(users))
}

/// Handler for retrieving a specific user
///
/// This function handles GET requests to `/api/users/{id}`.
#[instrument(skip(state))]
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state.repos.users.get(&user_id).await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user))
}

/// Handler for updating a user
///
/// This function handles PUT requests to `/api/users/{id}`.
#[instrument(skip(state, payload))]
pub async fn update_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateUserDto>,
) -> Result<Json<User>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let user = state.repos.users.update(&user_id, payload).await
        .map_err(ApiError::from_write)?
        .ok_or(ApiError::NotFound("User"))?;

    info!("Updated user {}", user_id);
    Ok(Json(user))
}

/// Handler for deleting a user
///
/// This function handles DELETE requests to `/api/users/{id}`.
///
/// ### Returns
///
/// 204 No Content if the user was removed, 404 otherwise
#[instrument(skip(state))]
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.repos.users.delete(&user_id).await? {
        info!("Deleted user {}", user_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("User"))
    }
}

/// Handler for listing a user's bookings together with their events
///
/// This function handles GET requests to `/api/users/{id}/bookings`.
#[instrument(skip(state))]
pub async fn list_user_bookings_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<BookingWithEvent>>, ApiError> {
    let bookings = state.repos.bookings.list_for_user(&user_id).await?;

    debug!("User {} has {} bookings", user_id, bookings.len());
    Ok(Json(bookings))
}
