use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use crate::dto::{CreateBookingDto, UpdateBookingDto};
use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::models::Booking;
use crate::AppState;

/// Handler for booking tickets
///
/// This function handles POST requests to `/api/bookings`.
///
/// ### Arguments
///
/// * `state` - The application state holding the repositories
/// * `payload` - Event, user, seat count and price of the booking
///
/// ### Returns
///
/// The new booking with status 201, 404 if the event or user does not
/// exist, or 409 if the event has too few free seats
#[instrument(skip(state, payload), fields(event_id = %payload.event_id, quantity = payload.quantity))]
pub async fn create_booking_handler(
    // Extract the application state
    State(state): State<AppState>,
    // Extract and deserialize the JSON request body
    ApiJson(payload): ApiJson<CreateBookingDto>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let booking = state.repos.bookings.create(payload).await
        .map_err(ApiError::from_write)?;

    info!("Successfully created booking with id: {}", booking.get_id());
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Handler for updating a booking, e.g. recording a payment outcome
///
/// This function handles PUT requests to `/api/bookings/{id}`.
#[instrument(skip(state, payload))]
pub async fn update_booking_handler(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateBookingDto>,
) -> Result<Json<Booking>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let booking = state.repos.bookings.update(&booking_id, payload).await
        .map_err(ApiError::from_write)?
        .ok_or(ApiError::NotFound("Booking"))?;

    info!("Updated booking {}", booking_id);
    Ok(Json(booking))
}

/// Handler for cancelling a booking
///
/// This function handles DELETE requests to `/api/bookings/{id}`.
#[instrument(skip(state))]
pub async fn delete_booking_handler(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.repos.bookings.delete(&booking_id).await? {
        info!("Deleted booking {}", booking_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Booking"))
    }
}
