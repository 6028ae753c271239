use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::dto::{CapacityQuery, CapacityResponse, CreateEventDto, EventSearchQuery, UpdateEventDto};
use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::models::{Availability, Event, Revenue};
use crate::AppState;

/// Handler for creating a new event
///
/// This function handles POST requests to `/api/events`.
///
/// ### Arguments
///
/// * `state` - The application state holding the repositories
/// * `payload` - The request payload describing the event
///
/// ### Returns
///
/// The newly created event with status 201
#[instrument(skip(state, payload), fields(title = %payload.title))]
pub async fn create_event_handler(
    // Extract the application state
    State(state): State<AppState>,
    // Extract and deserialize the JSON request body
    ApiJson(payload): ApiJson<CreateEventDto>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    info!("Creating new event");
    payload.validate().map_err(ApiError::Validation)?;

    let event = state.repos.events.create(payload).await
        .map_err(ApiError::from_write)?;

    info!("Successfully created event with id: {}", event.get_id());
    Ok((StatusCode::CREATED, Json(event)))
}

/// Handler for listing events
///
/// This function handles GET requests to `/api/events`. With a `search`
/// query parameter only active, not yet past events whose title or
/// description contains the term are returned.
#[instrument(skip(state))]
pub async fn list_events_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EventSearchQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = match query.search {
        Some(term) => state.repos.events.search(&term, Utc::now().date_naive()).await?,
        None => state.repos.events.list().await?,
    };

    debug!("Retrieved {} events", events.len());
    Ok(Json(events))
}

/// Handler for listing upcoming events
///
/// This function handles GET requests to `/api/events/upcoming`.
#[instrument(skip(state))]
pub async fn list_upcoming_events_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.repos.events.upcoming(Utc::now().date_naive()).await?;
    Ok(Json(events))
}

/// Handler for retrieving a specific event
///
/// This function handles GET requests to `/api/events/{id}`.
#[instrument(skip(state))]
pub async fn get_event_handler(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let event = state.repos.events.get(&event_id).await?
        .ok_or(ApiError::NotFound("Event"))?;
    Ok(Json(event))
}

/// Handler for updating an event
///
/// This function handles PUT requests to `/api/events/{id}`.
#[instrument(skip(state, payload))]
pub async fn update_event_handler(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateEventDto>,
) -> Result<Json<Event>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let event = state.repos.events.update(&event_id, payload).await
        .map_err(ApiError::from_write)?
        .ok_or(ApiError::NotFound("Event"))?;

    info!("Updated event {}", event_id);
    Ok(Json(event))
}

/// Handler for deleting an event and its bookings
///
/// This function handles DELETE requests to `/api/events/{id}`.
#[instrument(skip(state))]
pub async fn delete_event_handler(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.repos.events.delete(&event_id).await? {
        info!("Deleted event {}", event_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Event"))
    }
}

/// Handler for `GET /api/events/{id}/availability`
#[instrument(skip(state))]
pub async fn event_availability_handler(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Availability>, ApiError> {
    let availability = state.repos.events.availability(&event_id).await?
        .ok_or(ApiError::NotFound("Event"))?;
    Ok(Json(availability))
}

/// Handler for `GET /api/events/{id}/revenue`
///
/// Unknown events report zero revenue, the same as events without
/// completed bookings.
#[instrument(skip(state))]
pub async fn event_revenue_handler(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Revenue>, ApiError> {
    let total_revenue = state.repos.bookings.revenue_for_event(&event_id).await?;
    Ok(Json(Revenue { event_id, total_revenue }))
}

/// Handler for `GET /api/events/{id}/capacity?quantity=n`
///
/// ### Arguments
///
/// * `state` - The application state holding the repositories
/// * `event_id` - The event ID extracted from the URL path
/// * `query` - The number of seats wanted
///
/// ### Returns
///
/// Whether the seats fit; unknown events are never available. A missing
/// or non-numeric `quantity` is answered with 400.
#[instrument(skip(state))]
pub async fn check_capacity_handler(
    State(state): State<AppState>,
    // Extract the event ID from the URL path
    Path(event_id): Path<String>,
    // Extract and deserialize the query string
    ApiQuery(query): ApiQuery<CapacityQuery>,
) -> Result<Json<CapacityResponse>, ApiError> {
    let available = state.repos.bookings.check_capacity(&event_id, query.quantity).await?;
    Ok(Json(CapacityResponse { event_id, quantity: query.quantity, available }))
}
