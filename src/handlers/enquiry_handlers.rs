use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use crate::dto::{CreateEnquiryDto, UpdateEnquiryDto};
use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::models::Enquiry;
use crate::AppState;

/// Handler for the enquiry form
///
/// This function handles POST requests to `/api/enquiries`.
///
/// ### Arguments
///
/// * `state` - The application state holding the repositories
/// * `payload` - Contact details, event type and message
///
/// ### Returns
///
/// The stored enquiry with status 201, or 400 if a field is empty or the
/// email is malformed
#[instrument(skip(state, payload), fields(event_type = %payload.event_type))]
pub async fn submit_enquiry_handler(
    // Extract the application state
    State(state): State<AppState>,
    // Extract and deserialize the JSON request body
    ApiJson(payload): ApiJson<CreateEnquiryDto>,
) -> Result<(StatusCode, Json<Enquiry>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let enquiry = state.repos.enquiries.submit(payload).await?;

    info!("Received enquiry {}", enquiry.get_id());
    Ok((StatusCode::CREATED, Json(enquiry)))
}

/// Handler for `GET /api/enquiries/{id}`
#[instrument(skip(state))]
pub async fn get_enquiry_handler(
    State(state): State<AppState>,
    Path(enquiry_id): Path<String>,
) -> Result<Json<Enquiry>, ApiError> {
    let enquiry = state.repos.enquiries.get(&enquiry_id).await?
        .ok_or(ApiError::NotFound("Enquiry"))?;
    Ok(Json(enquiry))
}

/// Handler for editing an enquiry
///
/// This function handles PUT requests to `/api/enquiries/{id}`.
#[instrument(skip(state, payload))]
pub async fn update_enquiry_handler(
    State(state): State<AppState>,
    Path(enquiry_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateEnquiryDto>,
) -> Result<Json<Enquiry>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let enquiry = state.repos.enquiries.update(&enquiry_id, payload).await?
        .ok_or(ApiError::NotFound("Enquiry"))?;
    Ok(Json(enquiry))
}

/// Handler for `DELETE /api/enquiries/{id}`
#[instrument(skip(state))]
pub async fn delete_enquiry_handler(
    State(state): State<AppState>,
    Path(enquiry_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.repos.enquiries.delete(&enquiry_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Enquiry"))
    }
}
