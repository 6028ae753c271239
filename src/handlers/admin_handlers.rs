use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::{debug, info, instrument, warn};

use crate::admin::AdminGuard;
use crate::dto::{AdminLoginDto, AdminLoginResponse, AdminSummary};
use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::models::{completed_revenue, BookingWithEvent, Enquiry, Event, User};
use crate::AppState;

/// Handler for checking admin credentials
///
/// This function handles POST requests to `/api/admin/login`.
///
/// ### Arguments
///
/// * `state` - The application state holding the admin verifier
/// * `payload` - The username and password to check
///
/// ### Returns
///
/// `{"success": true}`, or `{"success": false}` with status 401
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn admin_login_handler(
    // Extract the application state
    State(state): State<AppState>,
    // Extract and deserialize the JSON request body
    ApiJson(payload): ApiJson<AdminLoginDto>,
) -> (StatusCode, Json<AdminLoginResponse>) {
    if state.verifier.verify(&payload.username, &payload.password) {
        info!("Admin logged in");
        (StatusCode::OK, Json(AdminLoginResponse { success: true }))
    } else {
        warn!("Rejected admin login");
        (StatusCode::UNAUTHORIZED, Json(AdminLoginResponse { success: false }))
    }
}

/// Handler for the dashboard header counts
///
/// This function handles GET requests to `/api/admin/summary`.
///
/// ### Returns
///
/// Row counts per table and the revenue of completed bookings
#[instrument(skip_all)]
pub async fn admin_summary_handler(
    // Check the admin credential headers before touching any data
    _guard: AdminGuard,
    State(state): State<AppState>,
) -> Result<Json<AdminSummary>, ApiError> {
    let users = state.repos.users.list().await?;
    let events = state.repos.events.list().await?;
    let bookings = state.repos.bookings.list().await?;
    let enquiries = state.repos.enquiries.list().await?;

    Ok(Json(AdminSummary {
        users: users.len(),
        events: events.len(),
        bookings: bookings.len(),
        enquiries: enquiries.len(),
        completed_revenue: completed_revenue(bookings.iter().map(|b| &b.booking)),
    }))
}

/// Handler for the admin users table
///
/// This function handles GET requests to `/api/admin/users`.
///
/// ### Arguments
///
/// * `_guard` - Rejects the request with 401 unless the admin headers match
/// * `state` - The application state holding the repositories
///
/// ### Returns
///
/// Every user record as JSON
#[instrument(skip_all)]
pub async fn admin_users_handler(
    // Check the admin credential headers before touching any data
    _guard: AdminGuard,
    // Extract the repositories from the application state
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    let rows = state.repos.users.list().await?;

    debug!("Admin listed {} users", rows.len());
    Ok(Json(rows))
}

/// Handler for the admin events table
///
/// This function handles GET requests to `/api/admin/events`.
///
/// ### Arguments
///
/// * `_guard` - Rejects the request with 401 unless the admin headers match
/// * `state` - The application state holding the repositories
///
/// ### Returns
///
/// Every event record as JSON
#[instrument(skip_all)]
pub async fn admin_events_handler(
    // Check the admin credential headers before touching any data
    _guard: AdminGuard,
    // Extract the repositories from the application state
    State(state): State<AppState>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let rows = state.repos.events.list().await?;

    debug!("Admin listed {} events", rows.len());
    Ok(Json(rows))
}

/// Handler for the admin bookings table
///
/// This function handles GET requests to `/api/admin/bookings`.
///
/// ### Arguments
///
/// * `_guard` - Rejects the request with 401 unless the admin headers match
/// * `state` - The application state holding the repositories
///
/// ### Returns
///
/// Every booking joined with its event, newest first
#[instrument(skip_all)]
pub async fn admin_bookings_handler(
    // Check the admin credential headers before touching any data
    _guard: AdminGuard,
    // Extract the repositories from the application state
    State(state): State<AppState>,
) -> Result<Json<Vec<BookingWithEvent>>, ApiError> {
    let rows = state.repos.bookings.list().await?;

    debug!("Admin listed {} bookings", rows.len());
    Ok(Json(rows))
}

/// Handler for the admin enquiries table
///
/// This function handles GET requests to `/api/admin/enquiries`.
///
/// ### Arguments
///
/// * `_guard` - Rejects the request with 401 unless the admin headers match
/// * `state` - The application state holding the repositories
///
/// ### Returns
///
/// Every enquiry record as JSON, newest first
#[instrument(skip_all)]
pub async fn admin_enquiries_handler(
    // Check the admin credential headers before touching any data
    _guard: AdminGuard,
    // Extract the repositories from the application state
    State(state): State<AppState>,
) -> Result<Json<Vec<Enquiry>>, ApiError> {
    let rows = state.repos.enquiries.list().await?;

    debug!("Admin listed {} enquiries", rows.len());
    Ok(Json(rows))
}
