/// Evento: an event listing and booking service
///
/// This library provides the core of the Evento site: data models, the
/// repository layer over SQLite or in-memory sample data, user sessions, the
/// admin boundary, and a web API. It also ships the client used by the
/// `evento-cli` binary.
///
/// ### Modules
///
/// - `admin`: Admin credential check
/// - `auth`: Sign-up, sign-in and session handling
/// - `client`: HTTP data access and session context for front ends
/// - `config`: Layered configuration
/// - `db`: Database connection management
/// - `extract`: Body and query extractors with JSON errors
/// - `models`: Users, events, bookings, enquiries and sessions
/// - `repo`: Repository layer
/// - `schema`: Database schema definitions
///
/// ### Web API
///
/// All routes live under `/api`, for example:
///
/// - `GET /api/events?search=term`: Search upcoming events
/// - `POST /api/bookings`: Book tickets for an event
/// - `POST /api/enquiries`: Submit the contact form
/// - `POST /api/auth/sign-in`: Start a session

pub mod admin;

pub mod auth;

pub mod client;

/// Configuration module
pub mod config;

/// Database connection module
pub mod db;

pub mod dto;

pub mod errors;

/// JSON-reporting request extractors
pub mod extract;

/// Web API handlers module
pub mod handlers;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

#[cfg(test)]
mod test_utils;

use axum::{
    routing::{get, post, put},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::admin::CredentialVerifier;
use crate::db::DbPool;
use crate::handlers::*;
use crate::repo::Repositories;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Entity repositories for the configured data source
    pub repos: Repositories,
    /// Pool used for credentials and sessions
    pub pool: Arc<DbPool>,
    /// Admin credential check
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Lifetime of newly issued sessions
    pub session_ttl: Duration,
}

impl AppState {
    pub fn new(repos: Repositories, pool: Arc<DbPool>, verifier: Arc<dyn CredentialVerifier>, session_ttl: Duration) -> Self {
        Self { repos, pool, verifier, session_ttl }
    }
}

/// Creates the application router with all routes
///
/// ### Arguments
///
/// * `state` - Repositories, session pool and admin verifier
///
/// ### Returns
///
/// An Axum Router configured with all API routes
pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        // Users
        .route("/users", post(create_user_handler).get(list_users_handler))
        .route("/users/{id}", get(get_user_handler).put(update_user_handler).delete(delete_user_handler))
        .route("/users/{id}/bookings", get(list_user_bookings_handler))
        // Events
        .route("/events", post(create_event_handler).get(list_events_handler))
        .route("/events/upcoming", get(list_upcoming_events_handler))
        .route("/events/{id}", get(get_event_handler).put(update_event_handler).delete(delete_event_handler))
        .route("/events/{id}/availability", get(event_availability_handler))
        .route("/events/{id}/revenue", get(event_revenue_handler))
        .route("/events/{id}/capacity", get(check_capacity_handler))
        // Bookings
        .route("/bookings", post(create_booking_handler))
        .route("/bookings/{id}", put(update_booking_handler).delete(delete_booking_handler))
        // Enquiries
        .route("/enquiries", post(submit_enquiry_handler))
        .route("/enquiries/{id}", get(get_enquiry_handler).put(update_enquiry_handler).delete(delete_enquiry_handler))
        // Sessions
        .route("/auth/sign-up", post(sign_up_handler))
        .route("/auth/sign-in", post(sign_in_handler))
        .route("/auth/sign-out", post(sign_out_handler))
        .route("/auth/session", get(current_session_handler))
        // Admin dashboard
        .route("/admin/login", post(admin_login_handler))
        .route("/admin/summary", get(admin_summary_handler))
        .route("/admin/users", get(admin_users_handler))
        .route("/admin/events", get(admin_events_handler))
        .route("/admin/bookings", get(admin_bookings_handler))
        .route("/admin/enquiries", get(admin_enquiries_handler));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
