use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use crate::auth::{self, AuthUser, BearerToken};
use crate::dto::{SessionResponse, SignInDto, SignUpDto};
use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::models::{Session, User};
use crate::AppState;

fn session_response(session: Session, user: User) -> SessionResponse {
    SessionResponse {
        token: session.get_token(),
        expires_at: session.get_expires_at(),
        user,
    }
}

/// Handler for registering an account
///
/// This function handles POST requests to `/api/auth/sign-up`.
///
/// ### Arguments
///
/// * `state` - The application state; the profile goes to its user
///   repository, the password and session to its pool
/// * `payload` - Email, password and display name
///
/// ### Returns
///
/// A fresh session for the new user with status 201, or 409 if the email
/// belongs to an existing user
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn sign_up_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignUpDto>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let (session, user) = auth::sign_up(state.repos.users.as_ref(), &state.pool, &payload, state.session_ttl).await?;

    info!("Signed up user {}", user.get_id());
    Ok((StatusCode::CREATED, Json(session_response(session, user))))
}

/// Handler for signing in with email and password
///
/// This function handles POST requests to `/api/auth/sign-in`.
#[instrument(skip(state, payload))]
pub async fn sign_in_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignInDto>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (session, user) = auth::sign_in(
        state.repos.users.as_ref(),
        &state.pool,
        &payload.email,
        &payload.password,
        state.session_ttl,
    )
    .await?;
    Ok(Json(session_response(session, user)))
}

/// Handler for `POST /api/auth/sign-out`
///
/// Always answers 204 once a bearer token is present, whether or not the
/// session still existed.
#[instrument(skip(state, token))]
pub async fn sign_out_handler(
    State(state): State<AppState>,
    token: BearerToken,
) -> Result<StatusCode, ApiError> {
    auth::sign_out(&state.pool, &token.0)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for `GET /api/auth/session`
#[instrument(skip(auth_user))]
pub async fn current_session_handler(auth_user: AuthUser) -> Json<SessionResponse> {
    Json(session_response(auth_user.session, auth_user.user))
}
