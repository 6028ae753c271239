//! Server-side identity provider
//!
//! Users sign up with an email and password, sign in to obtain a bearer
//! token, and present that token on later requests. Passwords are stored as
//! salted SHA-256 digests, which is adequate for a demo deployment but is not
//! a password hashing scheme fit for production.

use anyhow::Result;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::Duration;
use diesel::prelude::*;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::db::DbPool;
use crate::dto::{CreateUserDto, SignUpDto};
use crate::errors::ApiError;
use crate::models::{Credential, Session, User};
use crate::repo::{UserRepository, WriteRejection};
use crate::schema::{credentials, sessions};
use crate::AppState;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Session expired or invalid")]
    InvalidSession,
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

/// Trims and lowercases an email address, or returns `None` if it is malformed
///
/// The check is deliberately loose: one `@`, a non-empty local part and a
/// domain containing an inner dot.
pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    if email.chars().any(char::is_whitespace) {
        return None;
    }
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.contains('@') {
        return None;
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return None;
    }
    Some(email)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// SHA-256 of `salt || password`, hex encoded
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

/// 32 random bytes, hex encoded
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    to_hex(&bytes)
}

/// Stores a password credential and opens the first session in one transaction
fn enroll(pool: &DbPool, user_id: &str, password: &str, ttl: Duration) -> Result<Session> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let salt = generate_token();
        let credential = Credential::new(user_id.to_string(), hash_password(password, &salt), salt);
        diesel::insert_into(credentials::table)
            .values(&credential)
            .execute(conn)?;

        let session = Session::new(generate_token(), user_id.to_string(), ttl);
        diesel::insert_into(sessions::table)
            .values(&session)
            .execute(conn)?;
        Ok(session)
    })
}

fn open_session(pool: &DbPool, user_id: &str, ttl: Duration) -> Result<Session> {
    let conn = &mut pool.get()?;
    let session = Session::new(generate_token(), user_id.to_string(), ttl);
    diesel::insert_into(sessions::table)
        .values(&session)
        .execute(conn)?;
    Ok(session)
}

fn find_credential(pool: &DbPool, user_id: &str) -> Result<Option<Credential>> {
    let conn = &mut pool.get()?;
    let credential = credentials::table
        .find(user_id)
        .first::<Credential>(conn)
        .optional()?;
    Ok(credential)
}

fn find_session(pool: &DbPool, token: &str) -> Result<Option<Session>> {
    let conn = &mut pool.get()?;
    let session = sessions::table
        .find(token)
        .first::<Session>(conn)
        .optional()?;
    Ok(session)
}

fn remove_session(pool: &DbPool, token: &str) -> Result<usize> {
    let conn = &mut pool.get()?;
    Ok(diesel::delete(sessions::table.find(token)).execute(conn)?)
}

/// Registers a new account and opens a session for it
///
/// The profile row goes through `users`, so it lands in whichever store
/// serves the rest of the API. The credential and session are kept in
/// `pool` under the new user's id.
///
/// ### Errors
///
/// Returns `Validation` for empty fields or a malformed email, `EmailTaken`
/// when a user with that email already exists, and `Database` for storage
/// failures.
#[instrument(skip(users, pool, dto), fields(email = %dto.email))]
pub async fn sign_up(
    users: &dyn UserRepository,
    pool: &DbPool,
    dto: &SignUpDto,
    ttl: Duration,
) -> Result<(Session, User), AuthError> {
    for (field, value) in [("email", &dto.email), ("password", &dto.password), ("name", &dto.name)] {
        if value.trim().is_empty() {
            return Err(AuthError::Validation(format!("{} must not be empty", field)));
        }
    }
    let email = normalize_email(&dto.email)
        .ok_or_else(|| AuthError::Validation(format!("Invalid email address: {}", dto.email)))?;

    let profile = CreateUserDto {
        email,
        name: dto.name.trim().to_string(),
        avatar_url: None,
    };
    let user = users.create(profile).await.map_err(|err| {
        if matches!(err.downcast_ref::<WriteRejection>(), Some(WriteRejection::EmailTaken)) {
            debug!("Sign-up rejected, email already registered");
            AuthError::EmailTaken
        } else {
            AuthError::Database(err)
        }
    })?;

    match enroll(pool, &user.get_id(), &dto.password, ttl) {
        Ok(session) => {
            info!("Registered user {}", user.get_id());
            Ok((session, user))
        }
        Err(err) => {
            // leave no profile behind that nobody can sign in to
            if let Err(cleanup) = users.delete(&user.get_id()).await {
                warn!("Could not remove half-registered user {}: {}", user.get_id(), cleanup);
            }
            Err(AuthError::Database(err))
        }
    }
}

/// Checks an email and password and opens a session on success
///
/// Empty credentials never succeed. An unknown email, a profile without a
/// password and a wrong password all produce the same error.
#[instrument(skip(users, pool, password))]
pub async fn sign_in(
    users: &dyn UserRepository,
    pool: &DbPool,
    email: &str,
    password: &str,
    ttl: Duration,
) -> Result<(Session, User), AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }
    let Some(email) = normalize_email(email) else {
        return Err(AuthError::InvalidCredentials);
    };

    let Some(user) = users.find_by_email(&email).await? else {
        debug!("Sign-in for unknown email");
        return Err(AuthError::InvalidCredentials);
    };
    let Some(credential) = find_credential(pool, &user.get_id())? else {
        debug!("Sign-in for a user without a password");
        return Err(AuthError::InvalidCredentials);
    };
    if hash_password(password, credential.get_salt()) != credential.get_password_hash() {
        debug!("Sign-in with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    let session = open_session(pool, &user.get_id(), ttl)?;
    info!("User {} signed in", user.get_id());
    Ok((session, user))
}

/// Ends a session; signing out an unknown token is not an error
#[instrument(skip(pool, token))]
pub fn sign_out(pool: &DbPool, token: &str) -> Result<(), AuthError> {
    let removed = remove_session(pool, token)?;
    debug!("Signed out, {} session(s) removed", removed);
    Ok(())
}

/// Looks up a live session and its user
///
/// Expired sessions, and sessions whose user has since been deleted, are
/// removed when they are found.
#[instrument(skip(users, pool, token))]
pub async fn current_session(
    users: &dyn UserRepository,
    pool: &DbPool,
    token: &str,
) -> Result<(Session, User), AuthError> {
    let Some(session) = find_session(pool, token)? else {
        return Err(AuthError::InvalidSession);
    };
    if session.is_expired() {
        remove_session(pool, token)?;
        debug!("Removed expired session");
        return Err(AuthError::InvalidSession);
    }

    match users.get(&session.get_user_id()).await? {
        Some(user) => Ok((session, user)),
        None => {
            remove_session(pool, token)?;
            debug!("Removed session of a deleted user");
            Err(AuthError::InvalidSession)
        }
    }
}

/// Raw bearer token from the `Authorization` header
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        Ok(Self(token.to_string()))
    }
}

/// The signed-in user behind a request's bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub session: Session,
    pub user: User,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let (session, user) = current_session(state.repos.users.as_ref(), &state.pool, &token).await?;
        Ok(Self { session, user })
    }
}

#[cfg(test)]
mod tests;
