use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;
use crate::repo::WriteRejection;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("Not enough seats available")]
    InsufficientCapacity,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Conflict(String),
    /// Body or query string that could not be decoded, with the status axum chose
    #[error("{1}")]
    Malformed(StatusCode, String),
}

impl ApiError {
    /// Maps a repository write error, keeping refusals apart from storage failures
    pub fn from_write(err: anyhow::Error) -> Self {
        match err.downcast_ref::<WriteRejection>() {
            Some(WriteRejection::EventNotFound) => ApiError::NotFound("Event"),
            Some(WriteRejection::UserNotFound) => ApiError::NotFound("User"),
            Some(WriteRejection::InsufficientCapacity) => ApiError::InsufficientCapacity,
            Some(rejection @ WriteRejection::EmailTaken) => ApiError::Conflict(rejection.to_string()),
            None => ApiError::Database(err),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidSession => ApiError::Unauthorized(err.to_string()),
            AuthError::EmailTaken => ApiError::Conflict(err.to_string()),
            AuthError::Validation(msg) => ApiError::Validation(msg),
            AuthError::Database(e) => ApiError::Database(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                error!("Database error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InsufficientCapacity => (StatusCode::CONFLICT, "Not enough seats available".to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Malformed(status, msg) => (status, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
