//! Admin boundary
//!
//! The dashboard is protected by a single configured username/password pair.
//! Every guarded request carries the pair in the `x-admin-username` and
//! `x-admin-password` headers; there is no admin session on the server.

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, HeaderMap};
use tracing::debug;

use crate::errors::ApiError;
use crate::AppState;

pub const ADMIN_USERNAME_HEADER: &str = "x-admin-username";
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Decides whether a username/password pair grants admin access
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Accepts exactly one configured credential pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedCredentials {
    username: String,
    password: String,
}

impl FixedCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl Default for FixedCredentials {
    fn default() -> Self {
        Self::new("admin", "admin")
    }
}

impl CredentialVerifier for FixedCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        !username.is_empty() && !password.is_empty() && username == self.username && password == self.password
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default()
}

/// Proof that the request carried valid admin credentials
#[derive(Debug, Clone, Copy)]
pub struct AdminGuard;

impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let username = header_value(&parts.headers, ADMIN_USERNAME_HEADER);
        let password = header_value(&parts.headers, ADMIN_PASSWORD_HEADER);

        if state.verifier.verify(username, password) {
            Ok(AdminGuard)
        } else {
            debug!("Rejected admin request");
            Err(ApiError::Unauthorized("Invalid admin credentials".to_string()))
        }
    }
}
