use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A server-side login session
///
/// The token is the bearer secret handed to the client.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Session {
    token: String,
    user_id: String,
    created_at: NaiveDateTime,
    expires_at: NaiveDateTime,
}

impl Session {
    /// Opens a session for `user_id` that lives for `ttl`
    pub fn new(token: String, user_id: String, ttl: Duration) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            token,
            user_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn get_token(&self) -> String {
        self.token.clone()
    }

    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    pub fn get_expires_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.expires_at, Utc)
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now().naive_utc()
    }
}

/// Salted password hash for a user
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::credentials)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Credential {
    user_id: String,
    password_hash: String,
    salt: String,
}

impl Credential {
    pub fn new(user_id: String, password_hash: String, salt: String) -> Self {
        Self { user_id, password_hash, salt }
    }

    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    pub fn get_password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn get_salt(&self) -> &str {
        &self.salt
    }
}
