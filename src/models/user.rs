use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::UpdateUserDto;

/// A registered user of the site
///
/// This struct maps directly to the `users` table. Credentials live in a
/// separate table so a user row never carries secrets over the wire.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    /// Unique identifier for the user (UUID v4 as string)
    id: String,

    /// Login email, unique across users
    email: String,

    /// Display name
    name: String,

    /// Optional profile picture
    avatar_url: Option<String>,

    /// When this user was created
    created_at: NaiveDateTime,
}

impl User {
    /// Creates a new user with a fresh id and the current timestamp
    pub fn new(email: String, name: String, avatar_url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            name,
            avatar_url,
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Creates a user with all fields specified
    ///
    /// Used by the sample data set and by tests that rebuild API responses.
    pub fn new_with_fields(
        id: String,
        email: String,
        name: String,
        avatar_url: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            name,
            avatar_url,
            created_at: created_at.naive_utc(),
        }
    }

    /// Applies every `Some` field of the update to this user
    pub fn apply_update(&mut self, update: UpdateUserDto) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(avatar_url) = update.avatar_url {
            self.avatar_url = Some(avatar_url);
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_email(&self) -> String {
        self.email.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_avatar_url(&self) -> Option<String> {
        self.avatar_url.clone()
    }

    /// Gets the creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
