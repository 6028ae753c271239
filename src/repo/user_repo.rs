use anyhow::{anyhow, Result};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use tracing::{debug, info, instrument};

use super::{SqliteRepo, UserRepository, WriteRejection};
use crate::auth::normalize_email;
use crate::db::DbPool;
use crate::dto::{CreateUserDto, UpdateUserDto};
use crate::models::User;
use crate::schema::{bookings, credentials, events, sessions, users};

/// Creates a new user in the database
///
/// The email is stored trimmed and lowercased.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `dto` - The validated creation request
///
/// ### Returns
///
/// A Result containing the newly created User if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The email is already taken ([`WriteRejection::EmailTaken`])
/// - The database insert operation fails
#[instrument(skip(pool, dto), fields(email = %dto.email))]
pub fn create_user(pool: &DbPool, dto: CreateUserDto) -> Result<User> {
    let conn = &mut pool.get()?;

    let email = normalize_email(&dto.email).ok_or_else(|| anyhow!("Invalid email address: {}", dto.email))?;
    let new_user = User::new(email, dto.name, dto.avatar_url);

    diesel::insert_into(users::table)
        .values(&new_user)
        .execute(conn)
        .map_err(email_conflict)?;

    info!("Created user {}", new_user.get_id());
    Ok(new_user)
}

/// Retrieves a user by id
///
/// ### Returns
///
/// `Ok(None)` if no user has this id
#[instrument(skip(pool))]
pub fn get_user(pool: &DbPool, user_id: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let result = users::table
        .find(user_id)
        .first::<User>(conn)
        .optional()?;

    Ok(result)
}

/// Retrieves a user by their stored (normalized) email
#[instrument(skip(pool))]
pub fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let result = users::table
        .filter(users::email.eq(email))
        .first::<User>(conn)
        .optional()?;

    Ok(result)
}

/// Lists all users, newest first
#[instrument(skip(pool))]
pub fn list_users(pool: &DbPool) -> Result<Vec<User>> {
    let conn = &mut pool.get()?;

    let result = users::table
        .order(users::created_at.desc())
        .load::<User>(conn)?;

    debug!("Loaded {} users", result.len());
    Ok(result)
}

/// Applies a partial update to a user
///
/// ### Returns
///
/// The updated user, or `None` if no user has this id
///
/// ### Errors
///
/// Returns an error if the changeset is empty, the new email is taken or
/// the write fails
#[instrument(skip(pool, dto))]
pub fn update_user(pool: &DbPool, user_id: &str, mut dto: UpdateUserDto) -> Result<Option<User>> {
    if dto.is_empty() {
        return Err(anyhow!("No fields to update"));
    }
    if let Some(ref email) = dto.email {
        dto.email = Some(normalize_email(email).ok_or_else(|| anyhow!("Invalid email address: {}", email))?);
    }

    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let Some(mut user) = users::table.find(user_id).first::<User>(conn).optional()? else {
            return Ok(None);
        };
        user.apply_update(dto);

        diesel::update(users::table.find(user_id))
            .set(&user)
            .execute(conn)
            .map_err(email_conflict)?;

        info!("Updated user {}", user_id);
        Ok(Some(user))
    })
}

/// Deletes a user together with their bookings, credential and sessions
///
/// Seats held by the user's bookings are released on the affected events
/// before the rows cascade away.
///
/// ### Returns
///
/// `true` if a user was removed
#[instrument(skip(pool))]
pub fn delete_user(pool: &DbPool, user_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let held = bookings::table
            .filter(bookings::user_id.eq(user_id))
            .select((bookings::event_id, bookings::quantity))
            .load::<(String, i32)>(conn)?;

        for (event_id, quantity) in held {
            release_seats(conn, &event_id, quantity)?;
        }

        diesel::delete(credentials::table.find(user_id)).execute(conn)?;
        diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id))).execute(conn)?;

        let removed = diesel::delete(users::table.find(user_id)).execute(conn)?;
        if removed > 0 {
            info!("Deleted user {}", user_id);
        }
        Ok(removed > 0)
    })
}

/// Turns a unique-constraint failure on `users.email` into a rejection
fn email_conflict(err: diesel::result::Error) -> anyhow::Error {
    match err {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => WriteRejection::EmailTaken.into(),
        other => other.into(),
    }
}

/// Gives `quantity` seats back to an event, never dropping below zero
pub(super) fn release_seats(conn: &mut SqliteConnection, event_id: &str, quantity: i32) -> QueryResult<usize> {
    let current = events::table
        .find(event_id)
        .select(events::current_attendees)
        .first::<i32>(conn)
        .optional()?;

    match current {
        Some(current) => diesel::update(events::table.find(event_id))
            .set(events::current_attendees.eq((current - quantity).max(0)))
            .execute(conn),
        None => Ok(0),
    }
}

#[async_trait]
impl UserRepository for SqliteRepo {
    async fn list(&self) -> Result<Vec<User>> {
        list_users(&self.pool)
    }

    async fn get(&self, id: &str) -> Result<Option<User>> {
        get_user(&self.pool, id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        get_user_by_email(&self.pool, email)
    }

    async fn create(&self, dto: CreateUserDto) -> Result<User> {
        create_user(&self.pool, dto)
    }

    async fn update(&self, id: &str, dto: UpdateUserDto) -> Result<Option<User>> {
        update_user(&self.pool, id, dto)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        delete_user(&self.pool, id)
    }
}
