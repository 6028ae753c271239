use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use super::{EventRepository, SqliteRepo, WriteRejection};
use crate::db::DbPool;
use crate::dto::{CreateEventDto, UpdateEventDto};
use crate::models::{Availability, Event, EventStatus};
use crate::schema::{events, users};

/// Creates a new event in the database
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `dto` - The validated creation request
///
/// ### Returns
///
/// A Result containing the newly created Event if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - `user_id` names a user that does not exist ([`WriteRejection::UserNotFound`])
/// - The database insert operation fails
#[instrument(skip(pool, dto), fields(title = %dto.title))]
pub fn create_event(pool: &DbPool, dto: CreateEventDto) -> Result<Event> {
    let conn = &mut pool.get()?;

    require_creator(conn, dto.user_id.as_deref())?;
    let new_event = Event::new(dto);

    diesel::insert_into(events::table)
        .values(&new_event)
        .execute(conn)?;

    info!("Created event {}", new_event.get_id());
    Ok(new_event)
}

/// Refuses a creator id that names no user
fn require_creator(conn: &mut SqliteConnection, user_id: Option<&str>) -> Result<()> {
    let Some(user_id) = user_id else {
        return Ok(());
    };
    let exists = users::table
        .find(user_id)
        .count()
        .get_result::<i64>(conn)?
        > 0;
    if exists { Ok(()) } else { Err(WriteRejection::UserNotFound.into()) }
}

/// Retrieves an event by id
#[instrument(skip(pool))]
pub fn get_event(pool: &DbPool, event_id: &str) -> Result<Option<Event>> {
    let conn = &mut pool.get()?;

    let result = events::table
        .find(event_id)
        .first::<Event>(conn)
        .optional()?;

    Ok(result)
}

/// Lists all events ordered by date, earliest first
#[instrument(skip(pool))]
pub fn list_events(pool: &DbPool) -> Result<Vec<Event>> {
    let conn = &mut pool.get()?;

    let result = events::table
        .order(events::date.asc())
        .load::<Event>(conn)?;

    debug!("Loaded {} events", result.len());
    Ok(result)
}

/// Escapes the LIKE wildcards in a user-supplied search term
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Searches active events dated `today` or later by title and description
///
/// Matching is a case-insensitive substring match. A blank term returns
/// the same result as [`list_events`].
#[instrument(skip(pool))]
pub fn search_events(pool: &DbPool, term: &str, today: NaiveDate) -> Result<Vec<Event>> {
    let term = term.trim();
    if term.is_empty() {
        return list_events(pool);
    }

    let conn = &mut pool.get()?;
    let pattern = format!("%{}%", escape_like(term));

    let result = events::table
        .filter(events::status.eq(EventStatus::Active))
        .filter(events::date.ge(today))
        .filter(
            events::title
                .like(&pattern)
                .escape('\\')
                .or(events::description.like(&pattern).escape('\\')),
        )
        .order(events::date.asc())
        .load::<Event>(conn)?;

    debug!("Search for {:?} matched {} events", term, result.len());
    Ok(result)
}

/// Lists active events dated `today` or later, earliest first
#[instrument(skip(pool))]
pub fn list_upcoming_events(pool: &DbPool, today: NaiveDate) -> Result<Vec<Event>> {
    let conn = &mut pool.get()?;

    let result = events::table
        .filter(events::status.eq(EventStatus::Active))
        .filter(events::date.ge(today))
        .order(events::date.asc())
        .load::<Event>(conn)?;

    Ok(result)
}

/// Applies a partial update to an event
///
/// ### Returns
///
/// The updated event, or `None` if no event has this id
///
/// ### Errors
///
/// Returns an error if the changeset is empty or the write fails
#[instrument(skip(pool, dto))]
pub fn update_event(pool: &DbPool, event_id: &str, dto: UpdateEventDto) -> Result<Option<Event>> {
    if dto.is_empty() {
        return Err(anyhow!("No fields to update"));
    }

    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let Some(mut event) = events::table.find(event_id).first::<Event>(conn).optional()? else {
            return Ok(None);
        };
        require_creator(conn, dto.user_id.as_deref())?;
        event.apply_update(dto);

        diesel::update(events::table.find(event_id))
            .set(&event)
            .execute(conn)?;

        info!("Updated event {}", event_id);
        Ok(Some(event))
    })
}

/// Deletes an event; its bookings go with it
#[instrument(skip(pool))]
pub fn delete_event(pool: &DbPool, event_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let removed = diesel::delete(events::table.find(event_id)).execute(conn)?;
    if removed > 0 {
        info!("Deleted event {}", event_id);
    }
    Ok(removed > 0)
}

/// Seat availability of one event, or `None` if it does not exist
#[instrument(skip(pool))]
pub fn get_event_availability(pool: &DbPool, event_id: &str) -> Result<Option<Availability>> {
    Ok(get_event(pool, event_id)?.map(|event| event.availability()))
}

#[async_trait]
impl EventRepository for SqliteRepo {
    async fn list(&self) -> Result<Vec<Event>> {
        list_events(&self.pool)
    }

    async fn get(&self, id: &str) -> Result<Option<Event>> {
        get_event(&self.pool, id)
    }

    async fn create(&self, dto: CreateEventDto) -> Result<Event> {
        create_event(&self.pool, dto)
    }

    async fn update(&self, id: &str, dto: UpdateEventDto) -> Result<Option<Event>> {
        update_event(&self.pool, id, dto)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        delete_event(&self.pool, id)
    }

    async fn search(&self, term: &str, today: NaiveDate) -> Result<Vec<Event>> {
        search_events(&self.pool, term, today)
    }

    async fn upcoming(&self, today: NaiveDate) -> Result<Vec<Event>> {
        list_upcoming_events(&self.pool, today)
    }

    async fn availability(&self, id: &str) -> Result<Option<Availability>> {
        get_event_availability(&self.pool, id)
    }
}
