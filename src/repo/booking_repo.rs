use anyhow::{anyhow, Result};
use async_trait::async_trait;
use diesel::dsl::sum;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use super::user_repo::release_seats;
use super::{WriteRejection, BookingRepository, SqliteRepo};
use crate::db::DbPool;
use crate::dto::{CreateBookingDto, UpdateBookingDto};
use crate::models::{Booking, BookingWithEvent, Event, PaymentStatus};
use crate::schema::{bookings, events, users};

/// Creates a booking and takes its seats from the event
///
/// The capacity check, the insert and the seat count update run in one
/// transaction.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `dto` - The validated creation request
///
/// ### Returns
///
/// A Result containing the newly created Booking if successful
///
/// ### Errors
///
/// Returns a [`WriteRejection`] if the event or user does not exist or the
/// event has fewer free seats than requested, and a plain error if the
/// database operation fails
#[instrument(skip(pool, dto), fields(event_id = %dto.event_id, quantity = dto.quantity))]
pub fn create_booking(pool: &DbPool, dto: CreateBookingDto) -> Result<Booking> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let Some(event) = events::table.find(&dto.event_id).first::<Event>(conn).optional()? else {
            return Err(WriteRejection::EventNotFound.into());
        };
        let user_exists = users::table
            .find(&dto.user_id)
            .count()
            .get_result::<i64>(conn)?
            > 0;
        if !user_exists {
            return Err(WriteRejection::UserNotFound.into());
        }
        if !event.has_capacity_for(dto.quantity) {
            debug!("Event {} has only {} seats left", event.get_id(), event.available_spots());
            return Err(WriteRejection::InsufficientCapacity.into());
        }

        let new_booking = Booking::new(dto);
        diesel::insert_into(bookings::table)
            .values(&new_booking)
            .execute(conn)?;

        diesel::update(events::table.find(event.get_id()))
            .set(events::current_attendees.eq(event.get_current_attendees() + new_booking.get_quantity()))
            .execute(conn)?;

        info!("Created booking {}", new_booking.get_id());
        Ok(new_booking)
    })
}

/// Lists every booking joined with its event, newest first
#[instrument(skip(pool))]
pub fn list_bookings(pool: &DbPool) -> Result<Vec<BookingWithEvent>> {
    let conn = &mut pool.get()?;

    let rows = bookings::table
        .inner_join(events::table)
        .order(bookings::created_at.desc())
        .select((Booking::as_select(), Event::as_select()))
        .load::<(Booking, Event)>(conn)?;

    Ok(rows.into_iter().map(|(booking, event)| BookingWithEvent { booking, event }).collect())
}

/// Lists the bookings of one user joined with their events, newest first
#[instrument(skip(pool))]
pub fn list_bookings_for_user(pool: &DbPool, user_id: &str) -> Result<Vec<BookingWithEvent>> {
    let conn = &mut pool.get()?;

    let rows = bookings::table
        .inner_join(events::table)
        .filter(bookings::user_id.eq(user_id))
        .order(bookings::created_at.desc())
        .select((Booking::as_select(), Event::as_select()))
        .load::<(Booking, Event)>(conn)?;

    debug!("User {} has {} bookings", user_id, rows.len());
    Ok(rows.into_iter().map(|(booking, event)| BookingWithEvent { booking, event }).collect())
}

/// Applies a partial update to a booking
///
/// A quantity change moves the difference in seats to or from the event,
/// refusing an increase that does not fit.
///
/// ### Returns
///
/// The updated booking, or `None` if no booking has this id
#[instrument(skip(pool, dto))]
pub fn update_booking(pool: &DbPool, booking_id: &str, dto: UpdateBookingDto) -> Result<Option<Booking>> {
    if dto.is_empty() {
        return Err(anyhow!("No fields to update"));
    }

    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let Some(mut booking) = bookings::table.find(booking_id).first::<Booking>(conn).optional()? else {
            return Ok(None);
        };

        if let Some(quantity) = dto.quantity {
            let delta = quantity - booking.get_quantity();
            if delta != 0 {
                let event = events::table.find(booking.get_event_id()).first::<Event>(conn)?;
                if delta > 0 && !event.has_capacity_for(delta) {
                    return Err(WriteRejection::InsufficientCapacity.into());
                }
                diesel::update(events::table.find(event.get_id()))
                    .set(events::current_attendees.eq((event.get_current_attendees() + delta).max(0)))
                    .execute(conn)?;
            }
        }

        booking.apply_update(dto);
        diesel::update(bookings::table.find(booking_id))
            .set(&booking)
            .execute(conn)?;

        info!("Updated booking {}", booking_id);
        Ok(Some(booking))
    })
}

/// Deletes a booking and gives its seats back to the event
#[instrument(skip(pool))]
pub fn delete_booking(pool: &DbPool, booking_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let Some(booking) = bookings::table.find(booking_id).first::<Booking>(conn).optional()? else {
            return Ok(false);
        };

        release_seats(conn, &booking.get_event_id(), booking.get_quantity())?;
        diesel::delete(bookings::table.find(booking_id)).execute(conn)?;

        info!("Deleted booking {}", booking_id);
        Ok(true)
    })
}

/// Sum of `total_price` over the completed bookings of an event
///
/// ### Returns
///
/// `0.0` when the event has no completed bookings or does not exist
#[instrument(skip(pool))]
pub fn get_event_revenue(pool: &DbPool, event_id: &str) -> Result<f64> {
    let conn = &mut pool.get()?;

    let total = bookings::table
        .filter(bookings::event_id.eq(event_id))
        .filter(bookings::payment_status.eq(PaymentStatus::Completed))
        .select(sum(bookings::total_price))
        .first::<Option<f64>>(conn)?;

    Ok(total.unwrap_or(0.0))
}

/// Whether `requested` more seats fit into the event
///
/// ### Returns
///
/// `false` for an unknown event
#[instrument(skip(pool))]
pub fn check_event_capacity(pool: &DbPool, event_id: &str, requested: i32) -> Result<bool> {
    let conn = &mut pool.get()?;

    let event = events::table
        .find(event_id)
        .first::<Event>(conn)
        .optional()?;

    Ok(event.is_some_and(|e| e.has_capacity_for(requested)))
}

#[async_trait]
impl BookingRepository for SqliteRepo {
    async fn list(&self) -> Result<Vec<BookingWithEvent>> {
        list_bookings(&self.pool)
    }

    async fn create(&self, dto: CreateBookingDto) -> Result<Booking> {
        create_booking(&self.pool, dto)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<BookingWithEvent>> {
        list_bookings_for_user(&self.pool, user_id)
    }

    async fn update(&self, id: &str, dto: UpdateBookingDto) -> Result<Option<Booking>> {
        update_booking(&self.pool, id, dto)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        delete_booking(&self.pool, id)
    }

    async fn revenue_for_event(&self, event_id: &str) -> Result<f64> {
        get_event_revenue(&self.pool, event_id)
    }

    async fn check_capacity(&self, event_id: &str, requested: i32) -> Result<bool> {
        check_event_capacity(&self.pool, event_id, requested)
    }
}
