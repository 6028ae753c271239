use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Event, PaymentStatus};
use crate::dto::{CreateBookingDto, UpdateBookingDto};

/// A ticket booking for an event
///
/// This struct maps directly to the `bookings` table.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::bookings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Booking {
    /// Unique identifier for the booking (UUID v4 as string)
    id: String,

    event_id: String,

    user_id: String,

    /// Number of tickets
    quantity: i32,

    total_price: f64,

    payment_status: PaymentStatus,

    created_at: NaiveDateTime,
}

/// A booking together with the event it is for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingWithEvent {
    #[serde(flatten)]
    pub booking: Booking,
    pub event: Event,
}

/// Completed revenue of one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revenue {
    pub event_id: String,
    pub total_revenue: f64,
}

impl Booking {
    /// Creates a new booking; the payment status defaults to pending
    pub fn new(dto: CreateBookingDto) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: dto.event_id,
            user_id: dto.user_id,
            quantity: dto.quantity,
            total_price: dto.total_price,
            payment_status: dto.payment_status.unwrap_or_default(),
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Creates a booking with an explicit id and creation time
    pub fn new_with_fields(id: String, dto: CreateBookingDto, created_at: DateTime<Utc>) -> Self {
        let mut booking = Self::new(dto);
        booking.id = id;
        booking.created_at = created_at.naive_utc();
        booking
    }

    /// Applies every `Some` field of the update to this booking
    pub fn apply_update(&mut self, update: UpdateBookingDto) {
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(total_price) = update.total_price {
            self.total_price = total_price;
        }
        if let Some(payment_status) = update.payment_status {
            self.payment_status = payment_status;
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_event_id(&self) -> String {
        self.event_id.clone()
    }

    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    pub fn get_quantity(&self) -> i32 {
        self.quantity
    }

    pub fn get_total_price(&self) -> f64 {
        self.total_price
    }

    pub fn get_payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn is_completed(&self) -> bool {
        self.payment_status == PaymentStatus::Completed
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}

/// Sums `total_price` over the completed bookings in `bookings`
pub fn completed_revenue<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> f64 {
    bookings
        .into_iter()
        .filter(|b| b.is_completed())
        .map(|b| b.total_price)
        .sum()
}
