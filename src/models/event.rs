use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EventStatus;
use crate::dto::{CreateEventDto, UpdateEventDto, DEFAULT_MAX_ATTENDEES};

/// An event listed on the site
///
/// This struct maps directly to the `events` table. Besides the listing
/// details it tracks how many seats are taken so bookings can be checked
/// against the remaining capacity.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Event {
    /// Unique identifier for the event (UUID v4 as string)
    id: String,

    title: String,

    description: String,

    /// Calendar day the event takes place
    date: NaiveDate,

    /// Start time as displayed, e.g. "09:00 AM"
    time: String,

    /// Venue name
    location: String,

    /// Street address of the venue
    address: String,

    /// Ticket price per attendee
    price: f64,

    image_url: Option<String>,

    category: String,

    /// When this event was created
    created_at: NaiveDateTime,

    /// The user who created the event, if still present
    user_id: Option<String>,

    /// Total number of seats
    max_attendees: i32,

    /// Seats already taken by bookings
    current_attendees: i32,

    status: EventStatus,
}

/// Seat availability for a single event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub event_id: String,
    pub max_attendees: i32,
    pub current_attendees: i32,
    pub available_spots: i32,
}

impl Event {
    /// Creates a new event from a creation request
    ///
    /// A fresh UUID and timestamp are assigned, no seats are taken yet and the
    /// status defaults to active.
    pub fn new(dto: CreateEventDto) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: dto.title,
            description: dto.description,
            date: dto.date,
            time: dto.time,
            location: dto.location,
            address: dto.address,
            price: dto.price,
            image_url: dto.image_url,
            category: dto.category,
            created_at: Utc::now().naive_utc(),
            user_id: dto.user_id,
            max_attendees: dto.max_attendees.unwrap_or(DEFAULT_MAX_ATTENDEES),
            current_attendees: 0,
            status: dto.status.unwrap_or_default(),
        }
    }

    /// Creates an event with an explicit id and creation time
    ///
    /// Used by the sample data set.
    pub fn new_with_fields(id: String, dto: CreateEventDto, created_at: DateTime<Utc>) -> Self {
        let mut event = Self::new(dto);
        event.id = id;
        event.created_at = created_at.naive_utc();
        event
    }

    /// Applies every `Some` field of the update to this event
    pub fn apply_update(&mut self, update: UpdateEventDto) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(time) = update.time {
            self.time = time;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(user_id) = update.user_id {
            self.user_id = Some(user_id);
        }
        if let Some(max_attendees) = update.max_attendees {
            self.max_attendees = max_attendees;
        }
        if let Some(current_attendees) = update.current_attendees {
            self.current_attendees = current_attendees;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn get_description(&self) -> String {
        self.description.clone()
    }

    pub fn get_date(&self) -> NaiveDate {
        self.date
    }

    pub fn get_time(&self) -> String {
        self.time.clone()
    }

    pub fn get_location(&self) -> String {
        self.location.clone()
    }

    pub fn get_address(&self) -> String {
        self.address.clone()
    }

    pub fn get_price(&self) -> f64 {
        self.price
    }

    pub fn get_image_url(&self) -> Option<String> {
        self.image_url.clone()
    }

    pub fn get_category(&self) -> String {
        self.category.clone()
    }

    pub fn get_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    /// Forgets the creating user, mirroring `ON DELETE SET NULL`
    pub fn clear_user_id(&mut self) {
        self.user_id = None;
    }

    pub fn get_max_attendees(&self) -> i32 {
        self.max_attendees
    }

    pub fn get_current_attendees(&self) -> i32 {
        self.current_attendees
    }

    /// Adds (or, for a negative delta, releases) taken seats
    ///
    /// The count never drops below zero.
    pub fn adjust_attendees(&mut self, delta: i32) {
        self.current_attendees = (self.current_attendees + delta).max(0);
    }

    pub fn get_status(&self) -> EventStatus {
        self.status
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Number of seats still free
    pub fn available_spots(&self) -> i32 {
        self.max_attendees - self.current_attendees
    }

    /// Whether `requested` more seats fit into the remaining capacity
    pub fn has_capacity_for(&self, requested: i32) -> bool {
        self.available_spots() >= requested
    }

    /// Whether the event is active and takes place on or after `today`
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.status == EventStatus::Active && self.date >= today
    }

    /// Case-insensitive substring match on title or description
    pub fn matches_text(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.description.to_lowercase().contains(&needle)
    }

    pub fn availability(&self) -> Availability {
        Availability {
            event_id: self.id.clone(),
            max_attendees: self.max_attendees,
            current_attendees: self.current_attendees,
            available_spots: self.available_spots(),
        }
    }
}
