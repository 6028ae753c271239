/// Repository module
///
/// This module provides the data access layer for the application. Each
/// entity has its own repository trait so the backing store can be swapped
/// without touching the handlers:
///
/// - `SqliteRepo` persists through diesel and the r2d2 pool
/// - `SampleRepo` keeps the fixed demo data set in memory
///
/// The SQLite functions are also exported as free functions taking a
/// `&DbPool`, which is what the trait implementation delegates to.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::db::DbPool;
use crate::dto::{
    CreateBookingDto, CreateEnquiryDto, CreateEventDto, CreateUserDto, UpdateBookingDto, UpdateEnquiryDto,
    UpdateEventDto, UpdateUserDto,
};
use crate::models::{Availability, Booking, BookingWithEvent, Enquiry, Event, User};

mod user_repo;
mod event_repo;
mod booking_repo;
mod enquiry_repo;
mod sample;

// Re-export all repository functions
pub use user_repo::*;
pub use event_repo::*;
pub use booking_repo::*;
pub use enquiry_repo::*;
pub use sample::SampleRepo;

/// Why a write was refused
///
/// Carried inside the `anyhow::Error` returned by repository writes so
/// callers can tell a refusal apart from a storage failure with
/// `downcast_ref`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteRejection {
    #[error("Event not found")]
    EventNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Not enough seats available")]
    InsufficientCapacity,
    #[error("A user with this email already exists")]
    EmailTaken,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, newest first
    async fn list(&self) -> Result<Vec<User>>;
    async fn get(&self, id: &str) -> Result<Option<User>>;
    /// Looks a user up by an already normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn create(&self, dto: CreateUserDto) -> Result<User>;
    /// Returns `None` when no user has this id
    async fn update(&self, id: &str, dto: UpdateUserDto) -> Result<Option<User>>;
    /// Returns `true` only if a user was removed
    async fn delete(&self, id: &str) -> Result<bool>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// All events by date, earliest first
    async fn list(&self) -> Result<Vec<Event>>;
    async fn get(&self, id: &str) -> Result<Option<Event>>;
    async fn create(&self, dto: CreateEventDto) -> Result<Event>;
    async fn update(&self, id: &str, dto: UpdateEventDto) -> Result<Option<Event>>;
    async fn delete(&self, id: &str) -> Result<bool>;
    /// Active events from `today` on whose title or description contains `term`
    ///
    /// A blank term lists every event.
    async fn search(&self, term: &str, today: NaiveDate) -> Result<Vec<Event>>;
    async fn upcoming(&self, today: NaiveDate) -> Result<Vec<Event>>;
    async fn availability(&self, id: &str) -> Result<Option<Availability>>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Every booking joined with its event, newest first
    async fn list(&self) -> Result<Vec<BookingWithEvent>>;
    /// Stores a booking and takes its seats from the event
    ///
    /// Refusals are reported as a [`WriteRejection`].
    async fn create(&self, dto: CreateBookingDto) -> Result<Booking>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<BookingWithEvent>>;
    async fn update(&self, id: &str, dto: UpdateBookingDto) -> Result<Option<Booking>>;
    /// Removes a booking and gives its seats back to the event
    async fn delete(&self, id: &str) -> Result<bool>;
    /// Sum of completed booking totals for the event
    async fn revenue_for_event(&self, event_id: &str) -> Result<f64>;
    async fn check_capacity(&self, event_id: &str, requested: i32) -> Result<bool>;
}

#[async_trait]
pub trait EnquiryRepository: Send + Sync {
    /// All enquiries, newest first
    async fn list(&self) -> Result<Vec<Enquiry>>;
    async fn submit(&self, dto: CreateEnquiryDto) -> Result<Enquiry>;
    async fn get(&self, id: &str) -> Result<Option<Enquiry>>;
    async fn update(&self, id: &str, dto: UpdateEnquiryDto) -> Result<Option<Enquiry>>;
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLite-backed implementation of every repository trait
#[derive(Clone)]
pub struct SqliteRepo {
    pool: Arc<DbPool>,
}

impl SqliteRepo {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

/// The repositories handed to the HTTP handlers
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub enquiries: Arc<dyn EnquiryRepository>,
}

impl Repositories {
    pub fn sqlite(pool: Arc<DbPool>) -> Self {
        let repo = Arc::new(SqliteRepo::new(pool));
        Self {
            users: repo.clone(),
            events: repo.clone(),
            bookings: repo.clone(),
            enquiries: repo,
        }
    }

    /// In-memory repositories seeded with the demo data set
    pub fn sample() -> Self {
        let repo = Arc::new(SampleRepo::seeded());
        Self {
            users: repo.clone(),
            events: repo.clone(),
            bookings: repo.clone(),
            enquiries: repo,
        }
    }
}
