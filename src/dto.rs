use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::normalize_email;
use crate::models::{EventStatus, PaymentStatus, User};

/// Default capacity for events created without an explicit `max_attendees`
pub const DEFAULT_MAX_ATTENDEES: i32 = 100;

/// Returns an error message naming the first empty field, if any
fn require_non_empty(fields: &[(&str, &str)]) -> Result<(), String> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(format!("{} must not be empty", name));
        }
    }
    Ok(())
}

fn require_email(email: &str) -> Result<(), String> {
    normalize_email(email)
        .map(|_| ())
        .ok_or_else(|| format!("Invalid email address: {}", email))
}

// ── Users ────────────────────────────────────────────────────────────

/// Data transfer object for creating a new user
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateUserDto {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl CreateUserDto {
    pub fn validate(&self) -> Result<(), String> {
        require_non_empty(&[("email", self.email.as_str()), ("name", self.name.as_str())])?;
        require_email(&self.email)
    }
}

/// Partial update for a user; only fields that are `Some` are written
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateUserDto {
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl UpdateUserDto {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.avatar_url.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("No fields to update".to_string());
        }
        if let Some(ref name) = self.name {
            require_non_empty(&[("name", name.as_str())])?;
        }
        if let Some(ref email) = self.email {
            require_email(email)?;
        }
        Ok(())
    }
}

// ── Events ───────────────────────────────────────────────────────────

/// Data transfer object for creating a new event
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateEventDto {
    pub title: String,
    pub description: String,
    /// Calendar date of the event (`YYYY-MM-DD`)
    pub date: NaiveDate,
    /// Free-form start time as shown to visitors, e.g. "09:00 AM"
    pub time: String,
    pub location: String,
    pub address: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    pub category: String,
    /// The user who created the event
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub max_attendees: Option<i32>,
    #[serde(default)]
    pub status: Option<EventStatus>,
}

impl CreateEventDto {
    pub fn validate(&self) -> Result<(), String> {
        require_non_empty(&[
            ("title", self.title.as_str()),
            ("time", self.time.as_str()),
            ("location", self.location.as_str()),
            ("category", self.category.as_str()),
        ])?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("price must be a non-negative number".to_string());
        }
        if matches!(self.max_attendees, Some(max) if max < 0) {
            return Err("max_attendees must not be negative".to_string());
        }
        Ok(())
    }
}

/// Partial update for an event
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateEventDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub user_id: Option<String>,
    pub max_attendees: Option<i32>,
    pub current_attendees: Option<i32>,
    pub status: Option<EventStatus>,
}

impl UpdateEventDto {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.location.is_none()
            && self.address.is_none()
            && self.price.is_none()
            && self.image_url.is_none()
            && self.category.is_none()
            && self.user_id.is_none()
            && self.max_attendees.is_none()
            && self.current_attendees.is_none()
            && self.status.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("No fields to update".to_string());
        }
        if let Some(ref title) = self.title {
            require_non_empty(&[("title", title.as_str())])?;
        }
        if matches!(self.price, Some(price) if !price.is_finite() || price < 0.0) {
            return Err("price must be a non-negative number".to_string());
        }
        if matches!(self.max_attendees, Some(max) if max < 0) {
            return Err("max_attendees must not be negative".to_string());
        }
        if matches!(self.current_attendees, Some(current) if current < 0) {
            return Err("current_attendees must not be negative".to_string());
        }
        Ok(())
    }
}

/// Query string for `GET /api/events`
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct EventSearchQuery {
    pub search: Option<String>,
}

/// Query string for `GET /api/events/{id}/capacity`
#[derive(Serialize, Deserialize, Debug)]
pub struct CapacityQuery {
    pub quantity: i32,
}

/// Answer of the capacity check
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CapacityResponse {
    pub event_id: String,
    pub quantity: i32,
    pub available: bool,
}

// ── Bookings ─────────────────────────────────────────────────────────

/// Data transfer object for creating a booking
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateBookingDto {
    pub event_id: String,
    pub user_id: String,
    pub quantity: i32,
    pub total_price: f64,
    /// Defaults to `pending`
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

impl CreateBookingDto {
    pub fn validate(&self) -> Result<(), String> {
        require_non_empty(&[("event_id", self.event_id.as_str()), ("user_id", self.user_id.as_str())])?;
        if self.quantity <= 0 {
            return Err("quantity must be positive".to_string());
        }
        if !self.total_price.is_finite() || self.total_price < 0.0 {
            return Err("total_price must be a non-negative number".to_string());
        }
        Ok(())
    }
}

/// Partial update for a booking
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateBookingDto {
    pub quantity: Option<i32>,
    pub total_price: Option<f64>,
    pub payment_status: Option<PaymentStatus>,
}

impl UpdateBookingDto {
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.total_price.is_none() && self.payment_status.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("No fields to update".to_string());
        }
        if matches!(self.quantity, Some(q) if q <= 0) {
            return Err("quantity must be positive".to_string());
        }
        if matches!(self.total_price, Some(p) if !p.is_finite() || p < 0.0) {
            return Err("total_price must be a non-negative number".to_string());
        }
        Ok(())
    }
}

// ── Enquiries ────────────────────────────────────────────────────────

/// Data transfer object for the contact/enquiry form
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateEnquiryDto {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub event_type: String,
}

impl CreateEnquiryDto {
    pub fn validate(&self) -> Result<(), String> {
        require_non_empty(&[
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("message", self.message.as_str()),
            ("event_type", self.event_type.as_str()),
        ])?;
        require_email(&self.email)
    }
}

/// Partial update for an enquiry
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateEnquiryDto {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub event_type: Option<String>,
}

impl UpdateEnquiryDto {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.message.is_none()
            && self.event_type.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("No fields to update".to_string());
        }
        if let Some(ref email) = self.email {
            require_email(email)?;
        }
        Ok(())
    }
}

// ── Auth ─────────────────────────────────────────────────────────────

/// Credentials submitted to `POST /api/auth/sign-in`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignInDto {
    pub email: String,
    pub password: String,
}

/// Registration form submitted to `POST /api/auth/sign-up`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignUpDto {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// A live session together with the user it belongs to
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

// ── Admin ────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdminLoginDto {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminLoginResponse {
    pub success: bool,
}

/// Counts shown at the top of the admin dashboard
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdminSummary {
    pub users: usize,
    pub events: usize,
    pub bookings: usize,
    pub enquiries: usize,
    /// Sum of completed booking totals across all events
    pub completed_revenue: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
