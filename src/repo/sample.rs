//! In-memory repositories backed by the demo data set
//!
//! Every write is kept in memory for the lifetime of the process, so a demo
//! deployment behaves like the real thing until it restarts.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{WriteRejection, BookingRepository, EnquiryRepository, EventRepository, UserRepository};
use crate::auth::normalize_email;
use crate::dto::{
    CreateBookingDto, CreateEnquiryDto, CreateEventDto, CreateUserDto, UpdateBookingDto, UpdateEnquiryDto,
    UpdateEventDto, UpdateUserDto,
};
use crate::models::{
    completed_revenue, Availability, Booking, BookingWithEvent, Enquiry, Event, PaymentStatus, User,
};

#[derive(Debug, Default)]
struct SampleData {
    users: Vec<User>,
    events: Vec<Event>,
    bookings: Vec<Booking>,
    enquiries: Vec<Enquiry>,
}

impl SampleData {
    fn event_mut(&mut self, id: &str) -> Option<&mut Event> {
        self.events.iter_mut().find(|e| e.get_id() == id)
    }

    fn with_event(&self, booking: &Booking) -> Option<BookingWithEvent> {
        self.events
            .iter()
            .find(|e| e.get_id() == booking.get_event_id())
            .map(|event| BookingWithEvent { booking: booking.clone(), event: event.clone() })
    }

    fn joined_newest_first<'a>(&self, bookings: impl Iterator<Item = &'a Booking>) -> Vec<BookingWithEvent> {
        let mut joined: Vec<BookingWithEvent> = bookings.filter_map(|b| self.with_event(b)).collect();
        joined.sort_by(|a, b| b.booking.get_created_at().cmp(&a.booking.get_created_at()));
        joined
    }
}

/// Repository implementation over an in-memory copy of the demo data
#[derive(Debug, Default)]
pub struct SampleRepo {
    data: RwLock<SampleData>,
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap_or_default()
}

fn on(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn sample_user(id: &str, email: &str, name: &str, avatar: &str, created_at: DateTime<Utc>) -> User {
    User::new_with_fields(
        id.to_string(),
        email.to_string(),
        name.to_string(),
        Some(format!("https://i.pravatar.cc/150?u={}", avatar)),
        created_at,
    )
}

#[allow(clippy::too_many_arguments)]
fn sample_event(
    id: &str,
    title: &str,
    description: &str,
    date: NaiveDate,
    time: &str,
    venue: (&str, &str),
    price: f64,
    image: &str,
    category: &str,
    created_at: DateTime<Utc>,
    user_id: &str,
) -> Event {
    let dto = CreateEventDto {
        title: title.to_string(),
        description: description.to_string(),
        date,
        time: time.to_string(),
        location: venue.0.to_string(),
        address: venue.1.to_string(),
        price,
        image_url: Some(format!("https://images.unsplash.com/{}?w=600", image)),
        category: category.to_string(),
        user_id: Some(user_id.to_string()),
        max_attendees: None,
        status: None,
    };
    Event::new_with_fields(id.to_string(), dto, created_at)
}

fn sample_booking(
    id: &str,
    event_id: &str,
    user_id: &str,
    quantity: i32,
    total_price: f64,
    status: PaymentStatus,
    created_at: DateTime<Utc>,
) -> Booking {
    let dto = CreateBookingDto {
        event_id: event_id.to_string(),
        user_id: user_id.to_string(),
        quantity,
        total_price,
        payment_status: Some(status),
    };
    Booking::new_with_fields(id.to_string(), dto, created_at)
}

fn sample_enquiry(
    id: &str,
    name: &str,
    email: &str,
    phone: &str,
    message: &str,
    event_type: &str,
    created_at: DateTime<Utc>,
) -> Enquiry {
    let dto = CreateEnquiryDto {
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        message: message.to_string(),
        event_type: event_type.to_string(),
    };
    Enquiry::new_with_fields(id.to_string(), dto, created_at)
}

fn seed_data() -> SampleData {
    let users = vec![
        sample_user("usr_123456789", "john.doe@example.com", "John Doe", "john", at(2023, 4, 15, 10, 30)),
        sample_user("usr_987654321", "jane.smith@example.com", "Jane Smith", "jane", at(2023, 5, 20, 14, 45)),
        sample_user("usr_456789123", "bob.johnson@example.com", "Bob Johnson", "bob", at(2023, 6, 10, 9, 15)),
        sample_user("usr_789123456", "alice.williams@example.com", "Alice Williams", "alice", at(2023, 7, 5, 16, 20)),
        sample_user("usr_321654987", "charlie.brown@example.com", "Charlie Brown", "charlie", at(2023, 8, 12, 11, 10)),
    ];

    let events = vec![
        sample_event(
            "evt_123456789",
            "Annual Tech Conference",
            "Join us for the biggest tech event of the year featuring keynotes from industry leaders.",
            on(2025, 9, 15),
            "09:00 AM",
            ("Convention Center", "123 Main St, Mumbai"),
            1500.0,
            "photo-1540575467063-178a50c2df87",
            "Conference",
            at(2023, 6, 1, 10, 0),
            "usr_123456789",
        ),
        sample_event(
            "evt_987654321",
            "Startup Networking Mixer",
            "Connect with entrepreneurs and investors in a casual setting.",
            on(2025, 8, 20),
            "06:30 PM",
            ("The Grand Hotel", "456 Park Ave, Delhi"),
            500.0,
            "photo-1511795409834-432e50ce8840",
            "Networking",
            at(2023, 6, 15, 14, 30),
            "usr_987654321",
        ),
        sample_event(
            "evt_456789123",
            "Digital Marketing Workshop",
            "Learn the latest strategies in SEO, social media, and content marketing.",
            on(2025, 7, 10),
            "10:00 AM",
            ("Business Center", "789 Corporate Blvd, Bangalore"),
            750.0,
            "photo-1454165804606-c3d57bc86b40",
            "Workshop",
            at(2023, 5, 20, 9, 45),
            "usr_456789123",
        ),
        sample_event(
            "evt_789123456",
            "Product Launch Gala",
            "Be the first to experience our revolutionary new product line.",
            on(2025, 10, 5),
            "07:00 PM",
            ("Luxury Hotel", "321 Elite St, Hyderabad"),
            2000.0,
            "photo-1501281668745-f7f57925c3b4",
            "Launch",
            at(2023, 7, 1, 16, 15),
            "usr_789123456",
        ),
        sample_event(
            "evt_321654987",
            "Leadership Summit",
            "Develop your leadership skills with coaching from top executives.",
            on(2025, 11, 15),
            "09:30 AM",
            ("Executive Center", "654 Leadership Ln, Chennai"),
            1200.0,
            "photo-1475721027785-f74eccf877e2",
            "Summit",
            at(2023, 8, 5, 11, 30),
            "usr_321654987",
        ),
    ];

    use PaymentStatus::{Completed, Failed, Pending};
    let bookings = vec![
        sample_booking("bkg_123456789", "evt_123456789", "usr_987654321", 2, 3000.0, Completed, at(2023, 8, 1, 10, 30)),
        sample_booking("bkg_987654321", "evt_987654321", "usr_123456789", 1, 500.0, Completed, at(2023, 8, 5, 14, 45)),
        sample_booking("bkg_456789123", "evt_456789123", "usr_789123456", 3, 2250.0, Pending, at(2023, 8, 10, 9, 15)),
        sample_booking("bkg_789123456", "evt_789123456", "usr_456789123", 2, 4000.0, Completed, at(2023, 8, 15, 16, 20)),
        sample_booking("bkg_321654987", "evt_321654987", "usr_123456789", 1, 1200.0, Failed, at(2023, 8, 20, 11, 10)),
        sample_booking("bkg_654987321", "evt_123456789", "usr_321654987", 4, 6000.0, Pending, at(2023, 8, 25, 13, 25)),
    ];

    let enquiries = vec![
        sample_enquiry(
            "enq_123456789",
            "Rajesh Kumar",
            "rajesh.kumar@example.com",
            "+91 9876543210",
            "I would like to know more about hosting a corporate event for 100 people. What packages do you offer?",
            "Corporate",
            at(2023, 8, 1, 10, 30),
        ),
        sample_enquiry(
            "enq_987654321",
            "Priya Sharma",
            "priya.sharma@example.com",
            "+91 8765432109",
            "Looking for a venue for my wedding reception in December. Please share availability and pricing.",
            "Wedding",
            at(2023, 8, 5, 14, 45),
        ),
        sample_enquiry(
            "enq_456789123",
            "Amit Patel",
            "amit.patel@example.com",
            "+91 7654321098",
            "Interested in booking a space for a product launch event. Need catering and AV equipment.",
            "Launch",
            at(2023, 8, 10, 9, 15),
        ),
        sample_enquiry(
            "enq_789123456",
            "Sneha Gupta",
            "sneha.gupta@example.com",
            "+91 6543210987",
            "Planning a charity fundraiser gala. Looking for a venue that can accommodate 200 guests with dinner service.",
            "Charity",
            at(2023, 8, 15, 16, 20),
        ),
        sample_enquiry(
            "enq_321654987",
            "Vikram Singh",
            "vikram.singh@example.com",
            "+91 5432109876",
            "Need information on booking a conference room for a two-day seminar with breakout sessions.",
            "Conference",
            at(2023, 8, 20, 11, 10),
        ),
    ];

    let mut data = SampleData { users, events, bookings, enquiries };

    // seat counts follow the seeded bookings
    let held: Vec<(String, i32)> = data.bookings.iter().map(|b| (b.get_event_id(), b.get_quantity())).collect();
    for (event_id, quantity) in held {
        if let Some(event) = data.event_mut(&event_id) {
            event.adjust_attendees(quantity);
        }
    }
    data
}

impl SampleRepo {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the demo users, events, bookings and enquiries
    pub fn seeded() -> Self {
        Self { data: RwLock::new(seed_data()) }
    }
}

#[async_trait]
impl UserRepository for SampleRepo {
    async fn list(&self) -> Result<Vec<User>> {
        let mut users = self.data.read().await.users.clone();
        users.sort_by(|a, b| b.get_created_at().cmp(&a.get_created_at()));
        Ok(users)
    }

    async fn get(&self, id: &str) -> Result<Option<User>> {
        Ok(self.data.read().await.users.iter().find(|u| u.get_id() == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.data.read().await.users.iter().find(|u| u.get_email() == email).cloned())
    }

    async fn create(&self, dto: CreateUserDto) -> Result<User> {
        let email = normalize_email(&dto.email).ok_or_else(|| anyhow!("Invalid email address: {}", dto.email))?;
        let mut data = self.data.write().await;
        if data.users.iter().any(|u| u.get_email() == email) {
            return Err(WriteRejection::EmailTaken.into());
        }
        let user = User::new(email, dto.name, dto.avatar_url);
        data.users.push(user.clone());
        info!("Created sample user {}", user.get_id());
        Ok(user)
    }

    async fn update(&self, id: &str, mut dto: UpdateUserDto) -> Result<Option<User>> {
        if dto.is_empty() {
            return Err(anyhow!("No fields to update"));
        }
        if let Some(ref email) = dto.email {
            dto.email = Some(normalize_email(email).ok_or_else(|| anyhow!("Invalid email address: {}", email))?);
        }
        let mut data = self.data.write().await;
        if let Some(ref email) = dto.email {
            if data.users.iter().any(|u| u.get_id() != id && &u.get_email() == email) {
                return Err(WriteRejection::EmailTaken.into());
            }
        }
        Ok(data.users.iter_mut().find(|u| u.get_id() == id).map(|user| {
            user.apply_update(dto);
            user.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut data = self.data.write().await;
        let before = data.users.len();
        data.users.retain(|u| u.get_id() != id);
        if data.users.len() == before {
            return Ok(false);
        }

        let (dropped, kept): (Vec<Booking>, Vec<Booking>) =
            std::mem::take(&mut data.bookings).into_iter().partition(|b| b.get_user_id() == id);
        data.bookings = kept;
        for booking in dropped {
            if let Some(event) = data.event_mut(&booking.get_event_id()) {
                event.adjust_attendees(-booking.get_quantity());
            }
        }
        for event in data.events.iter_mut().filter(|e| e.get_user_id().as_deref() == Some(id)) {
            event.clear_user_id();
        }
        Ok(true)
    }
}

fn by_date(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by_key(|e| e.get_date());
    events
}

#[async_trait]
impl EventRepository for SampleRepo {
    async fn list(&self) -> Result<Vec<Event>> {
        Ok(by_date(self.data.read().await.events.clone()))
    }

    async fn get(&self, id: &str) -> Result<Option<Event>> {
        Ok(self.data.read().await.events.iter().find(|e| e.get_id() == id).cloned())
    }

    async fn create(&self, dto: CreateEventDto) -> Result<Event> {
        let mut data = self.data.write().await;
        if let Some(ref user_id) = dto.user_id {
            if !data.users.iter().any(|u| &u.get_id() == user_id) {
                return Err(WriteRejection::UserNotFound.into());
            }
        }
        let event = Event::new(dto);
        data.events.push(event.clone());
        info!("Created sample event {}", event.get_id());
        Ok(event)
    }

    async fn update(&self, id: &str, dto: UpdateEventDto) -> Result<Option<Event>> {
        if dto.is_empty() {
            return Err(anyhow!("No fields to update"));
        }
        let mut data = self.data.write().await;
        if let Some(ref user_id) = dto.user_id {
            if !data.users.iter().any(|u| &u.get_id() == user_id) {
                return Err(WriteRejection::UserNotFound.into());
            }
        }
        Ok(data.event_mut(id).map(|event| {
            event.apply_update(dto);
            event.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut data = self.data.write().await;
        let before = data.events.len();
        data.events.retain(|e| e.get_id() != id);
        if data.events.len() == before {
            return Ok(false);
        }
        data.bookings.retain(|b| b.get_event_id() != id);
        Ok(true)
    }

    async fn search(&self, term: &str, today: NaiveDate) -> Result<Vec<Event>> {
        let term = term.trim();
        if term.is_empty() {
            return EventRepository::list(self).await;
        }
        let data = self.data.read().await;
        let matches = data
            .events
            .iter()
            .filter(|e| e.is_upcoming(today) && e.matches_text(term))
            .cloned()
            .collect();
        Ok(by_date(matches))
    }

    async fn upcoming(&self, today: NaiveDate) -> Result<Vec<Event>> {
        let data = self.data.read().await;
        Ok(by_date(data.events.iter().filter(|e| e.is_upcoming(today)).cloned().collect()))
    }

    async fn availability(&self, id: &str) -> Result<Option<Availability>> {
        let data = self.data.read().await;
        Ok(data.events.iter().find(|e| e.get_id() == id).map(Event::availability))
    }
}

#[async_trait]
impl BookingRepository for SampleRepo {
    async fn list(&self) -> Result<Vec<BookingWithEvent>> {
        let data = self.data.read().await;
        Ok(data.joined_newest_first(data.bookings.iter()))
    }

    async fn create(&self, dto: CreateBookingDto) -> Result<Booking> {
        let mut data = self.data.write().await;
        if !data.users.iter().any(|u| u.get_id() == dto.user_id) {
            return Err(WriteRejection::UserNotFound.into());
        }
        let quantity = dto.quantity;
        let Some(event) = data.event_mut(&dto.event_id) else {
            return Err(WriteRejection::EventNotFound.into());
        };
        if !event.has_capacity_for(quantity) {
            debug!("Event {} has only {} seats left", event.get_id(), event.available_spots());
            return Err(WriteRejection::InsufficientCapacity.into());
        }
        event.adjust_attendees(quantity);

        let booking = Booking::new(dto);
        data.bookings.push(booking.clone());
        info!("Created sample booking {}", booking.get_id());
        Ok(booking)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<BookingWithEvent>> {
        let data = self.data.read().await;
        Ok(data.joined_newest_first(data.bookings.iter().filter(|b| b.get_user_id() == user_id)))
    }

    async fn update(&self, id: &str, dto: UpdateBookingDto) -> Result<Option<Booking>> {
        if dto.is_empty() {
            return Err(anyhow!("No fields to update"));
        }
        let mut data = self.data.write().await;
        let Some(index) = data.bookings.iter().position(|b| b.get_id() == id) else {
            return Ok(None);
        };

        if let Some(quantity) = dto.quantity {
            let delta = quantity - data.bookings[index].get_quantity();
            let event_id = data.bookings[index].get_event_id();
            if let Some(event) = data.event_mut(&event_id) {
                if delta > 0 && !event.has_capacity_for(delta) {
                    return Err(WriteRejection::InsufficientCapacity.into());
                }
                event.adjust_attendees(delta);
            }
        }

        let booking = &mut data.bookings[index];
        booking.apply_update(dto);
        Ok(Some(booking.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut data = self.data.write().await;
        let Some(index) = data.bookings.iter().position(|b| b.get_id() == id) else {
            return Ok(false);
        };
        let booking = data.bookings.remove(index);
        if let Some(event) = data.event_mut(&booking.get_event_id()) {
            event.adjust_attendees(-booking.get_quantity());
        }
        Ok(true)
    }

    async fn revenue_for_event(&self, event_id: &str) -> Result<f64> {
        let data = self.data.read().await;
        Ok(completed_revenue(data.bookings.iter().filter(|b| b.get_event_id() == event_id)))
    }

    async fn check_capacity(&self, event_id: &str, requested: i32) -> Result<bool> {
        let data = self.data.read().await;
        Ok(data
            .events
            .iter()
            .find(|e| e.get_id() == event_id)
            .is_some_and(|e| e.has_capacity_for(requested)))
    }
}

#[async_trait]
impl EnquiryRepository for SampleRepo {
    async fn list(&self) -> Result<Vec<Enquiry>> {
        let mut enquiries = self.data.read().await.enquiries.clone();
        enquiries.sort_by(|a, b| b.get_created_at().cmp(&a.get_created_at()));
        Ok(enquiries)
    }

    async fn submit(&self, dto: CreateEnquiryDto) -> Result<Enquiry> {
        let enquiry = Enquiry::new(dto);
        self.data.write().await.enquiries.push(enquiry.clone());
        Ok(enquiry)
    }

    async fn get(&self, id: &str) -> Result<Option<Enquiry>> {
        Ok(self.data.read().await.enquiries.iter().find(|e| e.get_id() == id).cloned())
    }

    async fn update(&self, id: &str, dto: UpdateEnquiryDto) -> Result<Option<Enquiry>> {
        if dto.is_empty() {
            return Err(anyhow!("No fields to update"));
        }
        let mut data = self.data.write().await;
        Ok(data.enquiries.iter_mut().find(|e| e.get_id() == id).map(|enquiry| {
            enquiry.apply_update(dto);
            enquiry.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut data = self.data.write().await;
        let before = data.enquiries.len();
        data.enquiries.retain(|e| e.get_id() != id);
        Ok(data.enquiries.len() < before)
    }
}
