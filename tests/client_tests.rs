//! Client tests against a live server on an ephemeral port

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use evento::client::{
    AdminCredentials, AdminSession, ChannelNotifier, EventoClient, RemoteIdentity, SessionContext, TokenStore,
};
use evento::create_app;
use evento::dto::{CreateBookingDto, CreateEnquiryDto, CreateEventDto, CreateUserDto, UpdateEventDto};
use evento::models::PaymentStatus;
use tokio::net::TcpListener;

/// Serves a fresh SQLite-backed app and returns a client pointed at it
async fn spawn_server() -> EventoClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_app(common::create_test_state());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    EventoClient::new(format!("http://{}/", addr))
}

fn event_dto(title: &str, max_attendees: i32) -> CreateEventDto {
    CreateEventDto {
        title: title.to_string(),
        description: "An evening of talks".to_string(),
        date: NaiveDate::from_ymd_opt(2099, 3, 1).unwrap(),
        time: "07:00 PM".to_string(),
        location: "Luxury Hotel".to_string(),
        address: "321 Elite St, Hyderabad".to_string(),
        price: 250.0,
        image_url: None,
        category: "Talk".to_string(),
        user_id: None,
        max_attendees: Some(max_attendees),
        status: None,
    }
}

#[tokio::test]
async fn test_client_round_trip() {
    let client = spawn_server().await;

    let user = client
        .create_user(&CreateUserDto {
            email: "kiran@example.com".to_string(),
            name: "Kiran".to_string(),
            avatar_url: None,
        })
        .await
        .unwrap();
    assert_eq!(client.get_users().await.len(), 1);

    let event = client.create_event(&event_dto("Tech Talks", 3)).await.unwrap();
    assert_eq!(client.search_events("TALKS").await.len(), 1);
    assert_eq!(client.get_upcoming_events().await.len(), 1);

    let booking = client
        .create_booking(&CreateBookingDto {
            event_id: event.get_id(),
            user_id: user.get_id(),
            quantity: 2,
            total_price: 500.0,
            payment_status: Some(PaymentStatus::Completed),
        })
        .await
        .unwrap();

    let availability = client.get_event_availability(&event.get_id()).await.unwrap();
    assert_eq!(availability.available_spots, 1);
    assert_eq!(client.get_event_revenue(&event.get_id()).await, 500.0);
    assert!(client.check_capacity(&event.get_id(), 1).await);
    assert!(!client.check_capacity(&event.get_id(), 2).await);

    let bookings = client.get_user_bookings(&user.get_id()).await;
    assert_eq!(bookings[0].booking.get_id(), booking.get_id());
    assert_eq!(bookings[0].event.get_title(), "Tech Talks");

    let updated = client
        .update_event(&event.get_id(), &UpdateEventDto { price: Some(300.0), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(updated.get_price(), 300.0);

    assert!(client.delete_booking(&booking.get_id()).await);
    assert!(client.delete_event(&event.get_id()).await);
    assert!(client.delete_user(&user.get_id()).await);
}

#[tokio::test]
async fn test_client_sentinels_on_refusals() {
    let client = spawn_server().await;

    assert!(client.get_user("missing").await.is_none());
    assert!(client.get_event("missing").await.is_none());
    assert!(client.get_event_availability("missing").await.is_none());
    assert_eq!(client.get_event_revenue("missing").await, 0.0);
    assert!(!client.check_capacity("missing", 1).await);
    assert!(!client.delete_event("missing").await);
    assert!(client.get_user_bookings("missing").await.is_empty());

    let overbooked = client
        .create_booking(&CreateBookingDto {
            event_id: "missing".to_string(),
            user_id: "missing".to_string(),
            quantity: 1,
            total_price: 1.0,
            payment_status: None,
        })
        .await;
    assert!(overbooked.is_none());

    let enquiry = client
        .submit_enquiry(&CreateEnquiryDto {
            name: "Neha".to_string(),
            email: "neha@example.com".to_string(),
            phone: "+91 9000000000".to_string(),
            message: "Do you host birthday parties?".to_string(),
            event_type: "Birthday".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(client.get_enquiry(&enquiry.get_id()).await.unwrap().get_name(), "Neha");
    assert!(client.delete_enquiry(&enquiry.get_id()).await);
    assert!(client.get_enquiry(&enquiry.get_id()).await.is_none());
}

#[tokio::test]
async fn test_session_context_against_server() {
    let client = spawn_server().await;
    let (notifier, mut notifications) = ChannelNotifier::new();
    let identity = Arc::new(RemoteIdentity::new(client.clone(), TokenStore::memory()));
    let context = SessionContext::start(identity.clone(), Arc::new(notifier));
    context.ready().await;
    assert!(context.user().await.is_none());

    let outcome = context.sign_up("lakshmi@example.com", "pw123", "Lakshmi").await;
    assert!(outcome.success);
    assert_eq!(notifications.recv().await.unwrap().title, "Registration Successful");

    let outcome = context.sign_in("lakshmi@example.com", "wrong").await;
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("Invalid email or password"));
    let failed = notifications.recv().await.unwrap();
    assert!(failed.is_destructive());

    let outcome = context.sign_in("lakshmi@example.com", "pw123").await;
    assert!(outcome.success);
    notifications.recv().await.unwrap();

    // A second context over the same identity restores the session
    let second = SessionContext::start(identity, Arc::new(ChannelNotifier::new().0));
    second.ready().await;
    assert_eq!(second.user().await.unwrap().get_email(), "lakshmi@example.com");

    let outcome = context.sign_out().await;
    assert!(outcome.success);
    assert_eq!(notifications.recv().await.unwrap().title, "Logged Out");
    assert!(context.user().await.is_none());
}

#[tokio::test]
async fn test_admin_session_against_server() {
    let client = spawn_server().await;
    let (notifier, mut notifications) = ChannelNotifier::new();
    let mut admin = AdminSession::new(client.clone(), Arc::new(notifier));

    assert!(!admin.login("admin", "guess").await);
    assert_eq!(notifications.recv().await.unwrap().title, "Admin Login Failed");

    let wrong = AdminCredentials { username: "admin".to_string(), password: "guess".to_string() };
    assert!(client.admin_summary(&wrong).await.is_none());

    assert!(admin.login("admin", "admin").await);
    assert_eq!(notifications.recv().await.unwrap().title, "Admin Login Successful");

    let credentials = admin.credentials().unwrap().clone();
    let summary = admin.client().admin_summary(&credentials).await.unwrap();
    assert_eq!(summary.users, 0);
    assert!(admin.client().admin_events(&credentials).await.is_empty());

    admin.logout();
    assert!(!admin.is_logged_in());
    assert_eq!(notifications.recv().await.unwrap().title, "Admin Logged Out");
}
