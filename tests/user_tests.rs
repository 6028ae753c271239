mod common;

use axum::http::StatusCode;
use common::*;
use evento::models::{BookingWithEvent, User};
use serde_json::json;

#[tokio::test]
async fn test_create_and_get_user() {
    let app = create_test_app();

    let user = create_user(&app, "John.Doe@Example.com", "John Doe").await;
    assert_eq!(user.get_email(), "john.doe@example.com");
    assert_eq!(user.get_name(), "John Doe");
    assert!(user.get_avatar_url().is_none());

    let (status, body) = get(&app, &format!("/api/users/{}", user.get_id())).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: User = serde_json::from_value(body).unwrap();
    assert_eq!(fetched, user);
}

#[tokio::test]
async fn test_get_missing_user_is_404() {
    let app = create_test_app();

    let (status, body) = get(&app, "/api/users/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_create_user_validation() {
    let app = create_test_app();

    let (status, body) = post(&app, "/api/users", json!({ "email": "not-an-email", "name": "X" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid email"));

    let (status, _) = post(&app, "/api/users", json!({ "email": "a@example.com", "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = create_test_app();
    create_user(&app, "jane.smith@example.com", "Jane Smith").await;

    let (status, body) = post(&app, "/api/users", json!({ "email": "JANE.SMITH@example.com", "name": "Other Jane" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "A user with this email already exists");
}

#[tokio::test]
async fn test_list_users_newest_first() {
    let app = create_test_app();
    let first = create_user(&app, "first@example.com", "First").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = create_user(&app, "second@example.com", "Second").await;

    let (status, body) = get(&app, "/api/users").await;
    assert_eq!(status, StatusCode::OK);
    let users: Vec<User> = serde_json::from_value(body).unwrap();
    let ids: Vec<String> = users.iter().map(User::get_id).collect();
    assert_eq!(ids, vec![second.get_id(), first.get_id()]);
}

#[tokio::test]
async fn test_update_user() {
    let app = create_test_app();
    let user = create_user(&app, "bob@example.com", "Bob").await;
    let uri = format!("/api/users/{}", user.get_id());

    let (status, body) = put(&app, &uri, json!({ "name": "Bob Johnson", "avatar_url": "https://example.com/bob.png" })).await;
    assert_eq!(status, StatusCode::OK);
    let updated: User = serde_json::from_value(body).unwrap();
    assert_eq!(updated.get_name(), "Bob Johnson");
    assert_eq!(updated.get_email(), "bob@example.com");
    assert_eq!(updated.get_avatar_url().as_deref(), Some("https://example.com/bob.png"));

    let (status, _) = put(&app, &uri, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = put(&app, "/api/users/missing", json!({ "name": "Nobody" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user_releases_seats_and_keeps_events() {
    let app = create_test_app();
    let organiser = create_user(&app, "organiser@example.com", "Organiser").await;
    let guest = create_user(&app, "guest@example.com", "Guest").await;

    let (status, body) = post(
        &app,
        "/api/events",
        json!({
            "title": "Startup Networking Mixer",
            "description": "Connect with founders",
            "date": "2030-08-20",
            "time": "06:30 PM",
            "location": "The Grand Hotel",
            "address": "456 Park Ave, Delhi",
            "price": 500.0,
            "category": "Networking",
            "user_id": organiser.get_id(),
            "max_attendees": 10
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let event: evento::models::Event = serde_json::from_value(body).unwrap();
    create_booking(&app, &event, &guest, 3, "completed").await;

    let (status, _) = delete(&app, &format!("/api/users/{}", guest.get_id())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = get(&app, &format!("/api/events/{}/availability", event.get_id())).await;
    assert_eq!(body["current_attendees"], 0);

    let (status, _) = delete(&app, &format!("/api/users/{}", organiser.get_id())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = get(&app, &format!("/api/events/{}", event.get_id())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user_id"].is_null());

    let (status, _) = delete(&app, &format!("/api/users/{}", organiser.get_id())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_bookings_include_events() {
    let app = create_test_app();
    let user = create_user(&app, "alice@example.com", "Alice").await;
    let gala = create_event(&app, "Charity Gala", "2030-12-05", 2000.0, 50).await;
    let workshop = create_event(&app, "Digital Marketing Workshop", "2030-07-10", 750.0, 20).await;

    create_booking(&app, &gala, &user, 2, "completed").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    create_booking(&app, &workshop, &user, 1, "pending").await;

    let (status, body) = get(&app, &format!("/api/users/{}/bookings", user.get_id())).await;
    assert_eq!(status, StatusCode::OK);
    let bookings: Vec<BookingWithEvent> = serde_json::from_value(body).unwrap();

    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0].event.get_title(), "Digital Marketing Workshop");
    assert_eq!(bookings[1].event.get_id(), gala.get_id());
    assert_eq!(bookings[1].booking.get_quantity(), 2);
}
