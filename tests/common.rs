//! Common test utilities for Evento integration tests
//!
//! This file contains shared functions for all integration tests: building a
//! test application over a private in-memory database, sending JSON requests
//! through the router, and creating the records most tests start from.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use evento::{
    admin::FixedCredentials,
    create_app,
    db::{init_pool, run_migrations, DbPool},
    models::{Booking, Event, User},
    repo::Repositories,
    AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Opens a fresh shared-cache in-memory database with migrations applied
///
/// Plain ":memory:" would give every pooled connection its own empty
/// database, so each call gets a uniquely named one instead.
pub fn create_test_pool() -> Arc<DbPool> {
    let database_url = format!("file:evento_it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = init_pool(&database_url).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    Arc::new(pool)
}

/// Application state over SQLite with the default admin pair
pub fn create_test_state() -> AppState {
    let pool = create_test_pool();
    AppState::new(
        Repositories::sqlite(pool.clone()),
        pool,
        Arc::new(FixedCredentials::default()),
        chrono::Duration::hours(1),
    )
}

/// Creates a test application with an in-memory SQLite database
pub fn create_test_app() -> Router {
    create_app(create_test_state())
}

/// Creates a test application serving the seeded sample data
pub fn create_sample_app() -> Router {
    create_app(AppState::new(
        Repositories::sample(),
        create_test_pool(),
        Arc::new(FixedCredentials::default()),
        chrono::Duration::hours(1),
    ))
}

/// Sends a request and returns the status with the decoded JSON body
///
/// Empty bodies decode as `Value::Null`.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None, &[]).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body), &[]).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "PUT", uri, Some(body), &[]).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "DELETE", uri, None, &[]).await
}

/// Creates a user via the API and checks for 201
pub async fn create_user(app: &Router, email: &str, name: &str) -> User {
    let (status, body) = post(app, "/api/users", json!({ "email": email, "name": name })).await;
    assert_eq!(status, StatusCode::CREATED, "create user failed: {}", body);
    serde_json::from_value(body).unwrap()
}

/// Creates an event via the API
///
/// `date` is `YYYY-MM-DD`; everything not passed gets a plausible value.
pub async fn create_event(app: &Router, title: &str, date: &str, price: f64, max_attendees: i32) -> Event {
    let (status, body) = post(
        app,
        "/api/events",
        json!({
            "title": title,
            "description": format!("{} description", title),
            "date": date,
            "time": "09:00 AM",
            "location": "Convention Center",
            "address": "123 Main St, Mumbai",
            "price": price,
            "category": "Conference",
            "max_attendees": max_attendees
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create event failed: {}", body);
    serde_json::from_value(body).unwrap()
}

/// Books tickets via the API and checks for 201
pub async fn create_booking(app: &Router, event: &Event, user: &User, quantity: i32, status: &str) -> Booking {
    let (code, body) = post(
        app,
        "/api/bookings",
        json!({
            "event_id": event.get_id(),
            "user_id": user.get_id(),
            "quantity": quantity,
            "total_price": event.get_price() * f64::from(quantity),
            "payment_status": status
        }),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED, "create booking failed: {}", body);
    serde_json::from_value(body).unwrap()
}
