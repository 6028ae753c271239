use crate::*;
use proptest::prelude::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use diesel::sql_types::Text;
use diesel::{QueryableByName, RunQueryDsl};
use std::sync::Arc;
use tower::ServiceExt;

use chrono::Duration;

use crate::admin::FixedCredentials;
use crate::repo::Repositories;
use crate::repo::tests::setup_test_db;

/// Builds application state over a fresh in-memory database
///
/// The repositories and the session store share the same pool, and the admin
/// pair is the default `admin`/`admin`.
pub fn setup_test_state() -> AppState {
    let pool = setup_test_db();
    AppState::new(
        Repositories::sqlite(pool.clone()),
        pool,
        Arc::new(FixedCredentials::default()),
        Duration::hours(1),
    )
}

/// Builds application state over the seeded sample store
///
/// Sessions still go to a fresh in-memory database.
pub fn setup_sample_state() -> AppState {
    AppState::new(
        Repositories::sample(),
        setup_test_db(),
        Arc::new(FixedCredentials::default()),
        Duration::hours(1),
    )
}

#[derive(QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

/// The test database comes up with every table and the router answers
#[tokio::test]
async fn test_setup_test_state() {
    let state = setup_test_state();

    let mut conn = state.pool.get().unwrap();
    let table_names: Vec<TableName> = diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
        .load(&mut conn)
        .expect("Failed to load table names");

    let expected_tables = vec![
        "users", "events", "bookings", "enquiries", "credentials", "sessions",
        "__diesel_schema_migrations" // Diesel's migration tracking table
    ];

    for table in expected_tables {
        let exists = table_names.iter().any(|t| t.name == table);
        assert!(exists, "Table '{}' not found in database", table);

        let query = format!("SELECT COUNT(*) FROM {}", table);
        let result = diesel::sql_query(&query).execute(&mut conn);
        assert!(result.is_ok(), "Failed to query table '{}': {:?}", table, result.err());
    }

    drop(conn);

    let request = Request::builder()
        .uri("/api/events")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = create_app(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Generates strings with awkward whitespace, quotes and non-ASCII text
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_./:-]{0,24}",
        "\\PC{0,16}",
        Just(String::new()),
        Just("  padded  ".to_string()),
        Just("quote\"and'apostrophe".to_string()),
        Just("ünïcödé ✓".to_string()),
    ]
}

/// The sample store is served through the same router
#[tokio::test]
async fn test_setup_sample_state() {
    let app = create_app(setup_sample_state());

    let request = Request::builder()
        .uri("/api/users")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let users: Vec<models::User> = serde_json::from_slice(&body).unwrap();
    assert_eq!(users.len(), 5);
}
