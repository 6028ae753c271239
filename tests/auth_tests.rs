mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::{json, Value};

async fn sign_up(app: &axum::Router, email: &str, password: &str, name: &str) -> (StatusCode, Value) {
    post(app, "/api/auth/sign-up", json!({ "email": email, "password": password, "name": name })).await
}

async fn session(app: &axum::Router, token: &str) -> (StatusCode, Value) {
    let bearer = format!("Bearer {}", token);
    send(app, "GET", "/api/auth/session", None, &[("Authorization", bearer.as_str())]).await
}

#[tokio::test]
async fn test_sign_up_opens_session() {
    let app = create_test_app();

    let (status, body) = sign_up(&app, "Sneha.Patel@Example.com", "s3cret", "Sneha Patel").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "sneha.patel@example.com");
    assert_eq!(body["user"]["name"], "Sneha Patel");
    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty());
    assert!(body["expires_at"].is_string());

    let (status, body) = session(&app, token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "sneha.patel@example.com");

    // The account is a regular user
    let (_, users) = get(&app, "/api/users").await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_sign_up_rejections() {
    let app = create_test_app();
    sign_up(&app, "sneha@example.com", "pw", "Sneha").await;

    let (status, body) = sign_up(&app, "SNEHA@example.com", "other", "Sneha Again").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "An account with this email already exists");

    let (status, body) = sign_up(&app, "new@example.com", "", "New").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "password must not be empty");

    let (status, _) = sign_up(&app, "no-at-sign", "pw", "New").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_in() {
    let app = create_test_app();
    sign_up(&app, "vikram@example.com", "hunter2", "Vikram").await;

    let (status, body) = post(
        &app,
        "/api/auth/sign-in",
        json!({ "email": " Vikram@Example.com ", "password": "hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Vikram");

    let (status, _) = session(&app, body["token"].as_str().unwrap()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_failed_sign_in_does_not_reveal_which_part_was_wrong() {
    let app = create_test_app();
    sign_up(&app, "vikram@example.com", "hunter2", "Vikram").await;

    let wrong_password = post(
        &app,
        "/api/auth/sign-in",
        json!({ "email": "vikram@example.com", "password": "hunter3" }),
    )
    .await;
    let unknown_email = post(
        &app,
        "/api/auth/sign-in",
        json!({ "email": "nobody@example.com", "password": "hunter2" }),
    )
    .await;
    let empty = post(&app, "/api/auth/sign-in", json!({ "email": "", "password": "" })).await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password, empty);
    assert_eq!(wrong_password.1["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_session_requires_valid_bearer() {
    let app = create_test_app();

    let (status, body) = get(&app, "/api/auth/session").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing bearer token");

    let (status, body) = session(&app, "not-a-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Session expired or invalid");
}

#[tokio::test]
async fn test_sign_out_ends_session() {
    let app = create_test_app();
    let (_, body) = sign_up(&app, "meera@example.com", "pw", "Meera").await;
    let token = body["token"].as_str().unwrap().to_string();
    let bearer = format!("Bearer {}", token);

    let (status, _) = send(&app, "POST", "/api/auth/sign-out", None, &[("Authorization", bearer.as_str())]).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = session(&app, &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Signing out twice is harmless
    let (status, _) = send(&app, "POST", "/api/auth/sign-out", None, &[("Authorization", bearer.as_str())]).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_deleting_user_ends_their_sessions() {
    let app = create_test_app();
    let (_, body) = sign_up(&app, "meera@example.com", "pw", "Meera").await;
    let token = body["token"].as_str().unwrap().to_string();
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    let (status, _) = delete(&app, &format!("/api/users/{}", user_id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = session(&app, &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
