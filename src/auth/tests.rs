use std::sync::Arc;

use super::*;
use crate::repo::tests::setup_test_db;
use crate::repo::{SampleRepo, SqliteRepo};

fn sign_up_dto(email: &str, password: &str) -> SignUpDto {
    SignUpDto {
        email: email.to_string(),
        password: password.to_string(),
        name: "Rahul Verma".to_string(),
    }
}

#[test]
fn test_normalize_email() {
    assert_eq!(normalize_email("  John.Doe@Example.com "), Some("john.doe@example.com".to_string()));
    assert_eq!(normalize_email("not-an-email"), None);
    assert_eq!(normalize_email("@example.com"), None);
    assert_eq!(normalize_email("a@b@example.com"), None);
    assert_eq!(normalize_email("a@localhost"), None);
    assert_eq!(normalize_email("a b@example.com"), None);
    assert_eq!(normalize_email(""), None);
}

#[test]
fn test_hash_password_depends_on_salt() {
    let a = hash_password("secret", "salt-a");
    let b = hash_password("secret", "salt-b");
    assert_ne!(a, b);
    assert_eq!(a, hash_password("secret", "salt-a"));
    assert_eq!(a.len(), 64);
}

#[test]
fn test_generate_token_is_hex_and_unique() {
    let a = generate_token();
    let b = generate_token();
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
}

fn sqlite_users(pool: &Arc<DbPool>) -> SqliteRepo {
    SqliteRepo::new(pool.clone())
}

#[tokio::test]
async fn test_sign_up_then_sign_in() {
    let pool = setup_test_db();
    let users = sqlite_users(&pool);
    let (session, user) = sign_up(&users, &pool, &sign_up_dto("Rahul@Example.com", "pw123456"), Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(user.get_email(), "rahul@example.com");
    assert_eq!(session.get_user_id(), user.get_id());

    let (second, same_user) = sign_in(&users, &pool, "rahul@example.com", "pw123456", Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(same_user.get_id(), user.get_id());
    assert_ne!(second.get_token(), session.get_token());
}

#[tokio::test]
async fn test_sign_up_rejects_duplicates_and_bad_input() {
    let pool = setup_test_db();
    let users = sqlite_users(&pool);
    let ttl = Duration::hours(1);
    sign_up(&users, &pool, &sign_up_dto("rahul@example.com", "pw"), ttl).await.unwrap();

    let dup = sign_up(&users, &pool, &sign_up_dto("RAHUL@example.com", "other"), ttl).await;
    assert!(matches!(dup, Err(AuthError::EmailTaken)));

    let empty = sign_up(&users, &pool, &sign_up_dto("new@example.com", ""), ttl).await;
    assert!(matches!(empty, Err(AuthError::Validation(_))));

    let malformed = sign_up(&users, &pool, &sign_up_dto("nope", "pw"), ttl).await;
    assert!(matches!(malformed, Err(AuthError::Validation(_))));
}

#[tokio::test]
async fn test_sign_up_loses_to_profile_inserted_first() {
    let pool = setup_test_db();
    let users = sqlite_users(&pool);
    let profile = CreateUserDto {
        email: "twin@example.com".to_string(),
        name: "First Twin".to_string(),
        avatar_url: None,
    };
    users.create(profile).await.unwrap();

    // the unique email index decides, there is no separate pre-check
    let late = sign_up(&users, &pool, &sign_up_dto("TWIN@example.com", "pw-two"), Duration::hours(1)).await;
    assert!(matches!(late, Err(AuthError::EmailTaken)));

    let conn = &mut pool.get().unwrap();
    let stored: i64 = credentials::table.count().get_result(conn).unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_sign_up_with_profile_store_outside_sqlite() {
    let pool = setup_test_db();
    let users = SampleRepo::seeded();
    let ttl = Duration::hours(1);

    let (session, user) = sign_up(&users, &pool, &sign_up_dto("new.guest@example.com", "pw"), ttl).await.unwrap();
    assert_eq!(users.get(&user.get_id()).await.unwrap(), Some(user.clone()));

    let (_, found) = current_session(&users, &pool, &session.get_token()).await.unwrap();
    assert_eq!(found.get_id(), user.get_id());

    let (_, signed_in) = sign_in(&users, &pool, "new.guest@example.com", "pw", ttl).await.unwrap();
    assert_eq!(signed_in.get_id(), user.get_id());

    // seeded profiles have no password
    let seeded = sign_up(&users, &pool, &sign_up_dto("john.doe@example.com", "pw"), ttl).await;
    assert!(matches!(seeded, Err(AuthError::EmailTaken)));
    let no_password = sign_in(&users, &pool, "john.doe@example.com", "pw", ttl).await;
    assert!(matches!(no_password, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_sign_in_failures_are_indistinguishable() {
    let pool = setup_test_db();
    let users = sqlite_users(&pool);
    let ttl = Duration::hours(1);
    sign_up(&users, &pool, &sign_up_dto("rahul@example.com", "pw123456"), ttl).await.unwrap();

    let wrong_password = sign_in(&users, &pool, "rahul@example.com", "nope", ttl).await.unwrap_err();
    let unknown_email = sign_in(&users, &pool, "ghost@example.com", "pw123456", ttl).await.unwrap_err();
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());

    assert!(matches!(sign_in(&users, &pool, "", "", ttl).await, Err(AuthError::InvalidCredentials)));
    assert!(matches!(sign_in(&users, &pool, "rahul@example.com", "", ttl).await, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_current_session_and_sign_out() {
    let pool = setup_test_db();
    let users = sqlite_users(&pool);
    let (session, user) = sign_up(&users, &pool, &sign_up_dto("rahul@example.com", "pw"), Duration::hours(1))
        .await
        .unwrap();

    let (found, found_user) = current_session(&users, &pool, &session.get_token()).await.unwrap();
    assert_eq!(found.get_token(), session.get_token());
    assert_eq!(found_user.get_id(), user.get_id());

    sign_out(&pool, &session.get_token()).unwrap();
    assert!(matches!(current_session(&users, &pool, &session.get_token()).await, Err(AuthError::InvalidSession)));

    // signing out twice is fine
    sign_out(&pool, &session.get_token()).unwrap();
}

#[tokio::test]
async fn test_deleting_user_ends_their_sessions() {
    let pool = setup_test_db();
    let users = sqlite_users(&pool);
    let (session, user) = sign_up(&users, &pool, &sign_up_dto("rahul@example.com", "pw"), Duration::hours(1))
        .await
        .unwrap();

    assert!(users.delete(&user.get_id()).await.unwrap());
    assert!(matches!(current_session(&users, &pool, &session.get_token()).await, Err(AuthError::InvalidSession)));

    let conn = &mut pool.get().unwrap();
    let remaining: i64 = credentials::table.count().get_result(conn).unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_expired_session_is_removed() {
    let pool = setup_test_db();
    let users = sqlite_users(&pool);
    let (session, _) = sign_up(&users, &pool, &sign_up_dto("rahul@example.com", "pw"), Duration::seconds(-5))
        .await
        .unwrap();

    assert!(matches!(current_session(&users, &pool, &session.get_token()).await, Err(AuthError::InvalidSession)));

    let conn = &mut pool.get().unwrap();
    let remaining: i64 = sessions::table.count().get_result(conn).unwrap();
    assert_eq!(remaining, 0);
}
