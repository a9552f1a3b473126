//! Integration tests for registration and profile reads.

mod helpers;

use http::StatusCode;

use harbinger_core::traits::cache::CacheProvider;

#[tokio::test]
async fn test_register_then_login() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users",
            Some(serde_json::json!({
                "username": "dave",
                "email": "dave@example.com",
                "password": "password123",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["username"], "dave");
    assert!(response.body["data"].get("password_hash").is_none());

    let token = app.login("dave@example.com", "password123").await;
    let me = app.request("GET", "/api/users/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["email"], "dave@example.com");
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = helpers::TestApp::new();
    app.create_test_user(1, "erin", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/users",
            Some(serde_json::json!({
                "username": "ERIN",
                "email": "other@example.com",
                "password": "password123",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "CONFLICT");
}

#[tokio::test]
async fn test_register_validation() {
    let app = helpers::TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/users",
            Some(serde_json::json!({
                "username": "fr",
                "email": "nope",
                "password": "short",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_is_cached_without_password_hash() {
    let app = helpers::TestApp::new();
    app.create_test_user(42, "frank", "password123").await;
    let token = app.login("frank", "password123").await;

    let me = app.request("GET", "/api/users/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["id"], 42);

    let cached = app
        .state
        .cache
        .get("user:42")
        .await
        .unwrap()
        .expect("profile should be cached");
    assert!(cached.contains("frank"));
    assert!(!cached.contains("argon2"));
}

#[tokio::test]
async fn test_profile_of_deleted_user_is_not_found() {
    let app = helpers::TestApp::new();
    // A valid token for a user that has no record.
    let token = app.state.codec.issue(99, "ghost").unwrap().token;

    let me = app.request("GET", "/api/users/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::NOT_FOUND);
    assert_eq!(me.error_code(), "NOT_FOUND");
}
