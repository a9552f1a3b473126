//! Integration tests for the authentication flow.

mod helpers;

use http::StatusCode;

#[tokio::test]
async fn test_login_success() {
    let app = helpers::TestApp::new();
    app.create_test_user(1, "testuser", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "testuser",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert!(response.body["data"]["token"].is_string());
    assert!(response.body["data"]["expires_at"].is_string());
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let app = helpers::TestApp::new();
    app.create_test_user(1, "testuser2", "password123").await;

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "testuser2",
                "password": "wrongpassword",
            })),
            None,
        )
        .await;
    let unknown_user = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "nobody",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.error_code(), "INVALID_CREDENTIALS");
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_login_rejects_empty_fields() {
    let app = helpers::TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "", "password": "x" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION");
}

#[tokio::test]
async fn test_login_admit_logout_then_revoked() {
    let app = helpers::TestApp::new();
    app.create_test_user(7, "alice", "wonderland").await;
    let token = app.login("alice", "wonderland").await;

    let me = app.request("GET", "/api/users/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["id"], 7);

    let logout = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let retry = app.request("GET", "/api/users/me", None, Some(&token)).await;
    assert_eq!(retry.status, StatusCode::UNAUTHORIZED);
    assert_eq!(retry.error_code(), "REVOKED");

    // A fresh login still works.
    let fresh = app.login("alice", "wonderland").await;
    let me = app.request("GET", "/api/users/me", None, Some(&fresh)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_sweeps_session_markers() {
    let app = helpers::TestApp::new();
    app.create_test_user(7, "alice", "wonderland").await;
    let ttl = std::time::Duration::from_secs(60);
    app.state
        .revocations
        .record_session(7, "tablet", ttl)
        .await
        .unwrap();

    let token = app.login("alice", "wonderland").await;
    let logout = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let mut sweep = app.state.revocations.sweep_sessions(7);
    let mut left = Vec::new();
    while let Some(batch) = sweep.next_batch().await.unwrap() {
        left.extend(batch);
    }
    assert!(left.is_empty());
}

#[tokio::test]
async fn test_missing_or_malformed_header() {
    let app = helpers::TestApp::new();

    for header in [None, Some("Basic abc"), Some("Bearer"), Some("Bearer a b")] {
        let response = app
            .request_with_header("GET", "/api/users/me", None, header)
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "header {header:?}");
        assert_eq!(response.error_code(), "MISSING_TOKEN", "header {header:?}");
    }

    let response = app
        .request("GET", "/api/users/me", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "MALFORMED");
}

#[tokio::test]
async fn test_lowercase_scheme_is_accepted() {
    let app = helpers::TestApp::new();
    app.create_test_user(3, "carol", "password123").await;
    let token = app.login("carol", "password123").await;

    let response = app
        .request_with_header(
            "GET",
            "/api/users/me",
            None,
            Some(&format!("bearer {token}")),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_and_tampered_tokens() {
    let app = helpers::TestApp::new();
    app.create_test_user(7, "alice", "wonderland").await;

    let expired = app
        .state
        .codec
        .issue_with_lifetime(7, "alice", chrono::Duration::seconds(-30))
        .unwrap()
        .token;
    let response = app
        .request("GET", "/api/users/me", None, Some(&expired))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "EXPIRED");

    let token = app.login("alice", "wonderland").await;
    let mut tampered = token.into_bytes();
    let last = tampered.len() - 2;
    tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();
    let response = app
        .request("GET", "/api/users/me", None, Some(&tampered))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "SIGNATURE_INVALID");
}

#[tokio::test]
async fn test_logout_requires_auth() {
    let app = helpers::TestApp::new();
    let response = app.request("POST", "/api/auth/logout", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = helpers::TestApp::new();
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["cache"], "connected");
    assert_eq!(response.body["data"]["database"], "connected");
}

#[tokio::test]
async fn test_unreachable_cache_rejects_valid_tokens() {
    let app = helpers::TestApp::with_unreachable_cache();
    app.create_test_user(1, "cacheless", "password123").await;

    // Login does not touch the shared cache.
    let token = app.login("cacheless", "password123").await;

    let me = app.request("GET", "/api/users/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(me.error_code(), "STORE_UNAVAILABLE");

    let logout = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    assert_eq!(logout.status, StatusCode::SERVICE_UNAVAILABLE);

    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["data"]["cache"], "unavailable");
    assert_eq!(health.body["data"]["database"], "connected");
}
