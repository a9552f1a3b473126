//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use chrono::Utc;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use harbinger_api::AppState;
use harbinger_cache::CacheManager;
use harbinger_cache::memory::MemoryCacheProvider;
use harbinger_core::config::AppConfig;
use harbinger_core::error::AppError;
use harbinger_core::result::AppResult;
use harbinger_core::traits::cache::{CacheProvider, ScanCursor, ScanPage};
use harbinger_database::MemoryUserStore;
use harbinger_entity::user::User;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for reaching components directly
    pub state: AppState,
    /// The in-memory user store behind the router
    pub users: Arc<MemoryUserStore>,
}

impl TestApp {
    /// Create a new test application on in-memory backends.
    pub fn new() -> Self {
        Self::with_config(AppConfig::with_secret(TEST_SECRET))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let provider =
            MemoryCacheProvider::new(&config.cache.memory, config.cache.default_ttl_seconds);
        Self::with_cache_provider(config, Arc::new(provider))
    }

    /// Create a test application whose shared cache is unreachable.
    pub fn with_unreachable_cache() -> Self {
        Self::with_cache_provider(
            AppConfig::with_secret(TEST_SECRET),
            Arc::new(UnreachableCache),
        )
    }

    pub fn with_cache_provider(config: AppConfig, provider: Arc<dyn CacheProvider>) -> Self {
        let cache = Arc::new(CacheManager::from_provider(
            provider,
            Duration::from_millis(config.cache.operation_timeout_ms),
        ));
        let users = Arc::new(MemoryUserStore::new());

        let state = AppState::build(config, cache, users.clone()).expect("Failed to build state");
        let router = harbinger_api::build_app(state.clone());

        Self {
            router,
            state,
            users,
        }
    }

    /// Seed a user with a known id and password.
    pub async fn create_test_user(&self, id: i64, username: &str, password: &str) {
        let hasher = harbinger_auth::PasswordHasher::new().expect("Failed to build hasher");
        let hash = hasher.hash(password).await.expect("Failed to hash password");
        let now = Utc::now();
        self.users
            .insert(User {
                id,
                username: username.to_string(),
                email: format!("{username}@test.com"),
                password_hash: hash,
                created_at: now,
                updated_at: now,
            })
            .expect("Failed to create test user");
    }

    /// Login and return the token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        let response = self
            .request("POST", "/api/auth/login", Some(body), None)
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.body["data"]["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// Make an HTTP request with a bearer token
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let authorization = token.map(|t| format!("Bearer {t}"));
        self.request_with_header(method, path, body, authorization.as_deref())
            .await
    }

    /// Make an HTTP request with a raw `Authorization` value
    pub async fn request_with_header(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        authorization: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(value) = authorization {
            req = req.header("Authorization", value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// A shared cache whose every round trip fails.
#[derive(Debug)]
pub struct UnreachableCache;

fn refused<T>() -> AppResult<T> {
    Err(AppError::store_unavailable("Connection refused"))
}

#[async_trait]
impl CacheProvider for UnreachableCache {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        refused()
    }
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        refused()
    }
    async fn set_default(&self, _key: &str, _value: &str) -> AppResult<()> {
        refused()
    }
    async fn delete(&self, _key: &str) -> AppResult<()> {
        refused()
    }
    async fn exists(&self, _key: &str) -> AppResult<bool> {
        refused()
    }
    async fn scan(
        &self,
        _pattern: &str,
        _cursor: ScanCursor,
        _count: usize,
    ) -> AppResult<ScanPage> {
        refused()
    }
    async fn health_check(&self) -> AppResult<bool> {
        refused()
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The machine-readable error code of an error response.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
