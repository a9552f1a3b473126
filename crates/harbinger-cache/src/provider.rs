//! Cache manager that dispatches to the configured provider.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use harbinger_core::config::CacheConfig;
use harbinger_core::error::AppError;
use harbinger_core::result::AppResult;
use harbinger_core::traits::cache::{CacheProvider, ScanCursor, ScanPage};

/// Cache manager that wraps the configured cache provider.
///
/// The provider is selected at construction time based on configuration.
/// Every delegated call is raced against `op_timeout`; a call that loses the
/// race fails with `StoreUnavailable` and its in-flight future is dropped.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// The inner cache provider.
    inner: Arc<dyn CacheProvider>,
    /// Upper bound on a single round trip.
    op_timeout: Duration,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis cache provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                let provider =
                    crate::redis::RedisCacheProvider::new(client, config.default_ttl_seconds);
                Arc::new(provider)
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory cache provider");
                let provider = crate::memory::MemoryCacheProvider::new(
                    &config.memory,
                    config.default_ttl_seconds,
                );
                Arc::new(provider)
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self {
            inner,
            op_timeout: Duration::from_millis(config.operation_timeout_ms),
        })
    }

    /// Create a cache manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn CacheProvider>, op_timeout: Duration) -> Self {
        Self {
            inner: provider,
            op_timeout,
        }
    }

    /// Get a reference to the inner provider.
    pub fn provider(&self) -> &dyn CacheProvider {
        self.inner.as_ref()
    }

    async fn bounded<T>(&self, call: impl Future<Output = AppResult<T>>) -> AppResult<T> {
        tokio::time::timeout(self.op_timeout, call).await?
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.bounded(self.inner.get(key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.bounded(self.inner.set(key, value, ttl)).await
    }

    async fn set_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.bounded(self.inner.set_default(key, value)).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.bounded(self.inner.delete(key)).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.bounded(self.inner.exists(key)).await
    }

    async fn scan(&self, pattern: &str, cursor: ScanCursor, count: usize) -> AppResult<ScanPage> {
        self.bounded(self.inner.scan(pattern, cursor, count)).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.bounded(self.inner.health_check()).await
    }
}
