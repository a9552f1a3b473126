//! Cache provider trait for pluggable caching backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Position of an incremental key scan.
///
/// Backends encode their own resume point in [`ScanCursor::At`]; callers only
/// pass back what the previous page returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScanCursor {
    /// Begin a fresh scan.
    #[default]
    Start,
    /// Resume after the position returned by an earlier page.
    At(String),
}

/// One round trip of an incremental key scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Keys matched in this round trip. May be empty even when more pages follow.
    pub keys: Vec<String>,
    /// Where to resume, or `None` once the scan is complete.
    pub next: Option<ScanCursor>,
}

/// Trait for cache backends (Redis or in-memory).
///
/// All values are strings. The provider is responsible for key prefixing,
/// per-entry TTL enforcement, and bounding every call with its configured
/// operation timeout. Errors from an unreachable backend surface as
/// [`ErrorKind::StoreUnavailable`](crate::error::ErrorKind::StoreUnavailable).
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL. Overwrites any existing value and TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Set a value with the default TTL.
    async fn set_default(&self, key: &str, value: &str) -> AppResult<()>;

    /// Delete a key from the cache. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a live key exists in the cache.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Fetch one page of keys matching a glob `pattern` (trailing `*` only is
    /// portable across backends). `count` is a batch size hint.
    ///
    /// Keys present for the whole duration of a scan are returned at least once,
    /// even when other matching keys are deleted between pages.
    async fn scan(&self, pattern: &str, cursor: ScanCursor, count: usize) -> AppResult<ScanPage>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
