//! In-memory cache implementation using the moka crate.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::notification::RemovalCause;
use tracing::debug;

use harbinger_core::config::MemoryCacheConfig;
use harbinger_core::result::AppResult;
use harbinger_core::traits::cache::{CacheProvider, ScanCursor, ScanPage};

/// A cached value together with the TTL it was written with.
#[derive(Debug, Clone)]
struct CachedEntry {
    value: String,
    ttl: Duration,
    /// Write generation, used to match removals against the key index.
    generation: u64,
}

/// Expires each entry after the TTL supplied on its own write.
struct PerEntryExpiry;

impl Expiry<String, CachedEntry> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CachedEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Ordered view of the live keys, so scans can seek instead of walking the
/// whole cache.
///
/// Each key maps to the generation of its latest write. A removal only drops
/// the key when the generations match, which keeps a late expiry of an old
/// value from hiding a fresh write. The index may briefly hold a key the
/// cache no longer has; scans check the cache before returning a key.
#[derive(Debug, Clone, Default)]
struct KeyIndex {
    entries: Arc<Mutex<BTreeMap<String, u64>>>,
}

impl KeyIndex {
    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, u64>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, key: &str, generation: u64) {
        self.entries().insert(key.to_string(), generation);
    }

    fn forget(&self, key: &str, generation: u64) {
        let mut entries = self.entries();
        if entries.get(key) == Some(&generation) {
            entries.remove(key);
        }
    }

    /// Up to `limit` keys starting with `prefix`, in order, after `after`.
    fn after(&self, prefix: &str, after: Option<&str>, limit: usize) -> Vec<String> {
        let start = match after {
            Some(last) if last >= prefix => Bound::Excluded(last),
            _ => Bound::Included(prefix),
        };
        let entries = self.entries();
        entries
            .range::<str, _>((start, Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
            .take(limit)
            .cloned()
            .collect()
    }

    #[cfg(test)]
    fn contains(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }
}

/// In-memory cache provider using moka.
///
/// Suitable for a single node and for tests; it is not shared between
/// service instances. Entries are never evicted for size, only by TTL or
/// an explicit delete.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, CachedEntry>,
    /// Live keys in order, for scans.
    index: KeyIndex,
    /// Source of write generations.
    generation: Arc<AtomicU64>,
    /// Default TTL for entries.
    default_ttl: Duration,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig, default_ttl_seconds: u64) -> Self {
        let index = KeyIndex::default();
        let listener_index = index.clone();

        let cache = Cache::builder()
            .initial_capacity(config.initial_capacity)
            .expire_after(PerEntryExpiry)
            .eviction_listener(move |key: Arc<String>, entry: CachedEntry, cause| {
                // A replaced value's key is still live under its new write.
                if !matches!(cause, RemovalCause::Replaced) {
                    listener_index.forget(&key, entry.generation);
                }
            })
            .build();

        Self {
            cache,
            index,
            generation: Arc::new(AtomicU64::new(0)),
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }
}

/// Literal text before the first wildcard.
fn literal_prefix(pattern: &str) -> &str {
    pattern.split('*').next().unwrap_or_default()
}

/// Glob match supporting `*` only, which is all the key layouts use.
fn glob_matches(pattern: &str, key: &str) -> bool {
    let (p, k) = (pattern.as_bytes(), key.as_bytes());
    let (mut pi, mut ki) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ki < k.len() {
        if pi < p.len() && p[pi] == b'*' {
            backtrack = Some((pi, ki));
            pi += 1;
        } else if pi < p.len() && p[pi] == k[ki] {
            pi += 1;
            ki += 1;
        } else if let Some((star, matched)) = backtrack {
            pi = star + 1;
            ki = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == b'*')
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let entry = CachedEntry {
            value: value.to_string(),
            ttl,
            generation,
        };
        self.cache.insert(key.to_string(), entry).await;
        // Recorded after the insert so the index never lags behind a live key.
        self.index.record(key, generation);
        Ok(())
    }

    async fn set_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.set(key, value, self.default_ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.get(key).await.is_some())
    }

    async fn scan(&self, pattern: &str, cursor: ScanCursor, count: usize) -> AppResult<ScanPage> {
        // The cursor is the last key handed out; pages are served in key order
        // so deletions between pages never cause a skip.
        let mut position = match cursor {
            ScanCursor::Start => None,
            ScanCursor::At(last) => Some(last),
        };
        let prefix = literal_prefix(pattern);
        let batch = count.max(1);
        let mut keys = Vec::with_capacity(batch);
        let mut more = false;

        'seek: loop {
            let candidates = self.index.after(prefix, position.as_deref(), batch + 1);
            let exhausted = candidates.len() <= batch;

            for key in candidates {
                let live = glob_matches(pattern, &key) && self.cache.contains_key(&key);
                if live {
                    if keys.len() == batch {
                        more = true;
                        break 'seek;
                    }
                    keys.push(key.clone());
                }
                position = Some(key);
            }

            if exhausted {
                break;
            }
        }

        let next = if more {
            keys.last().cloned().map(ScanCursor::At)
        } else {
            None
        };

        debug!(pattern, found = keys.len(), more, "Memory scan page");
        Ok(ScanPage { keys, next })
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_provider() -> MemoryCacheProvider {
        MemoryCacheProvider::new(&MemoryCacheConfig::default(), 60)
    }

    #[tokio::test]
    async fn test_set_get() {
        let provider = make_provider();
        provider
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        let val = provider.get("key1").await.unwrap();
        assert_eq!(val, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let provider = make_provider();
        provider
            .set("key2", "value2", Duration::from_secs(60))
            .await
            .unwrap();
        provider.delete("key2").await.unwrap();
        assert_eq!(provider.get("key2").await.unwrap(), None);
        assert!(!provider.exists("key2").await.unwrap());
    }

    #[tokio::test]
    async fn test_per_entry_ttl() {
        let provider = make_provider();
        provider
            .set("short", "v", Duration::from_millis(200))
            .await
            .unwrap();
        provider
            .set("long", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(provider.exists("short").await.unwrap());

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(!provider.exists("short").await.unwrap());
        assert!(provider.exists("long").await.unwrap());
    }

    #[tokio::test]
    async fn test_scan_pages_through_all_matches() {
        let provider = make_provider();
        for i in 0..5 {
            provider
                .set(&format!("Session:7:s{i}"), "1", Duration::from_secs(60))
                .await
                .unwrap();
        }
        provider
            .set("Session:70:s0", "1", Duration::from_secs(60))
            .await
            .unwrap();

        let mut cursor = ScanCursor::Start;
        let mut seen = Vec::new();
        loop {
            let page = provider.scan("Session:7:*", cursor, 2).await.unwrap();
            assert!(page.keys.len() <= 2);
            // Deleting between pages must not make the scan skip keys.
            for key in &page.keys {
                provider.delete(key).await.unwrap();
            }
            seen.extend(page.keys);
            match page.next {
                Some(next) => cursor = next,
                None => break,
            }
        }

        seen.sort();
        assert_eq!(
            seen,
            vec![
                "Session:7:s0",
                "Session:7:s1",
                "Session:7:s2",
                "Session:7:s3",
                "Session:7:s4"
            ]
        );
        assert!(provider.exists("Session:70:s0").await.unwrap());
    }

    #[tokio::test]
    async fn test_entries_beyond_initial_capacity_are_kept() {
        let config = MemoryCacheConfig {
            initial_capacity: 16,
        };
        let provider = MemoryCacheProvider::new(&config, 60);
        for i in 0..2000 {
            provider
                .set(&format!("blacklist:tok-{i}"), "1", Duration::from_secs(600))
                .await
                .unwrap();
        }
        provider.cache.run_pending_tasks().await;

        for i in 0..2000 {
            assert!(provider.exists(&format!("blacklist:tok-{i}")).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_scan_skips_keys_outside_the_prefix() {
        let provider = make_provider();
        for i in 0..50 {
            provider
                .set(&format!("blacklist:tok-{i}"), "1", Duration::from_secs(60))
                .await
                .unwrap();
        }
        provider
            .set("Session:7:a", "1", Duration::from_secs(60))
            .await
            .unwrap();
        provider
            .set("Session:7:b", "1", Duration::from_secs(60))
            .await
            .unwrap();

        let first = provider.scan("Session:7:*", ScanCursor::Start, 1).await.unwrap();
        assert_eq!(first.keys, vec!["Session:7:a"]);
        let cursor = first.next.clone().unwrap();
        assert_eq!(cursor, ScanCursor::At("Session:7:a".to_string()));

        let second = provider.scan("Session:7:*", cursor, 1).await.unwrap();
        assert_eq!(second.keys, vec!["Session:7:b"]);
        assert!(second.next.is_none());
    }

    #[tokio::test]
    async fn test_scan_ignores_expired_keys() {
        let provider = make_provider();
        provider
            .set("Session:7:gone", "1", Duration::from_millis(50))
            .await
            .unwrap();
        provider
            .set("Session:7:kept", "1", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        let page = provider.scan("Session:7:*", ScanCursor::Start, 10).await.unwrap();
        assert_eq!(page.keys, vec!["Session:7:kept"]);
        assert!(page.next.is_none());
    }

    #[tokio::test]
    async fn test_index_follows_deletes_and_overwrites() {
        let provider = make_provider();
        provider
            .set("user:1", "a", Duration::from_secs(60))
            .await
            .unwrap();
        provider
            .set("user:1", "b", Duration::from_secs(60))
            .await
            .unwrap();
        provider.cache.run_pending_tasks().await;
        assert!(provider.index.contains("user:1"));

        provider.delete("user:1").await.unwrap();
        provider.cache.run_pending_tasks().await;
        assert!(!provider.index.contains("user:1"));
    }

    #[test]
    fn test_literal_prefix() {
        assert_eq!(literal_prefix("Session:7:*"), "Session:7:");
        assert_eq!(literal_prefix("*"), "");
        assert_eq!(literal_prefix("exact"), "exact");
    }

    #[test]
    fn test_glob_matches() {
        assert!(glob_matches("Session:7:*", "Session:7:abc"));
        assert!(!glob_matches("Session:7:*", "Session:70:abc"));
        assert!(glob_matches("user:*:x", "user:1:x"));
        assert!(glob_matches("exact", "exact"));
        assert!(!glob_matches("exact", "exactly"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let provider = make_provider();
        assert!(provider.health_check().await.unwrap());
    }
}
