//! Lazy, resumable scan over a user's session markers.

use std::sync::Arc;

use harbinger_cache::CacheManager;
use harbinger_cache::keys;
use harbinger_core::result::AppResult;
use harbinger_core::traits::cache::{CacheProvider, ScanCursor};

/// A lazy sequence of batches of session marker keys for one user.
///
/// Each call to [`next_batch`](Self::next_batch) performs one scan round
/// trip. The cursor only advances on success, so a failed round trip can be
/// retried by calling `next_batch` again, and a sweep interrupted between
/// batches can be picked up later with [`resume`](Self::resume).
#[derive(Debug)]
pub struct SessionSweep {
    cache: Arc<CacheManager>,
    pattern: String,
    batch_size: usize,
    /// `None` once the scan has wrapped around.
    cursor: Option<ScanCursor>,
}

impl SessionSweep {
    pub(crate) fn new(cache: Arc<CacheManager>, user_id: i64, batch_size: usize) -> Self {
        Self::resume(cache, user_id, batch_size, ScanCursor::Start)
    }

    /// Continue a sweep from a cursor previously returned by
    /// [`position`](Self::position).
    pub fn resume(
        cache: Arc<CacheManager>,
        user_id: i64,
        batch_size: usize,
        cursor: ScanCursor,
    ) -> Self {
        Self {
            cache,
            pattern: keys::user_sessions_pattern(user_id),
            batch_size: batch_size.max(1),
            cursor: Some(cursor),
        }
    }

    /// Where the next round trip will start, or `None` when exhausted.
    pub fn position(&self) -> Option<&ScanCursor> {
        self.cursor.as_ref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_none()
    }

    /// Fetch the next batch of keys. `Ok(None)` once the sweep is finished.
    ///
    /// A batch may be empty while the scan is still in progress.
    pub async fn next_batch(&mut self) -> AppResult<Option<Vec<String>>> {
        let Some(cursor) = self.cursor.clone() else {
            return Ok(None);
        };

        let page = self
            .cache
            .scan(&self.pattern, cursor, self.batch_size)
            .await?;
        self.cursor = page.next;
        Ok(Some(page.keys))
    }
}
