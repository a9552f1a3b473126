//! Cache key builders for every Harbinger cache entry.
//!
//! Identifiers are formatted with their exact integer `Display`, so distinct
//! ids can never alias to the same key.

/// Value stored under a blacklisted token.
pub const BLACKLIST_MARKER: &str = "blacklisted";

/// Namespace of the advisory session markers.
const SESSION_NAMESPACE: &str = "Session";

/// Namespace of the cached user profiles.
const USER_NAMESPACE: &str = "user";

// ── Revocation keys ────────────────────────────────────────

/// Blacklist entries are keyed by the exact token string.
pub fn blacklisted_token(token: &str) -> String {
    token.to_string()
}

// ── Session keys ───────────────────────────────────────────

/// Cache key for one advisory session marker.
pub fn session_marker(user_id: i64, session_id: &str) -> String {
    format!("{SESSION_NAMESPACE}:{user_id}:{session_id}")
}

/// Pattern matching every session marker of a user.
pub fn user_sessions_pattern(user_id: i64) -> String {
    format!("{SESSION_NAMESPACE}:{user_id}:*")
}

// ── User keys ──────────────────────────────────────────────

/// Cache key for a serialized user profile.
pub fn user_profile(user_id: i64) -> String {
    format!("{USER_NAMESPACE}:{user_id}")
}
