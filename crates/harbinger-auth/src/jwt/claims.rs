//! JWT claims structure carried by every token.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JWT claims payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user's id.
    pub user_id: i64,
    /// Username for convenience.
    pub username: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issuing service.
    pub iss: String,
}

impl Claims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Returns the issue time as a `DateTime<Utc>`.
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Checks whether this token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Lifetime left at `now`, zero once expired.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        let remaining = self.exp - now.timestamp();
        if remaining > 0 {
            Duration::from_secs(remaining as u64)
        } else {
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_expiring_at(exp: i64) -> Claims {
        Claims {
            user_id: 1,
            username: "u".to_string(),
            iat: exp - 60,
            exp,
            iss: "harbinger".to_string(),
        }
    }

    #[test]
    fn test_remaining_at() {
        let now = Utc::now();
        let claims = claims_expiring_at(now.timestamp() + 90);
        assert_eq!(claims.remaining_at(now), Duration::from_secs(90));
        assert!(!claims.is_expired_at(now));
    }

    #[test]
    fn test_expiry_is_exclusive() {
        let now = Utc::now();
        let claims = claims_expiring_at(now.timestamp());
        assert!(claims.is_expired_at(now));
        assert_eq!(claims.remaining_at(now), Duration::ZERO);
    }
}
