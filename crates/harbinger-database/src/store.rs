//! Persistent user store abstraction.

use async_trait::async_trait;

use harbinger_core::result::AppResult;
use harbinger_entity::user::{CreateUser, User};

/// Authoritative user records, reachable by id or by login name.
///
/// Implementations bound each call with their own deadline and report an
/// unreachable backend as `StoreUnavailable`.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Find a user whose username or email matches `login` (case-insensitive).
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>>;

    /// Insert a new user. Duplicate usernames or emails fail with `Conflict`.
    async fn create(&self, new_user: CreateUser) -> AppResult<User>;

    /// Whether the backing store answers within its deadline.
    async fn health_check(&self) -> AppResult<bool>;
}
