//! In-process user store backed by `DashMap`.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use harbinger_core::error::AppError;
use harbinger_core::result::AppResult;
use harbinger_entity::user::{CreateUser, User};

use crate::store::UserStore;

/// User store held in process memory. Selected with `database.url = "memory"`.
#[derive(Debug, Clone)]
pub struct MemoryUserStore {
    users: Arc<DashMap<i64, User>>,
    /// Lowercased username -> id.
    usernames: Arc<DashMap<String, i64>>,
    /// Lowercased email -> id.
    emails: Arc<DashMap<String, i64>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            usernames: Arc::new(DashMap::new()),
            emails: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Insert a fully-formed user, keeping its id. Used to seed fixtures.
    pub fn insert(&self, user: User) -> AppResult<()> {
        self.claim_names(user.id, &user.username, &user.email)?;
        self.next_id.fetch_max(user.id + 1, Ordering::SeqCst);
        self.users.insert(user.id, user);
        Ok(())
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Reserve the username and email indexes for `id`, releasing the
    /// username again if the email turns out to be taken.
    fn claim_names(&self, id: i64, username: &str, email: &str) -> AppResult<()> {
        let username_key = username.to_lowercase();
        match self.usernames.entry(username_key.clone()) {
            Entry::Occupied(_) => return Err(AppError::conflict("Username already taken")),
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        match self.emails.entry(email.to_lowercase()) {
            Entry::Occupied(_) => {
                self.usernames.remove(&username_key);
                Err(AppError::conflict("Email already registered"))
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let key = login.to_lowercase();
        let id = self
            .usernames
            .get(&key)
            .or_else(|| self.emails.get(&key))
            .map(|entry| *entry.value());

        Ok(id.and_then(|id| self.users.get(&id).map(|entry| entry.value().clone())))
    }

    async fn create(&self, new_user: CreateUser) -> AppResult<User> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.claim_names(id, &new_user.username, &new_user.email)?;

        let now = Utc::now();
        let user = User {
            id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
