//! User repository implementation.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use harbinger_core::error::{AppError, ErrorKind};
use harbinger_core::result::AppResult;
use harbinger_entity::user::{CreateUser, User};

use crate::store::UserStore;

/// PostgreSQL-backed user store.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
    /// Upper bound on a single query.
    query_timeout: Duration,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn bounded<T>(&self, query: impl Future<Output = AppResult<T>>) -> AppResult<T> {
        tokio::time::timeout(self.query_timeout, query).await?
    }
}

fn map_query_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        let unique = e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if unique {
            AppError::with_source(ErrorKind::Conflict, "Username or email already taken", e)
        } else {
            AppError::with_source(ErrorKind::StoreUnavailable, context, e)
        }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        self.bounded(async {
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_query_err("Failed to find user by id"))
        })
        .await
    }

    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        self.bounded(async {
            sqlx::query_as::<_, User>(
                "SELECT * FROM users WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1) \
                 ORDER BY (LOWER(username) = LOWER($1)) DESC LIMIT 1",
            )
            .bind(login)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_err("Failed to find user by login"))
        })
        .await
    }

    async fn create(&self, new_user: CreateUser) -> AppResult<User> {
        self.bounded(async {
            sqlx::query_as::<_, User>(
                "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING *",
            )
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_query_err("Failed to create user"))
        })
        .await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.bounded(async {
            sqlx::query_scalar::<_, i32>("SELECT 1")
                .fetch_one(&self.pool)
                .await
                .map(|one| one == 1)
                .map_err(map_query_err("User store health check failed"))
        })
        .await
    }
}
