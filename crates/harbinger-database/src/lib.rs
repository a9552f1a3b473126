//! # harbinger-database
//!
//! The [`UserStore`] collaborator trait and its two implementations:
//! a PostgreSQL repository (sqlx) behind a migrated, deadline-bounded pool,
//! and an in-process store for single-node deployments and tests.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryUserStore;
pub use repositories::user::UserRepository;
pub use store::UserStore;
