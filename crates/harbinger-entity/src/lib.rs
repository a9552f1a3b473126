//! # harbinger-entity
//!
//! Domain entity models for Harbinger. Database entities derive
//! `sqlx::FromRow` in addition to `Serialize`/`Deserialize`.

pub mod user;
