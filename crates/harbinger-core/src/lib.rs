//! # harbinger-core
//!
//! Core crate for Harbinger. Contains the unified error system, configuration
//! schemas, credential redaction for logs, and the cache provider trait
//! implemented by `harbinger-cache`.
//!
//! This crate has **no** internal dependencies on other Harbinger crates.

pub mod config;
pub mod error;
pub mod redact;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
