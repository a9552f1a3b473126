//! Core traits defined in `harbinger-core` and implemented by other crates.

pub mod cache;

pub use cache::{CacheProvider, ScanCursor, ScanPage};
