//! Cache-aside user profile reads.

pub mod cache;

pub use cache::ProfileCache;
