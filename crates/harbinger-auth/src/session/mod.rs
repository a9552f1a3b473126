//! Login, logout and registration.

pub mod lifecycle;

pub use lifecycle::SessionLifecycle;
