//! # harbinger-auth
//!
//! The authentication and session core of Harbinger.
//!
//! ## Modules
//!
//! - `jwt`: token issuance and verification ([`TokenCodec`])
//! - `revocation`: logout blacklist and advisory session markers ([`RevocationStore`])
//! - `profile`: cache-aside user profile reads ([`ProfileCache`])
//! - `gate`: per-request admission decision ([`AuthGate`])
//! - `session`: login, logout, and registration ([`SessionLifecycle`])
//! - `password`: Argon2id password hashing

pub mod gate;
pub mod jwt;
pub mod password;
pub mod profile;
pub mod revocation;
pub mod session;

pub use gate::{AuthContext, AuthGate};
pub use jwt::{Claims, IssuedToken, TokenCodec};
pub use password::PasswordHasher;
pub use profile::ProfileCache;
pub use revocation::{PurgeOutcome, RevocationStore, SessionSweep};
pub use session::SessionLifecycle;
