//! User domain entities.

pub mod model;
pub mod profile;

pub use model::{CreateUser, User};
pub use profile::UserProfile;
