//! Token blacklist and advisory session markers.

pub mod store;
pub mod sweep;

pub use store::{PurgeOutcome, RevocationStore};
pub use sweep::SessionSweep;
