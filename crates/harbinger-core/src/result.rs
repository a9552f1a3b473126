//! Convenience result type alias for Harbinger.

use crate::error::AppError;

/// A specialized `Result` type for Harbinger operations.
pub type AppResult<T> = Result<T, AppError>;
