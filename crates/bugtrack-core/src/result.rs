//! Convenience result type alias for Bugtrack.

use crate::error::AppError;

/// A specialized `Result` type for Bugtrack operations.
pub type AppResult<T> = Result<T, AppError>;
