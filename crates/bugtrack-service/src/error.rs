//! Failure taxonomy of the bug lifecycle.

use thiserror::Error;

use bugtrack_core::error::AppError;

use crate::activity::LogContractViolation;

/// Why a lifecycle operation did not complete.
///
/// The `Display` text is what callers show to users, so the permission and
/// duplicate-delete messages are fixed strings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    /// Missing or malformed arguments.
    #[error("{0}")]
    Validation(String),

    /// The actor is neither the owner nor an admin.
    #[error("Permission denied")]
    Permission,

    /// A delete for the same bug is running or already completed.
    #[error("Delete already in progress")]
    AlreadyInProgress,

    /// The snapshot insert failed; nothing was deleted.
    #[error("Failed to snapshot bug: {}", .0.message)]
    Snapshot(AppError),

    /// The audit store rejected the row.
    #[error("Failed to record activity: {0}")]
    LogStore(String),

    /// The audit contract was violated by the caller.
    #[error(transparent)]
    Contract(#[from] LogContractViolation),

    /// The relational update failed; nothing was logged.
    #[error("Failed to update bug: {}", .0.message)]
    Update(AppError),

    /// The relational delete failed or removed nothing.
    #[error("Failed to delete bug: {}", .0.message)]
    Delete(AppError),

    /// Image cleanup failed after the bug was deleted. Never fatal.
    #[error("Failed to clean up bug images: {0}")]
    Cleanup(String),
}

impl LifecycleError {
    /// Whether this error stopped the operation (every kind except cleanup).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Cleanup(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_visible_messages() {
        assert_eq!(LifecycleError::Permission.to_string(), "Permission denied");
        assert_eq!(
            LifecycleError::AlreadyInProgress.to_string(),
            "Delete already in progress"
        );
        assert_eq!(
            LifecycleError::Delete(AppError::database("timeout")).to_string(),
            "Failed to delete bug: timeout"
        );
        assert!(!LifecycleError::Cleanup("x".into()).is_fatal());
        assert!(LifecycleError::Snapshot(AppError::database("x")).is_fatal());
    }
}
