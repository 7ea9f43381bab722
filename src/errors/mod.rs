//! Error types shared by every service.
//!
//! Services return [`CoreResult`]; the kind of a [`CoreError`] decides how the
//! HTTP layer answers and whether a read path may degrade.
//!
//! ```rust
//! use guardian::errors::{CoreError, CoreErrorKind};
//!
//! let err = CoreError::not_found("Project", "7");
//! assert_eq!(err.kind(), CoreErrorKind::NotFound);
//! ```

pub mod core_error;
pub mod storage;

pub use core_error::{CoreError, CoreErrorKind};
pub use storage::StorageError;

pub type CoreResult<T> = Result<T, CoreError>;

/// Turn an unreachable store on a read path into an empty result.
///
/// Any other error kind is passed through untouched.
pub fn degrade_read<T: Default>(operation: &str, result: CoreResult<T>) -> CoreResult<T> {
    match result {
        Err(err) if err.kind() == CoreErrorKind::Unavailable => {
            tracing::warn!(operation, error = %err, "store unavailable, returning empty result");
            Ok(T::default())
        }
        other => other,
    }
}
