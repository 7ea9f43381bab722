//! Object storage error types
//!
//! ```rust
//! use guardian::errors::{CoreError, CoreErrorKind, StorageError};
//!
//! let err: CoreError = StorageError::NotFound("documents/1/x".to_string()).into();
//! assert_eq!(err.kind(), CoreErrorKind::NotFound);
//! ```

use thiserror::Error;

use super::{CoreError, CoreErrorKind};

#[derive(Error, Debug)]
pub enum StorageError {
    /// Key is empty, absolute, or walks out of the storage root
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    /// Signature does not match or has expired
    #[error("Invalid or expired signature")]
    InvalidSignature,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn kind(&self) -> CoreErrorKind {
        match self {
            StorageError::InvalidKey(_) => CoreErrorKind::InvalidInput,
            StorageError::NotFound(_) => CoreErrorKind::NotFound,
            StorageError::InvalidSignature => CoreErrorKind::Unauthorized,
            StorageError::Io(_) => CoreErrorKind::Unavailable,
        }
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => CoreError::not_found("Object", key),
            StorageError::InvalidKey(_) => CoreError::invalid_field("key", err.to_string()),
            StorageError::InvalidSignature => CoreError::unauthorized("access denied"),
            StorageError::Io(_) => CoreError::new(err.kind(), err.to_string()).with_source(err),
        }
    }
}
