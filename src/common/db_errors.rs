//! Database error categorization and message formatting
//!
//! Every repository call funnels its `DbErr` through [`format_db_error`] so the
//! service layer can decide between `Conflict`, `Unavailable` and friends
//! without string matching of its own.
//!
//! ```rust
//! use guardian::common::db_errors::*;
//! use sea_orm::DbErr;
//!
//! let err = DbErr::RecordNotFound("Investor not found".to_string());
//! let (kind, message) = format_db_error("find investor", &err);
//! assert_eq!(kind, DbErrorKind::NotFound);
//! assert_eq!(message, "find investor: record not found");
//! ```

use sea_orm::{ConnAcquireErr, DbErr, SqlErr};

/// Categories of database errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    /// Record not found (query returned no results)
    NotFound,

    /// Unique constraint violation
    UniqueViolation,

    /// Foreign key constraint violation
    ForeignKeyViolation,

    /// The store could not be reached
    ConnectionError,

    /// Query or acquire timeout
    Timeout,

    /// Transaction deadlock or busy database
    Deadlock,

    /// Unknown/other database error
    Unknown,
}

impl DbErrorKind {
    /// Categorize a sea_orm database error
    pub fn from_db_err(err: &DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => return Self::UniqueViolation,
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => return Self::ForeignKeyViolation,
            _ => {}
        }

        match err {
            DbErr::RecordNotFound(_) => Self::NotFound,
            DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => Self::Timeout,
            DbErr::ConnectionAcquire(_) => Self::ConnectionError,
            DbErr::Conn(msg) if msg.to_string().to_lowercase().contains("timeout") => {
                Self::Timeout
            }
            DbErr::Conn(_) => Self::ConnectionError,
            DbErr::Exec(_) | DbErr::Query(_) => {
                let msg_lower = err.to_string().to_lowercase();
                if msg_lower.contains("unique") || msg_lower.contains("duplicate") {
                    Self::UniqueViolation
                } else if msg_lower.contains("foreign key") {
                    Self::ForeignKeyViolation
                } else if msg_lower.contains("deadlock") || msg_lower.contains("database is locked")
                {
                    Self::Deadlock
                } else if msg_lower.contains("timeout") {
                    Self::Timeout
                } else if msg_lower.contains("pool closed")
                    || msg_lower.contains("connection refused")
                {
                    Self::ConnectionError
                } else {
                    Self::Unknown
                }
            }
            _ => Self::Unknown,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionError | Self::Timeout | Self::Deadlock)
    }
}

/// Format database error with operation context
///
/// Returns the categorized kind plus a message of the form
/// `"<operation>: <category>"`.
pub fn format_db_error(operation: &str, err: &DbErr) -> (DbErrorKind, String) {
    let kind = DbErrorKind::from_db_err(err);

    let message = match kind {
        DbErrorKind::NotFound => format!("{}: record not found", operation),
        DbErrorKind::UniqueViolation => format!("{}: duplicate key violation", operation),
        DbErrorKind::ForeignKeyViolation => {
            format!("{}: foreign key constraint violation", operation)
        }
        DbErrorKind::ConnectionError => format!("{}: database connection failed", operation),
        DbErrorKind::Timeout => format!("{}: query timeout", operation),
        DbErrorKind::Deadlock => format!("{}: transaction deadlock", operation),
        DbErrorKind::Unknown => format!("{}: database error - {}", operation, err),
    };

    (kind, message)
}
