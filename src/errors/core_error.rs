use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use sea_orm::DbErr;

use crate::common::db_errors::{format_db_error, DbErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreErrorKind {
    NotFound,
    InvalidInput,
    Conflict,
    Unauthorized,
    Unavailable,
    Internal,
}

impl CoreErrorKind {
    /// Stable machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            CoreErrorKind::NotFound => "NOT_FOUND",
            CoreErrorKind::InvalidInput => "INVALID_INPUT",
            CoreErrorKind::Conflict => "CONFLICT",
            CoreErrorKind::Unauthorized => "UNAUTHORIZED",
            CoreErrorKind::Unavailable => "UNAVAILABLE",
            CoreErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreErrorKind::Unavailable)
    }
}

#[derive(Debug)]
pub struct CoreError {
    kind: CoreErrorKind,
    message: String,
    fields: Option<BTreeMap<String, String>>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: None,
            source: None,
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        let entity = entity.into();
        let mut fields = BTreeMap::new();
        fields.insert("entity".to_string(), entity.clone());
        fields.insert("id".to_string(), id.into());

        Self {
            kind: CoreErrorKind::NotFound,
            message: format!("{} not found", entity),
            fields: Some(fields),
            source: None,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::InvalidInput, message)
    }

    /// Validation failure tied to a single request field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("field".to_string(), field.into());
        Self::new(CoreErrorKind::InvalidInput, message).with_fields(fields)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Conflict, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Unauthorized, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Unavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Internal, message)
    }

    /// Categorize a database error raised while performing `operation`.
    pub fn from_db(operation: &str, err: DbErr) -> Self {
        let (db_kind, message) = format_db_error(operation, &err);
        let kind = match db_kind {
            DbErrorKind::NotFound => CoreErrorKind::NotFound,
            DbErrorKind::UniqueViolation => CoreErrorKind::Conflict,
            DbErrorKind::ForeignKeyViolation => CoreErrorKind::InvalidInput,
            DbErrorKind::ConnectionError | DbErrorKind::Timeout | DbErrorKind::Deadlock => {
                CoreErrorKind::Unavailable
            }
            DbErrorKind::Unknown => CoreErrorKind::Internal,
        };
        Self::new(kind, message).with_source(err)
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> CoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        self.fields.as_ref()
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl StdError for CoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;

    #[test]
    fn not_found_carries_entity_fields() {
        let err = CoreError::not_found("Project", "42");
        assert_eq!(err.kind(), CoreErrorKind::NotFound);
        assert_eq!(err.message(), "Project not found");
        let fields = err.fields().expect("fields");
        assert_eq!(fields.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn connection_failures_map_to_unavailable() {
        let err = CoreError::from_db(
            "list projects",
            DbErr::Conn(RuntimeErr::Internal("connection refused".to_string())),
        );
        assert_eq!(err.kind(), CoreErrorKind::Unavailable);
        assert!(err.kind().is_retryable());

        let err = CoreError::from_db(
            "list investors",
            DbErr::ConnectionAcquire(sea_orm::ConnAcquireErr::ConnectionClosed),
        );
        assert_eq!(err.kind(), CoreErrorKind::Unavailable);
    }

    #[test]
    fn unique_violations_map_to_conflict() {
        let err = CoreError::from_db(
            "create project",
            DbErr::Exec(RuntimeErr::Internal(
                "UNIQUE constraint failed: projects.slug".to_string(),
            )),
        );
        assert_eq!(err.kind(), CoreErrorKind::Conflict);
        assert_eq!(err.message(), "create project: duplicate key violation");
    }
}
