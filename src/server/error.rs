use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::errors::{CoreError, CoreErrorKind};

/// Service error rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub fn status_for(kind: CoreErrorKind) -> StatusCode {
    match kind {
        CoreErrorKind::NotFound => StatusCode::NOT_FOUND,
        CoreErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        CoreErrorKind::Conflict => StatusCode::CONFLICT,
        CoreErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        CoreErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        CoreErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);

        // Denials never describe the resource.
        if kind == CoreErrorKind::Unauthorized {
            return (
                status,
                Json(json!({ "error": "access denied", "code": kind.code() })),
            )
                .into_response();
        }

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        let mut body = json!({
            "error": self.0.message(),
            "code": kind.code(),
        });
        if let Some(fields) = self.0.fields() {
            body["fields"] = json!(fields);
        }
        if kind.is_retryable() {
            body["retryable"] = json!(true);
        }

        (status, Json(body)).into_response()
    }
}
