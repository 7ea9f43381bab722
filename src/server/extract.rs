//! Request extractors: caller identity and JSON/query bodies whose rejections
//! are reported as `InvalidInput`.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header, request::Parts, HeaderMap, Method},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::auth::{Actor, RequestContext};
use crate::errors::{CoreError, CoreErrorKind};
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// The resolved caller of a request.
pub struct Caller(pub RequestContext);

fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, CoreError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| CoreError::unauthorized("access denied"))?;
    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        _ => Err(CoreError::unauthorized("access denied")),
    }
}

fn is_read(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

fn origin_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let actor = match state
            .context
            .authorization()
            .resolve_actor(token.as_deref())
            .await
        {
            Ok(actor) => actor,
            // Reads still reach their handlers (and degrade there) while the
            // session store is down; writes surface the outage.
            Err(err) if err.kind() == CoreErrorKind::Unavailable && is_read(&parts.method) => {
                warn!(error = %err, method = %parts.method, "session lookup unavailable, serving read anonymously");
                Actor::anonymous()
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Caller(RequestContext::new(actor).with_origin(
            origin_ip(&parts.headers),
            user_agent(&parts.headers),
        )))
    }
}

/// `Json<T>` with rejections mapped to `InvalidInput`.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(CoreError::invalid_input(rejection.body_text()).into()),
        }
    }
}

/// `Query<T>` with rejections mapped to `InvalidInput`.
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(CoreError::invalid_input(rejection.body_text()).into()),
        }
    }
}
