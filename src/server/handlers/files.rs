use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Deserialize;

use crate::database::entities::documents;
use crate::errors::CoreError;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::ApiQuery;

#[derive(Debug, Default, Deserialize)]
pub struct SignatureQuery {
    pub expires: Option<i64>,
    pub signature: Option<String>,
}

/// Serve a stored object behind a valid, unexpired signature.
pub async fn serve_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
    ApiQuery(query): ApiQuery<SignatureQuery>,
) -> ApiResult<impl IntoResponse> {
    let (Some(expires), Some(signature)) = (query.expires, query.signature) else {
        return Err(CoreError::unauthorized("access denied").into());
    };

    let store = state.context.store();
    store.verify(&key, expires, &signature)?;
    let bytes = store.get(&key).await?;

    let content_type = documents::Entity::find()
        .filter(documents::Column::StorageKey.eq(key.as_str()))
        .one(state.context.db())
        .await
        .ok()
        .flatten()
        .and_then(|document| document.file_type)
        .and_then(|file_type| HeaderValue::from_str(&file_type).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, content_type);

    Ok((headers, bytes))
}
