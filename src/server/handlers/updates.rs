use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::database::entities::project_updates;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ApiJson, ApiQuery, Caller};
use crate::services::project_update_service::{NewProjectUpdate, RecentUpdate};
use crate::services::PageRequest;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u64>,
}

pub async fn list_project_updates(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(project_id): Path<i32>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Vec<project_updates::Model>>> {
    Ok(Json(
        state
            .context
            .updates()
            .list_project_updates(&ctx, project_id, PageRequest::new(query.limit, query.offset))
            .await?,
    ))
}

pub async fn list_recent_public_updates(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    ApiQuery(query): ApiQuery<RecentQuery>,
) -> ApiResult<Json<Vec<RecentUpdate>>> {
    Ok(Json(
        state
            .context
            .updates()
            .list_recent_public_updates(&ctx, query.limit)
            .await?,
    ))
}

pub async fn create_project_update(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(project_id): Path<i32>,
    ApiJson(payload): ApiJson<NewProjectUpdate>,
) -> ApiResult<(StatusCode, Json<project_updates::Model>)> {
    let update = state
        .context
        .updates()
        .create_project_update(&ctx, project_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(update)))
}
