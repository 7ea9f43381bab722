use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::database::entities::projects::{self, ProjectStatus, ProjectType};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ApiJson, ApiQuery, Caller};
use crate::services::project_service::{NewProject, ProjectDetail, ProjectFilter, ProjectPatch};
use crate::services::PageRequest;

#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsQuery {
    pub status: Option<ProjectStatus>,
    #[serde(rename = "type")]
    pub project_type: Option<ProjectType>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    ApiQuery(query): ApiQuery<ListProjectsQuery>,
) -> ApiResult<Json<Vec<projects::Model>>> {
    let filter = ProjectFilter {
        status: query.status,
        project_type: query.project_type,
    };
    let projects = state
        .context
        .projects()
        .list_projects(&ctx, filter, PageRequest::new(query.limit, query.offset))
        .await?;
    Ok(Json(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
) -> ApiResult<Json<ProjectDetail>> {
    Ok(Json(state.context.projects().get_project(&ctx, id).await?))
}

pub async fn get_project_by_slug(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(slug): Path<String>,
) -> ApiResult<Json<ProjectDetail>> {
    Ok(Json(
        state
            .context
            .projects()
            .get_project_by_slug(&ctx, &slug)
            .await?,
    ))
}

pub async fn get_project_full_details(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
) -> ApiResult<Json<ProjectDetail>> {
    Ok(Json(
        state
            .context
            .projects()
            .get_project_full_details(&ctx, id)
            .await?,
    ))
}

pub async fn create_project(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    ApiJson(payload): ApiJson<NewProject>,
) -> ApiResult<(StatusCode, Json<projects::Model>)> {
    let project = state.context.projects().create_project(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update_project(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<ProjectPatch>,
) -> ApiResult<Json<projects::Model>> {
    Ok(Json(
        state
            .context
            .projects()
            .update_project(&ctx, id, payload)
            .await?,
    ))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.context.projects().delete_project(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
