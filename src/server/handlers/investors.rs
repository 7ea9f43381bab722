use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::database::entities::investors::{self, EntityType, InvestmentStage};
use crate::database::entities::project_investors;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ApiJson, ApiQuery, Caller};
use crate::services::investor_service::{
    InvestmentPatch, InvestorFilter, InvestorPatch, InvestorProfile, InvestorSummary, NewInvestment,
    NewInvestor, ProjectInvestment,
};
use crate::services::PageRequest;

#[derive(Debug, Default, Deserialize)]
pub struct ListInvestorsQuery {
    pub stage: Option<InvestmentStage>,
    pub entity_type: Option<EntityType>,
    pub include_inactive: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_investors(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    ApiQuery(query): ApiQuery<ListInvestorsQuery>,
) -> ApiResult<Json<Vec<InvestorSummary>>> {
    let filter = InvestorFilter {
        stage: query.stage,
        entity_type: query.entity_type,
        include_inactive: query.include_inactive,
    };
    let investors = state
        .context
        .investors()
        .list_investors(&ctx, filter, PageRequest::new(query.limit, query.offset))
        .await?;
    Ok(Json(investors))
}

pub async fn get_investor(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
) -> ApiResult<Json<InvestorSummary>> {
    Ok(Json(state.context.investors().get_investor(&ctx, id).await?))
}

pub async fn get_investor_full_profile(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
) -> ApiResult<Json<InvestorProfile>> {
    Ok(Json(
        state
            .context
            .investors()
            .get_investor_full_profile(&ctx, id)
            .await?,
    ))
}

pub async fn create_investor(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    ApiJson(payload): ApiJson<NewInvestor>,
) -> ApiResult<(StatusCode, Json<investors::Model>)> {
    let investor = state
        .context
        .investors()
        .create_investor(&ctx, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(investor)))
}

pub async fn update_investor(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<InvestorPatch>,
) -> ApiResult<Json<investors::Model>> {
    Ok(Json(
        state
            .context
            .investors()
            .update_investor(&ctx, id, payload)
            .await?,
    ))
}

pub async fn deactivate_investor(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
) -> ApiResult<Json<investors::Model>> {
    Ok(Json(
        state
            .context
            .investors()
            .deactivate_investor(&ctx, id)
            .await?,
    ))
}

pub async fn list_project_investors(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(project_id): Path<i32>,
) -> ApiResult<Json<Vec<ProjectInvestment>>> {
    Ok(Json(
        state
            .context
            .investors()
            .list_project_investors(&ctx, project_id)
            .await?,
    ))
}

pub async fn record_investment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(project_id): Path<i32>,
    ApiJson(payload): ApiJson<NewInvestment>,
) -> ApiResult<(StatusCode, Json<project_investors::Model>)> {
    let link = state
        .context
        .investors()
        .record_investment(&ctx, project_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn update_investment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<InvestmentPatch>,
) -> ApiResult<Json<project_investors::Model>> {
    Ok(Json(
        state
            .context
            .investors()
            .update_investment(&ctx, id, payload)
            .await?,
    ))
}
