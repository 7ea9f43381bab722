use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ApiJson, Caller};
use crate::services::investor_notice_service::{
    CapitalCallNotice, DistributionNotice, MilestoneNotice, NoticeReceipt,
};

pub async fn send_milestone(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(project_id): Path<i32>,
    ApiJson(notice): ApiJson<MilestoneNotice>,
) -> ApiResult<Json<NoticeReceipt>> {
    Ok(Json(
        state
            .context
            .notices()
            .send_milestone(&ctx, project_id, notice)
            .await?,
    ))
}

pub async fn send_capital_call(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(project_id): Path<i32>,
    ApiJson(notice): ApiJson<CapitalCallNotice>,
) -> ApiResult<Json<NoticeReceipt>> {
    Ok(Json(
        state
            .context
            .notices()
            .send_capital_call(&ctx, project_id, notice)
            .await?,
    ))
}

pub async fn send_distribution(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(project_id): Path<i32>,
    ApiJson(notice): ApiJson<DistributionNotice>,
) -> ApiResult<Json<NoticeReceipt>> {
    Ok(Json(
        state
            .context
            .notices()
            .send_distribution(&ctx, project_id, notice)
            .await?,
    ))
}

pub async fn send_document_notice(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(document_id): Path<i32>,
) -> ApiResult<Json<NoticeReceipt>> {
    Ok(Json(
        state
            .context
            .notices()
            .send_document_notice(&ctx, document_id)
            .await?,
    ))
}
