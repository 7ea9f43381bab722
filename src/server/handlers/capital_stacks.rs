use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::database::entities::capital_stack_layers;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ApiJson, Caller};
use crate::services::capital_stack::{CapitalStackLayerPatch, CapitalStackView, NewCapitalStackLayer};

pub async fn get_capital_stack(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(project_id): Path<i32>,
) -> ApiResult<Json<CapitalStackView>> {
    Ok(Json(
        state
            .context
            .capital_stack()
            .get_capital_stack(&ctx, project_id)
            .await?,
    ))
}

pub async fn get_layer(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
) -> ApiResult<Json<capital_stack_layers::Model>> {
    Ok(Json(state.context.capital_stack().get_layer(&ctx, id).await?))
}

pub async fn create_layer(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    ApiJson(payload): ApiJson<NewCapitalStackLayer>,
) -> ApiResult<(StatusCode, Json<capital_stack_layers::Model>)> {
    let layer = state
        .context
        .capital_stack()
        .create_layer(&ctx, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(layer)))
}

pub async fn update_layer(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<CapitalStackLayerPatch>,
) -> ApiResult<Json<capital_stack_layers::Model>> {
    Ok(Json(
        state
            .context
            .capital_stack()
            .update_layer(&ctx, id, payload)
            .await?,
    ))
}

pub async fn delete_layer(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.context.capital_stack().delete_layer(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
