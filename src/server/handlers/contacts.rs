use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::database::entities::investor_contacts::{self, ContactStatus};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ApiJson, ApiQuery, Caller};
use crate::services::contact_service::{ContactFilter, ContactPatch, NewContact};
use crate::services::PageRequest;

#[derive(Debug, Default, Deserialize)]
pub struct ListContactsQuery {
    pub status: Option<ContactStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn create_contact(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    ApiJson(payload): ApiJson<NewContact>,
) -> ApiResult<(StatusCode, Json<investor_contacts::Model>)> {
    let contact = state
        .context
        .contacts()
        .create_contact(&ctx, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn list_contacts(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    ApiQuery(query): ApiQuery<ListContactsQuery>,
) -> ApiResult<Json<Vec<investor_contacts::Model>>> {
    let filter = ContactFilter {
        status: query.status,
    };
    Ok(Json(
        state
            .context
            .contacts()
            .list_contacts(&ctx, filter, PageRequest::new(query.limit, query.offset))
            .await?,
    ))
}

pub async fn update_contact(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<ContactPatch>,
) -> ApiResult<Json<investor_contacts::Model>> {
    Ok(Json(
        state
            .context
            .contacts()
            .update_contact(&ctx, id, payload)
            .await?,
    ))
}
