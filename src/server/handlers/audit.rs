use axum::{extract::State, response::Json};
use serde::Deserialize;

use crate::database::entities::audit_logs;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ApiQuery, Caller};
use crate::services::audit_service::AuditLogFilter;
use crate::services::PageRequest;

#[derive(Debug, Default, Deserialize)]
pub struct ListAuditLogsQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_audit_logs(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    ApiQuery(query): ApiQuery<ListAuditLogsQuery>,
) -> ApiResult<Json<Vec<audit_logs::Model>>> {
    let filter = AuditLogFilter {
        entity_type: query.entity_type,
        entity_id: query.entity_id,
    };
    Ok(Json(
        state
            .context
            .audit()
            .list_entries(&ctx, filter, PageRequest::new(query.limit, query.offset))
            .await?,
    ))
}
