use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use base64::Engine;
use serde::Deserialize;

use crate::database::entities::documents::{self, AccessLevel, DocumentType};
use crate::errors::CoreError;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ApiJson, ApiQuery, Caller};
use crate::services::document_service::{DocumentFilter, DocumentRef, DownloadUrl, UploadDocument};
use crate::services::PageRequest;

/// Upload payload; the file travels base64-encoded.
#[derive(Debug, Deserialize)]
pub struct UploadDocumentRequest {
    pub project_id: Option<i32>,
    pub title: String,
    pub document_type: DocumentType,
    pub access_level: Option<AccessLevel>,
    pub content_type: Option<String>,
    pub file_base64: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub previous_version_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListDocumentsQuery {
    pub project_id: Option<i32>,
    pub access_level: Option<AccessLevel>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn upload_document(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    ApiJson(payload): ApiJson<UploadDocumentRequest>,
) -> ApiResult<(StatusCode, Json<DocumentRef>)> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.file_base64.trim())
        .map_err(|e| CoreError::invalid_field("file_base64", format!("invalid base64: {}", e)))?;

    let upload = UploadDocument {
        project_id: payload.project_id,
        title: payload.title,
        document_type: payload.document_type,
        access_level: payload.access_level,
        content_type: payload.content_type,
        bytes,
        description: payload.description,
        tags: payload.tags,
        previous_version_id: payload.previous_version_id,
    };

    let document = state
        .context
        .documents()
        .upload_document(&ctx, upload)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn list_all_documents(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    ApiQuery(query): ApiQuery<ListDocumentsQuery>,
) -> ApiResult<Json<Vec<documents::Model>>> {
    let filter = DocumentFilter {
        project_id: query.project_id,
        access_level: query.access_level,
    };
    Ok(Json(
        state
            .context
            .documents()
            .list_all_documents(&ctx, filter, PageRequest::new(query.limit, query.offset))
            .await?,
    ))
}

pub async fn list_project_documents(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(project_id): Path<i32>,
) -> ApiResult<Json<Vec<DocumentRef>>> {
    Ok(Json(
        state
            .context
            .documents()
            .list_project_documents(&ctx, project_id)
            .await?,
    ))
}

pub async fn get_download_url(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
) -> ApiResult<Json<DownloadUrl>> {
    Ok(Json(
        state
            .context
            .documents()
            .get_download_url(&ctx, id)
            .await?,
    ))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.context.documents().delete_document(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
