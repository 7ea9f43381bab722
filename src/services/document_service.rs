use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{tier_satisfied, Authorizer, Operation, RequestContext};
use crate::database::entities::documents::{self, AccessLevel, DocumentType};
use crate::database::entities::{encode_list, projects};
use crate::errors::{degrade_read, CoreError, CoreResult};
use crate::services::audit_service::{AuditEvent, AuditService};
use crate::services::investor_notice_service::InvestorNoticeService;
use crate::services::pagination::{Page, PageRequest};
use crate::services::ValidationService;
use crate::storage::{document_key, ObjectStore};

/// Document metadata without any storage location.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentRef {
    pub id: i32,
    pub project_id: Option<i32>,
    pub title: String,
    pub document_type: String,
    pub access_level: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub version: i32,
    pub previous_version_id: Option<i32>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<documents::Model> for DocumentRef {
    fn from(model: documents::Model) -> Self {
        let tags = model.tags();
        Self {
            id: model.id,
            project_id: model.project_id,
            title: model.title,
            document_type: model.document_type,
            access_level: model.access_level,
            file_size: model.file_size,
            file_type: model.file_type,
            version: model.version,
            previous_version_id: model.previous_version_id,
            description: model.description,
            tags,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct UploadDocument {
    pub project_id: Option<i32>,
    pub title: String,
    pub document_type: DocumentType,
    pub access_level: Option<AccessLevel>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub previous_version_id: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DownloadUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
    pub title: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DocumentFilter {
    pub project_id: Option<i32>,
    pub access_level: Option<AccessLevel>,
}

#[derive(Clone)]
pub struct DocumentService {
    db: DatabaseConnection,
    authorizer: Arc<dyn Authorizer>,
    audit: AuditService,
    store: Arc<dyn ObjectStore>,
    notices: InvestorNoticeService,
    download_ttl: chrono::Duration,
}

impl DocumentService {
    pub fn new(
        db: DatabaseConnection,
        authorizer: Arc<dyn Authorizer>,
        audit: AuditService,
        store: Arc<dyn ObjectStore>,
        notices: InvestorNoticeService,
        download_ttl: chrono::Duration,
    ) -> Self {
        Self {
            db,
            authorizer,
            audit,
            store,
            notices,
            download_ttl,
        }
    }

    async fn find_document(&self, document_id: i32) -> CoreResult<documents::Model> {
        documents::Entity::find_by_id(document_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find document", e))?
            .ok_or_else(|| CoreError::not_found("Document", document_id.to_string()))
    }

    pub async fn upload_document(
        &self,
        ctx: &RequestContext,
        input: UploadDocument,
    ) -> CoreResult<DocumentRef> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageDocuments)?;

        let title = ValidationService::validate_name("title", &input.title)?;
        ValidationService::validate_upload(&input.bytes)?;

        let project = match input.project_id {
            Some(project_id) => Some(
                projects::Entity::find_by_id(project_id)
                    .one(&self.db)
                    .await
                    .map_err(|e| CoreError::from_db("find project", e))?
                    .ok_or_else(|| CoreError::not_found("Project", project_id.to_string()))?,
            ),
            None => None,
        };

        let version = match input.previous_version_id {
            Some(previous_id) => {
                let previous = self.find_document(previous_id).await?;
                if previous.project_id != input.project_id {
                    return Err(CoreError::invalid_field(
                        "previous_version_id",
                        "previous version belongs to a different project",
                    ));
                }
                previous.version + 1
            }
            None => 1,
        };

        let key = document_key(input.project_id, &ValidationService::slugify(&title));
        let stored = self
            .store
            .put(&key, &input.bytes, input.content_type.as_deref())
            .await?;

        let mut document = documents::ActiveModel::new(input.project_id);
        document.title = Set(title);
        document.document_type = Set(input.document_type.as_str().to_string());
        if let Some(level) = input.access_level {
            document.access_level = Set(level.as_str().to_string());
        }
        document.file_url = Set(stored.url.clone());
        document.storage_key = Set(stored.key.clone());
        document.file_size = Set(Some(stored.size as i64));
        document.file_type = Set(input.content_type);
        document.version = Set(version);
        document.previous_version_id = Set(input.previous_version_id);
        document.description = Set(input.description);
        document.tags = Set(encode_list(&input.tags));

        let document = match document.insert(&self.db).await {
            Ok(document) => document,
            Err(err) => {
                if let Err(cleanup) = self.store.delete(&stored.key).await {
                    warn!(key = %stored.key, error = %cleanup, "failed to remove orphaned object");
                }
                return Err(CoreError::from_db("create document", err));
            }
        };

        self.audit
            .record(
                ctx,
                AuditEvent::new("UPLOAD_DOCUMENT", "document", document.id).after(&document),
            )
            .await;

        if let Some(project) = &project {
            if let Err(err) = self.notices.announce_document(project, &document).await {
                warn!(document_id = document.id, error = %err, "failed to announce document");
            }
        }

        info!(document_id = document.id, version, "uploaded document");
        Ok(document.into())
    }

    /// Documents of a project the caller's tier can reach.
    pub async fn list_project_documents(
        &self,
        ctx: &RequestContext,
        project_id: i32,
    ) -> CoreResult<Vec<DocumentRef>> {
        self.authorizer.authorize(&ctx.actor, Operation::ReadPublic)?;

        let result = documents::Entity::find()
            .filter(documents::Column::ProjectId.eq(project_id))
            .order_by_desc(documents::Column::CreatedAt)
            .order_by_desc(documents::Column::Id)
            .all(&self.db)
            .await
            .map(|rows| {
                rows.into_iter()
                    .filter(|document| {
                        document
                            .access_level()
                            .map(|level| tier_satisfied(&ctx.actor, level))
                            .unwrap_or(false)
                    })
                    .map(DocumentRef::from)
                    .collect()
            })
            .map_err(|e| CoreError::from_db("list project documents", e));

        degrade_read("list project documents", result)
    }

    pub async fn list_all_documents(
        &self,
        ctx: &RequestContext,
        filter: DocumentFilter,
        page: PageRequest,
    ) -> CoreResult<Vec<documents::Model>> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageDocuments)?;
        let page = Page::admin(page)?;

        let mut query = documents::Entity::find();
        if let Some(project_id) = filter.project_id {
            query = query.filter(documents::Column::ProjectId.eq(project_id));
        }
        if let Some(level) = filter.access_level {
            query = query.filter(documents::Column::AccessLevel.eq(level.as_str()));
        }

        let result = query
            .order_by_desc(documents::Column::CreatedAt)
            .order_by_desc(documents::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::from_db("list documents", e));

        degrade_read("list documents", result)
    }

    /// Signed, expiring URL for a document the caller may read.
    pub async fn get_download_url(
        &self,
        ctx: &RequestContext,
        document_id: i32,
    ) -> CoreResult<DownloadUrl> {
        // Anonymous callers are refused before the lookup so a miss and a
        // denial look the same to them.
        if !ctx.actor.is_authenticated() {
            self.authorizer.authorize(
                &ctx.actor,
                Operation::RequestDocumentUrl(AccessLevel::Public),
            )?;
        }

        let document = self.find_document(document_id).await?;
        let level = document.access_level()?;
        self.authorizer
            .authorize(&ctx.actor, Operation::RequestDocumentUrl(level))?;

        let signed = self.store.signed_url(&document.storage_key, self.download_ttl);

        self.audit
            .record(
                ctx,
                AuditEvent::new("DOWNLOAD_DOCUMENT", "document", document_id),
            )
            .await;

        Ok(DownloadUrl {
            url: signed.url,
            expires_at: signed.expires_at,
            title: document.title,
        })
    }

    /// Remove metadata, then the stored object. The object removal is not
    /// atomic with the row deletion and only logs on failure.
    pub async fn delete_document(&self, ctx: &RequestContext, document_id: i32) -> CoreResult<()> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageDocuments)?;

        let before = self.find_document(document_id).await?;
        documents::Entity::delete_by_id(document_id)
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::from_db("delete document", e))?;

        if let Err(err) = self.store.delete(&before.storage_key).await {
            warn!(document_id, key = %before.storage_key, error = %err, "failed to delete stored object");
        }

        self.audit
            .record(
                ctx,
                AuditEvent::new("DELETE_DOCUMENT", "document", document_id).before(&before),
            )
            .await;

        info!(document_id, "deleted document");
        Ok(())
    }
}
