use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{Authorizer, Operation, RequestContext};
use crate::database::entities::project_updates::UpdateType;
use crate::database::entities::{encode_list, investors, project_investors, project_updates, projects};
use crate::errors::{degrade_read, CoreError, CoreResult};
use crate::notifications::{Notification, Notifier};
use crate::services::audit_service::{AuditEvent, AuditService};
use crate::services::pagination::{Page, PageRequest};
use crate::services::ValidationService;

pub const MAX_RECENT_UPDATES: u64 = 50;

#[derive(Clone, Debug, Deserialize)]
pub struct NewProjectUpdate {
    pub update_type: UpdateType,
    pub title: String,
    pub description: String,
    pub financial_impact: Option<f64>,
    pub timeline_impact_days: Option<i32>,
    pub is_public: Option<bool>,
    pub notify_investors: Option<bool>,
    #[serde(default)]
    pub attachment_urls: Vec<String>,
}

/// A public update with the project it belongs to.
#[derive(Clone, Debug, Serialize)]
pub struct RecentUpdate {
    #[serde(flatten)]
    pub update: project_updates::Model,
    pub project_name: String,
    pub project_slug: String,
}

#[derive(Clone)]
pub struct ProjectUpdateService {
    db: DatabaseConnection,
    authorizer: Arc<dyn Authorizer>,
    audit: AuditService,
    notifier: Arc<dyn Notifier>,
}

impl ProjectUpdateService {
    pub fn new(
        db: DatabaseConnection,
        authorizer: Arc<dyn Authorizer>,
        audit: AuditService,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            authorizer,
            audit,
            notifier,
        }
    }

    /// Updates for one project, newest first. Private updates are admin-only.
    pub async fn list_project_updates(
        &self,
        ctx: &RequestContext,
        project_id: i32,
        page: PageRequest,
    ) -> CoreResult<Vec<project_updates::Model>> {
        self.authorizer.authorize(&ctx.actor, Operation::ReadPublic)?;
        let page = Page::public(page)?;

        let mut query = project_updates::Entity::find()
            .filter(project_updates::Column::ProjectId.eq(project_id));
        if !ctx.actor.is_admin() {
            query = query.filter(project_updates::Column::IsPublic.eq(true));
        }

        let result = query
            .order_by_desc(project_updates::Column::CreatedAt)
            .order_by_desc(project_updates::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::from_db("list project updates", e));

        degrade_read("list project updates", result)
    }

    /// Latest public updates across public projects.
    pub async fn list_recent_public_updates(
        &self,
        ctx: &RequestContext,
        limit: Option<u64>,
    ) -> CoreResult<Vec<RecentUpdate>> {
        self.authorizer.authorize(&ctx.actor, Operation::ReadPublic)?;

        let limit = limit.unwrap_or(10);
        if !(1..=MAX_RECENT_UPDATES).contains(&limit) {
            return Err(CoreError::invalid_field(
                "limit",
                format!("limit must be between 1 and {}", MAX_RECENT_UPDATES),
            ));
        }

        let result = project_updates::Entity::find()
            .filter(project_updates::Column::IsPublic.eq(true))
            .find_also_related(projects::Entity)
            .filter(projects::Column::IsPublic.eq(true))
            .order_by_desc(project_updates::Column::CreatedAt)
            .order_by_desc(project_updates::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map(|rows| {
                rows.into_iter()
                    .filter_map(|(update, project)| {
                        project.map(|project| RecentUpdate {
                            update,
                            project_name: project.name,
                            project_slug: project.slug,
                        })
                    })
                    .collect()
            })
            .map_err(|e| CoreError::from_db("list recent updates", e));

        degrade_read("list recent updates", result)
    }

    pub async fn create_project_update(
        &self,
        ctx: &RequestContext,
        project_id: i32,
        input: NewProjectUpdate,
    ) -> CoreResult<project_updates::Model> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        let title = ValidationService::validate_name("title", &input.title)?;
        let description = input.description.trim().to_string();
        if description.is_empty() {
            return Err(CoreError::invalid_field(
                "description",
                "description cannot be empty",
            ));
        }

        let project = projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find project", e))?
            .ok_or_else(|| CoreError::not_found("Project", project_id.to_string()))?;

        let mut update = project_updates::ActiveModel::new(project_id);
        update.update_type = Set(input.update_type.as_str().to_string());
        update.title = Set(title);
        update.description = Set(description);
        update.financial_impact = Set(input.financial_impact);
        update.timeline_impact_days = Set(input.timeline_impact_days);
        if let Some(is_public) = input.is_public {
            update.is_public = Set(is_public);
        }
        if let Some(notify) = input.notify_investors {
            update.notify_investors = Set(notify);
        }
        update.attachment_urls = Set(encode_list(&input.attachment_urls));

        let update = update
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::from_db("create project update", e))?;

        self.audit
            .record(
                ctx,
                AuditEvent::new("CREATE_PROJECT_UPDATE", "project_update", update.id)
                    .after(&update),
            )
            .await;

        if update.notify_investors {
            self.notify_linked_investors(&project, &update).await;
        }

        info!(update_id = update.id, project_id, "created project update");
        Ok(update)
    }

    async fn notify_linked_investors(
        &self,
        project: &projects::Model,
        update: &project_updates::Model,
    ) {
        let linked = project_investors::Entity::find()
            .filter(project_investors::Column::ProjectId.eq(project.id))
            .find_also_related(investors::Entity)
            .all(&self.db)
            .await;

        let linked = match linked {
            Ok(linked) => linked,
            Err(err) => {
                warn!(project_id = project.id, error = %err, "failed to load investors to notify");
                return;
            }
        };

        for investor in linked
            .into_iter()
            .filter_map(|(_, investor)| investor)
            .filter(|investor| investor.is_active)
        {
            let notification = Notification::ProjectUpdate {
                to: investor.email.clone(),
                investor_name: investor.name.clone(),
                project_name: project.name.clone(),
                update_title: update.title.clone(),
            };
            if let Err(err) = self.notifier.send(notification).await {
                warn!(
                    investor_id = investor.id,
                    update_id = update.id,
                    error = %err,
                    "failed to notify investor"
                );
            }
        }
    }
}
