use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::auth::{Authorizer, Operation, RequestContext};
use crate::database::entities::audit_logs;
use crate::errors::{CoreError, CoreResult};
use crate::services::pagination::{Page, PageRequest};

/// One entry for the audit trail.
#[derive(Clone, Debug)]
pub struct AuditEvent {
    pub action: &'static str,
    pub entity_type: &'static str,
    pub entity_id: i32,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

impl AuditEvent {
    pub fn new(action: &'static str, entity_type: &'static str, entity_id: i32) -> Self {
        Self {
            action,
            entity_type,
            entity_id,
            before: None,
            after: None,
        }
    }

    pub fn before<T: Serialize>(mut self, value: &T) -> Self {
        self.before = snapshot(value);
        self
    }

    pub fn after<T: Serialize>(mut self, value: &T) -> Self {
        self.after = snapshot(value);
        self
    }
}

fn snapshot<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AuditLogFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
}

/// Append-only audit trail.
#[derive(Clone)]
pub struct AuditService {
    db: DatabaseConnection,
    authorizer: Arc<dyn Authorizer>,
}

impl AuditService {
    pub fn new(db: DatabaseConnection, authorizer: Arc<dyn Authorizer>) -> Self {
        Self { db, authorizer }
    }

    /// Write an entry. A failed write is logged and otherwise ignored so it can
    /// never fail the operation being audited.
    pub async fn record(&self, ctx: &RequestContext, event: AuditEvent) {
        if let Err(err) = self.try_record(ctx, &event).await {
            warn!(
                action = event.action,
                entity_type = event.entity_type,
                entity_id = event.entity_id,
                error = %err,
                "failed to write audit log entry"
            );
        }
    }

    async fn try_record(
        &self,
        ctx: &RequestContext,
        event: &AuditEvent,
    ) -> CoreResult<audit_logs::Model> {
        let entry = audit_logs::ActiveModel {
            user_id: Set(ctx.actor.user_id),
            action: Set(event.action.to_string()),
            entity_type: Set(event.entity_type.to_string()),
            entity_id: Set(event.entity_id),
            old_values: Set(event.before.clone()),
            new_values: Set(event.after.clone()),
            ip_address: Set(ctx.origin_ip.clone()),
            user_agent: Set(ctx.user_agent.clone()),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        entry
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::from_db("write audit log", e))
    }

    /// Newest entries first.
    pub async fn list_entries(
        &self,
        ctx: &RequestContext,
        filter: AuditLogFilter,
        page: PageRequest,
    ) -> CoreResult<Vec<audit_logs::Model>> {
        self.authorizer
            .authorize(&ctx.actor, Operation::ReadAuditLog)?;
        let page = Page::admin(page)?;

        let mut query = audit_logs::Entity::find();
        if let Some(entity_type) = filter.entity_type {
            query = query.filter(audit_logs::Column::EntityType.eq(entity_type));
        }
        if let Some(entity_id) = filter.entity_id {
            query = query.filter(audit_logs::Column::EntityId.eq(entity_id));
        }

        query
            .order_by_desc(audit_logs::Column::CreatedAt)
            .order_by_desc(audit_logs::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::from_db("list audit logs", e))
    }
}
