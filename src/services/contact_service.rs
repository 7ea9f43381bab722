use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::{Authorizer, Operation, RequestContext};
use crate::database::entities::investor_contacts::{self, ContactStatus, InquiryType};
use crate::database::entities::encode_list;
use crate::errors::{degrade_read, CoreError, CoreResult};
use crate::notifications::{Notification, Notifier};
use crate::services::audit_service::{AuditEvent, AuditService};
use crate::services::pagination::{Page, PageRequest};
use crate::services::ValidationService;

#[derive(Clone, Debug, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub inquiry_type: InquiryType,
    pub message: Option<String>,
    #[serde(default)]
    pub interested_project_ids: Vec<i32>,
    pub investment_range: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContactPatch {
    pub status: Option<ContactStatus>,
    pub notes: Option<String>,
    pub assigned_to: Option<i32>,
    pub follow_up_date: Option<DateTime<Utc>>,
}

impl ContactPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.notes.is_none()
            && self.assigned_to.is_none()
            && self.follow_up_date.is_none()
    }
}

/// Inbound inquiries from the public contact form and their triage.
#[derive(Clone)]
pub struct ContactService {
    db: DatabaseConnection,
    authorizer: Arc<dyn Authorizer>,
    audit: AuditService,
    notifier: Arc<dyn Notifier>,
}

impl ContactService {
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

    /// Open to anonymous callers.
    pub async fn create_contact(
        &self,
        ctx: &RequestContext,
        input: NewContact,
    ) -> CoreResult<investor_contacts::Model> {
        self.authorizer.authorize(&ctx.actor, Operation::SubmitInquiry)?;

        let name = ValidationService::validate_name("name", &input.name)?;
        let email = ValidationService::validate_email(&input.email)?;

        let mut contact = investor_contacts::ActiveModel::new();
        contact.name = Set(name);
        contact.email = Set(email);
        contact.phone = Set(input.phone);
        contact.company = Set(input.company);
        contact.inquiry_type = Set(input.inquiry_type.as_str().to_string());
        contact.message = Set(input.message);
        contact.interested_project_ids = Set(encode_list(&input.interested_project_ids));
        contact.investment_range = Set(input.investment_range);

        let contact = contact
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::from_db("create contact", e))?;

        self.audit
            .record(
                ctx,
                AuditEvent::new("CREATE_INVESTOR_CONTACT", "investor_contact", contact.id)
                    .after(&contact),
            )
            .await;

        let notifications = [
            Notification::InquiryAcknowledgement {
                to: contact.email.clone(),
                name: contact.name.clone(),
            },
            Notification::InquiryReceived {
                contact_id: contact.id,
                name: contact.name.clone(),
                email: contact.email.clone(),
                inquiry_type: contact.inquiry_type.clone(),
            },
        ];
        for notification in notifications {
            let kind = notification.kind();
            if let Err(err) = self.notifier.send(notification).await {
                warn!(contact_id = contact.id, kind, error = %err, "failed to send notification");
            }
        }

        info!(contact_id = contact.id, "recorded investor contact");
        Ok(contact)
    }

    pub async fn list_contacts(
        &self,
        ctx: &RequestContext,
        filter: ContactFilter,
        page: PageRequest,
    ) -> CoreResult<Vec<investor_contacts::Model>> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;
        let page = Page::admin(page)?;

        let mut query = investor_contacts::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(investor_contacts::Column::Status.eq(status.as_str()));
        }

        let result = query
            .order_by_desc(investor_contacts::Column::CreatedAt)
            .order_by_desc(investor_contacts::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::from_db("list contacts", e));

        degrade_read("list contacts", result)
    }

    pub async fn update_contact(
        &self,
        ctx: &RequestContext,
        contact_id: i32,
        patch: ContactPatch,
    ) -> CoreResult<investor_contacts::Model> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        if patch.is_empty() {
            return Err(CoreError::invalid_input("No fields to update"));
        }

        let before = investor_contacts::Entity::find_by_id(contact_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find contact", e))?
            .ok_or_else(|| CoreError::not_found("InvestorContact", contact_id.to_string()))?;

        let mut contact: investor_contacts::ActiveModel = before.clone().into();
        if let Some(status) = patch.status {
            contact.status = Set(status.as_str().to_string());
        }
        if let Some(notes) = patch.notes {
            contact.notes = Set(Some(notes));
        }
        if let Some(assigned_to) = patch.assigned_to {
            contact.assigned_to = Set(Some(assigned_to));
        }
        if let Some(follow_up) = patch.follow_up_date {
            contact.follow_up_date = Set(Some(follow_up));
        }
        contact.updated_at = Set(Utc::now());

        let after = contact
            .update(&self.db)
            .await
            .map_err(|e| CoreError::from_db("update contact", e))?;

        self.audit
            .record(
                ctx,
                AuditEvent::new("UPDATE_INVESTOR_CONTACT", "investor_contact", contact_id)
                    .before(&before)
                    .after(&after),
            )
            .await;

        info!(contact_id, status = %after.status, "updated investor contact");
        Ok(after)
    }
}
