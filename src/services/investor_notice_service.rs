//! Admin-triggered notices to the investors linked to a project: milestones,
//! capital calls, distributions and newly available documents.
//!
//! Recipients are the active investors whose link to the project is in a
//! status the notice applies to. Delivery failures are counted in the
//! returned [`NoticeReceipt`] and never fail the call.

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::auth::{
    qualification_satisfies, Authorizer, InvestorQualification, Operation, RequestContext,
};
use crate::database::entities::project_investors::InvestmentStatus;
use crate::database::entities::{documents, investors, project_investors, projects};
use crate::errors::{CoreError, CoreResult};
use crate::notifications::{Notification, Notifier};
use crate::services::audit_service::{AuditEvent, AuditService};
use crate::services::ValidationService;

/// Links that still represent a live relationship with the project.
const ENGAGED: [InvestmentStatus; 3] = [
    InvestmentStatus::Interested,
    InvestmentStatus::Committed,
    InvestmentStatus::Funded,
];

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MilestoneNotice {
    pub milestone_name: String,
    pub completion_date: NaiveDate,
    /// Limit delivery to one investor.
    pub investor_id: Option<i32>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CapitalCallNotice {
    /// Percentage of each committed investment being called.
    pub call_percentage: f64,
    pub due_date: NaiveDate,
    pub investor_id: Option<i32>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DistributionNotice {
    /// Total payout, shared pro rata over the project's funded investments.
    pub total_amount: f64,
    pub distribution_date: NaiveDate,
    pub investor_id: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NoticeReceipt {
    pub kind: &'static str,
    pub project_id: i32,
    pub delivered: usize,
    pub failed: usize,
}

struct Recipient {
    link: project_investors::Model,
    investor: investors::Model,
}

impl Recipient {
    fn qualification(&self) -> Option<InvestorQualification> {
        match (
            self.investor.investment_stage(),
            self.investor.accreditation_status(),
        ) {
            (Ok(stage), Ok(accreditation)) => Some(InvestorQualification::new(stage, accreditation)),
            _ => None,
        }
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Each recipient's share of `total`, proportional to their investment.
/// Zero-amount investments split the total evenly.
fn pro_rata(total: f64, investments: &[f64]) -> Vec<f64> {
    let base: f64 = investments.iter().sum();
    if base > 0.0 {
        investments
            .iter()
            .map(|amount| round_cents(total * amount / base))
            .collect()
    } else {
        let even = round_cents(total / investments.len().max(1) as f64);
        vec![even; investments.len()]
    }
}

#[derive(Clone)]
pub struct InvestorNoticeService {
    db: DatabaseConnection,
    authorizer: Arc<dyn Authorizer>,
    audit: AuditService,
    notifier: Arc<dyn Notifier>,
}

impl InvestorNoticeService {
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

    async fn find_project(&self, project_id: i32) -> CoreResult<projects::Model> {
        projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find project", e))?
            .ok_or_else(|| CoreError::not_found("Project", project_id.to_string()))
    }

    async fn recipients(
        &self,
        project_id: i32,
        statuses: &[InvestmentStatus],
    ) -> CoreResult<Vec<Recipient>> {
        let linked = project_investors::Entity::find()
            .filter(project_investors::Column::ProjectId.eq(project_id))
            .filter(project_investors::Column::Status.is_in(statuses.iter().map(|s| s.as_str())))
            .find_also_related(investors::Entity)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::from_db("load project investors", e))?;

        Ok(linked
            .into_iter()
            .filter_map(|(link, investor)| {
                investor
                    .filter(|investor| investor.is_active)
                    .map(|investor| Recipient { link, investor })
            })
            .collect())
    }

    async fn deliver(
        &self,
        kind: &'static str,
        project_id: i32,
        notices: Vec<(i32, Notification)>,
    ) -> NoticeReceipt {
        let mut receipt = NoticeReceipt {
            kind,
            project_id,
            delivered: 0,
            failed: 0,
        };
        for (investor_id, notification) in notices {
            match self.notifier.send(notification).await {
                Ok(()) => receipt.delivered += 1,
                Err(err) => {
                    receipt.failed += 1;
                    warn!(investor_id, project_id, kind, error = %err, "failed to deliver investor notice");
                }
            }
        }
        receipt
    }

    pub async fn send_milestone(
        &self,
        ctx: &RequestContext,
        project_id: i32,
        notice: MilestoneNotice,
    ) -> CoreResult<NoticeReceipt> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;
        let milestone_name = ValidationService::validate_name("milestone_name", &notice.milestone_name)?;

        let project = self.find_project(project_id).await?;
        let recipients = self.recipients(project_id, &ENGAGED).await?;
        let recipients = select(recipients, notice.investor_id, project_id)?;

        let notices = recipients
            .into_iter()
            .map(|r| {
                (
                    r.investor.id,
                    Notification::Milestone {
                        to: r.investor.email,
                        investor_name: r.investor.name,
                        project_name: project.name.clone(),
                        milestone_name: milestone_name.clone(),
                        completion_date: notice.completion_date,
                    },
                )
            })
            .collect();
        let receipt = self.deliver("milestone", project_id, notices).await;

        self.record(ctx, "SEND_MILESTONE_NOTICE", project_id, &notice, &receipt)
            .await;
        info!(project_id, delivered = receipt.delivered, "sent milestone notice");
        Ok(receipt)
    }

    /// Call a share of every committed (not yet funded) investment.
    pub async fn send_capital_call(
        &self,
        ctx: &RequestContext,
        project_id: i32,
        notice: CapitalCallNotice,
    ) -> CoreResult<NoticeReceipt> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;
        let call_percentage =
            ValidationService::validate_percentage("call_percentage", notice.call_percentage)?;
        if call_percentage == 0.0 {
            return Err(CoreError::invalid_field(
                "call_percentage",
                "call_percentage must be greater than 0",
            ));
        }

        let project = self.find_project(project_id).await?;
        let recipients = self
            .recipients(project_id, &[InvestmentStatus::Committed])
            .await?;
        let recipients = select(recipients, notice.investor_id, project_id)?;

        let notices = recipients
            .into_iter()
            .map(|r| {
                (
                    r.investor.id,
                    Notification::CapitalCall {
                        to: r.investor.email,
                        investor_name: r.investor.name,
                        project_name: project.name.clone(),
                        amount: round_cents(r.link.investment_amount * call_percentage / 100.0),
                        call_percentage,
                        due_date: notice.due_date,
                    },
                )
            })
            .collect();
        let receipt = self.deliver("capital_call", project_id, notices).await;

        self.record(ctx, "SEND_CAPITAL_CALL", project_id, &notice, &receipt)
            .await;
        info!(project_id, call_percentage, delivered = receipt.delivered, "sent capital call");
        Ok(receipt)
    }

    /// Announce a payout. Shares are computed over every funded investment
    /// even when delivery is limited to one investor.
    pub async fn send_distribution(
        &self,
        ctx: &RequestContext,
        project_id: i32,
        notice: DistributionNotice,
    ) -> CoreResult<NoticeReceipt> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;
        let total = ValidationService::validate_amount("total_amount", notice.total_amount)?;
        if total == 0.0 {
            return Err(CoreError::invalid_field(
                "total_amount",
                "total_amount must be greater than 0",
            ));
        }

        let project = self.find_project(project_id).await?;
        let funded = self
            .recipients(project_id, &[InvestmentStatus::Funded])
            .await?;
        let amounts: Vec<f64> = funded.iter().map(|r| r.link.investment_amount).collect();
        let shared: Vec<(Recipient, f64)> = funded.into_iter().zip(pro_rata(total, &amounts)).collect();

        let shared: Vec<(Recipient, f64)> = match notice.investor_id {
            None => shared,
            Some(investor_id) => {
                let selected: Vec<_> = shared
                    .into_iter()
                    .filter(|(r, _)| r.investor.id == investor_id)
                    .collect();
                if selected.is_empty() {
                    return Err(missing_investment(project_id, investor_id));
                }
                selected
            }
        };

        let notices = shared
            .into_iter()
            .map(|(r, amount)| {
                (
                    r.investor.id,
                    Notification::Distribution {
                        to: r.investor.email,
                        investor_name: r.investor.name,
                        project_name: project.name.clone(),
                        amount,
                        distribution_date: notice.distribution_date,
                    },
                )
            })
            .collect();
        let receipt = self.deliver("distribution", project_id, notices).await;

        self.record(ctx, "SEND_DISTRIBUTION_NOTICE", project_id, &notice, &receipt)
            .await;
        info!(project_id, total, delivered = receipt.delivered, "sent distribution notice");
        Ok(receipt)
    }

    /// Re-announce an existing project document.
    pub async fn send_document_notice(
        &self,
        ctx: &RequestContext,
        document_id: i32,
    ) -> CoreResult<NoticeReceipt> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        let document = documents::Entity::find_by_id(document_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find document", e))?
            .ok_or_else(|| CoreError::not_found("Document", document_id.to_string()))?;
        let Some(project_id) = document.project_id else {
            return Err(CoreError::invalid_field(
                "project_id",
                "document is not attached to a project",
            ));
        };
        let project = self.find_project(project_id).await?;

        let receipt = self.announce_document(&project, &document).await?;

        self.audit
            .record(
                ctx,
                AuditEvent::new("SEND_DOCUMENT_NOTICE", "document", document_id).after(&receipt),
            )
            .await;
        info!(document_id, project_id, delivered = receipt.delivered, "sent document notice");
        Ok(receipt)
    }

    /// Tell the project's investors about a document their tier lets them
    /// read. Admin-tier documents reach nobody.
    pub(crate) async fn announce_document(
        &self,
        project: &projects::Model,
        document: &documents::Model,
    ) -> CoreResult<NoticeReceipt> {
        let level = document.access_level()?;
        let recipients = self.recipients(project.id, &ENGAGED).await?;

        let notices = recipients
            .into_iter()
            .filter(|r| qualification_satisfies(r.qualification(), level))
            .map(|r| {
                (
                    r.investor.id,
                    Notification::DocumentUploaded {
                        to: r.investor.email,
                        investor_name: r.investor.name,
                        project_name: project.name.clone(),
                        document_title: document.title.clone(),
                        document_type: document.document_type.clone(),
                    },
                )
            })
            .collect();
        Ok(self.deliver("document_uploaded", project.id, notices).await)
    }

    async fn record<T: Serialize>(
        &self,
        ctx: &RequestContext,
        action: &'static str,
        project_id: i32,
        notice: &T,
        receipt: &NoticeReceipt,
    ) {
        self.audit
            .record(
                ctx,
                AuditEvent::new(action, "project", project_id)
                    .after(&json!({ "notice": notice, "receipt": receipt })),
            )
            .await;
    }
}

fn missing_investment(project_id: i32, investor_id: i32) -> CoreError {
    CoreError::not_found("Investment", format!("{}/{}", project_id, investor_id))
}

/// Narrow recipients to one investor when asked to.
fn select(
    recipients: Vec<Recipient>,
    investor_id: Option<i32>,
    project_id: i32,
) -> CoreResult<Vec<Recipient>> {
    let Some(investor_id) = investor_id else {
        return Ok(recipients);
    };
    let selected: Vec<Recipient> = recipients
        .into_iter()
        .filter(|r| r.investor.id == investor_id)
        .collect();
    if selected.is_empty() {
        return Err(missing_investment(project_id, investor_id));
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pro_rata_follows_investment_size() {
        assert_eq!(pro_rata(1_000.0, &[300.0, 100.0]), vec![750.0, 250.0]);
        assert_eq!(pro_rata(100.0, &[1.0, 1.0, 1.0]), vec![33.33, 33.33, 33.33]);
    }

    #[test]
    fn pro_rata_without_amounts_splits_evenly() {
        assert_eq!(pro_rata(90.0, &[0.0, 0.0]), vec![45.0, 45.0]);
        assert!(pro_rata(90.0, &[]).is_empty());
    }
}
