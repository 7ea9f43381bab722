use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{Authorizer, Operation, RequestContext};
use crate::database::entities::investors::{AccreditationStatus, EntityType, InvestmentStage};
use crate::database::entities::project_investors::InvestmentStatus;
use crate::database::entities::{encode_list, investors, project_investors, projects};
use crate::errors::{degrade_read, CoreError, CoreResult};
use crate::services::audit_service::{AuditEvent, AuditService};
use crate::services::pagination::{Page, PageRequest};
use crate::services::ValidationService;

/// Fields of an investor that are safe to show to any caller.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvestorSummary {
    pub id: i32,
    pub name: String,
    pub entity_type: String,
    pub organization_name: Option<String>,
    pub website: Option<String>,
    pub investment_stage: String,
    pub focus_sectors: Vec<String>,
    pub geographic_focus: Vec<String>,
    pub is_active: bool,
}

impl From<investors::Model> for InvestorSummary {
    fn from(model: investors::Model) -> Self {
        let focus_sectors = model.focus_sectors();
        let geographic_focus = model.geographic_focus();
        Self {
            id: model.id,
            name: model.name,
            entity_type: model.entity_type,
            organization_name: model.organization_name,
            website: model.website,
            investment_stage: model.investment_stage,
            focus_sectors,
            geographic_focus,
            is_active: model.is_active,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct InvestmentView {
    #[serde(flatten)]
    pub link: project_investors::Model,
    pub project_name: Option<String>,
    pub project_slug: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct InvestorProfile {
    pub investor: investors::Model,
    pub investments: Vec<InvestmentView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProjectInvestment {
    #[serde(flatten)]
    pub link: project_investors::Model,
    pub investor_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InvestorFilter {
    pub stage: Option<InvestmentStage>,
    pub entity_type: Option<EntityType>,
    /// Only honoured for admins; everyone else sees active investors.
    pub include_inactive: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewInvestor {
    pub user_id: Option<i32>,
    pub name: String,
    pub entity_type: EntityType,
    pub email: String,
    pub phone: Option<String>,
    pub organization_name: Option<String>,
    pub website: Option<String>,
    pub investment_stage: Option<InvestmentStage>,
    pub accreditation_status: Option<AccreditationStatus>,
    pub minimum_investment: Option<f64>,
    pub maximum_investment: Option<f64>,
    #[serde(default)]
    pub focus_sectors: Vec<String>,
    #[serde(default)]
    pub geographic_focus: Vec<String>,
    pub investment_horizon: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InvestorPatch {
    pub user_id: Option<i32>,
    pub name: Option<String>,
    pub entity_type: Option<EntityType>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub organization_name: Option<String>,
    pub website: Option<String>,
    pub investment_stage: Option<InvestmentStage>,
    pub accreditation_status: Option<AccreditationStatus>,
    pub minimum_investment: Option<f64>,
    pub maximum_investment: Option<f64>,
    pub focus_sectors: Option<Vec<String>>,
    pub geographic_focus: Option<Vec<String>>,
    pub investment_horizon: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
    pub last_contacted_at: Option<DateTime<Utc>>,
}

impl InvestorPatch {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.name.is_none()
            && self.entity_type.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.organization_name.is_none()
            && self.website.is_none()
            && self.investment_stage.is_none()
            && self.accreditation_status.is_none()
            && self.minimum_investment.is_none()
            && self.maximum_investment.is_none()
            && self.focus_sectors.is_none()
            && self.geographic_focus.is_none()
            && self.investment_horizon.is_none()
            && self.notes.is_none()
            && self.is_active.is_none()
            && self.last_contacted_at.is_none()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewInvestment {
    pub investor_id: i32,
    pub investment_amount: f64,
    pub investment_date: Option<DateTime<Utc>>,
    pub status: Option<InvestmentStatus>,
    pub return_percentage: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InvestmentPatch {
    pub investment_amount: Option<f64>,
    pub investment_date: Option<DateTime<Utc>>,
    pub status: Option<InvestmentStatus>,
    pub return_percentage: Option<f64>,
    pub actual_return: Option<f64>,
    pub exit_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl InvestmentPatch {
    pub fn is_empty(&self) -> bool {
        self.investment_amount.is_none()
            && self.investment_date.is_none()
            && self.status.is_none()
            && self.return_percentage.is_none()
            && self.actual_return.is_none()
            && self.exit_date.is_none()
            && self.notes.is_none()
    }
}

/// Recompute an investor's `total_deployed` from its funded links.
pub(crate) async fn recompute_total_deployed<C>(db: &C, investor_id: i32) -> CoreResult<f64>
where
    C: ConnectionTrait,
{
    let links = project_investors::Entity::find()
        .filter(project_investors::Column::InvestorId.eq(investor_id))
        .filter(project_investors::Column::Status.eq(InvestmentStatus::Funded.as_str()))
        .all(db)
        .await
        .map_err(|e| CoreError::from_db("load funded investments", e))?;
    let total: f64 = links.iter().map(|link| link.investment_amount).sum();

    let Some(investor) = investors::Entity::find_by_id(investor_id)
        .one(db)
        .await
        .map_err(|e| CoreError::from_db("find investor", e))?
    else {
        return Ok(total);
    };

    if investor.total_deployed != total {
        let mut investor: investors::ActiveModel = investor.into();
        investor.total_deployed = Set(total);
        investor.updated_at = Set(Utc::now());
        investor
            .update(db)
            .await
            .map_err(|e| CoreError::from_db("update total deployed", e))?;
    }

    Ok(total)
}

/// Reconciliation after a link write; a failure here leaves the figure stale
/// until the next write rather than failing the caller.
pub(crate) async fn reconcile_total_deployed<C>(db: &C, investor_id: i32)
where
    C: ConnectionTrait,
{
    if let Err(err) = recompute_total_deployed(db, investor_id).await {
        warn!(investor_id, error = %err, "failed to reconcile total deployed");
    }
}

fn validate_contact_fields(
    email: Option<&str>,
    minimum: Option<f64>,
    maximum: Option<f64>,
) -> CoreResult<Option<String>> {
    ValidationService::validate_investment_bounds(minimum, maximum)?;
    email.map(ValidationService::validate_email).transpose()
}

#[derive(Clone)]
pub struct InvestorService {
    db: DatabaseConnection,
    authorizer: Arc<dyn Authorizer>,
    audit: AuditService,
}

impl InvestorService {
    pub fn new(db: DatabaseConnection, authorizer: Arc<dyn Authorizer>, audit: AuditService) -> Self {
        Self {
            db,
            authorizer,
            audit,
        }
    }

    /// Public-safe investor summaries, newest first.
    pub async fn list_investors(
        &self,
        ctx: &RequestContext,
        filter: InvestorFilter,
        page: PageRequest,
    ) -> CoreResult<Vec<InvestorSummary>> {
        self.authorizer.authorize(&ctx.actor, Operation::ReadPublic)?;
        let page = if ctx.actor.is_admin() {
            Page::admin(page)?
        } else {
            Page::public(page)?
        };

        let mut query = investors::Entity::find();
        if let Some(stage) = filter.stage {
            query = query.filter(investors::Column::InvestmentStage.eq(stage.as_str()));
        }
        if let Some(entity_type) = filter.entity_type {
            query = query.filter(investors::Column::EntityType.eq(entity_type.as_str()));
        }
        let include_inactive = ctx.actor.is_admin() && filter.include_inactive.unwrap_or(false);
        if !include_inactive {
            query = query.filter(investors::Column::IsActive.eq(true));
        }

        let result = query
            .order_by_desc(investors::Column::CreatedAt)
            .order_by_desc(investors::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await
            .map(|rows| rows.into_iter().map(InvestorSummary::from).collect())
            .map_err(|e| CoreError::from_db("list investors", e));

        degrade_read("list investors", result)
    }

    pub async fn get_investor(
        &self,
        ctx: &RequestContext,
        investor_id: i32,
    ) -> CoreResult<InvestorSummary> {
        self.authorizer.authorize(&ctx.actor, Operation::ReadPublic)?;
        Ok(self.find_investor(investor_id).await?.into())
    }

    async fn find_investor(&self, investor_id: i32) -> CoreResult<investors::Model> {
        investors::Entity::find_by_id(investor_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find investor", e))?
            .ok_or_else(|| CoreError::not_found("Investor", investor_id.to_string()))
    }

    /// Full profile with investment history. Every call is audited.
    pub async fn get_investor_full_profile(
        &self,
        ctx: &RequestContext,
        investor_id: i32,
    ) -> CoreResult<InvestorProfile> {
        self.authorizer.authorize(&ctx.actor, Operation::ReadSensitive)?;

        let investor = self.find_investor(investor_id).await?;
        let links = project_investors::Entity::find()
            .filter(project_investors::Column::InvestorId.eq(investor_id))
            .order_by_desc(project_investors::Column::InvestmentDate)
            .find_also_related(projects::Entity)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::from_db("load investor investments", e))?;

        let investments = links
            .into_iter()
            .map(|(link, project)| InvestmentView {
                link,
                project_name: project.as_ref().map(|p| p.name.clone()),
                project_slug: project.map(|p| p.slug),
            })
            .collect();

        self.audit
            .record(
                ctx,
                AuditEvent::new("VIEW_INVESTOR_PROFILE", "investor", investor_id),
            )
            .await;

        Ok(InvestorProfile {
            investor,
            investments,
        })
    }

    pub async fn create_investor(
        &self,
        ctx: &RequestContext,
        input: NewInvestor,
    ) -> CoreResult<investors::Model> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        let name = ValidationService::validate_name("name", &input.name)?;
        let email = validate_contact_fields(
            Some(&input.email),
            input.minimum_investment,
            input.maximum_investment,
        )?
        .unwrap_or_default();

        let mut investor = investors::ActiveModel::new();
        investor.user_id = Set(input.user_id);
        investor.name = Set(name);
        investor.entity_type = Set(input.entity_type.as_str().to_string());
        investor.email = Set(email);
        investor.phone = Set(input.phone);
        investor.organization_name = Set(input.organization_name);
        investor.website = Set(input.website);
        if let Some(stage) = input.investment_stage {
            investor.investment_stage = Set(stage.as_str().to_string());
        }
        if let Some(status) = input.accreditation_status {
            investor.accreditation_status = Set(status.as_str().to_string());
        }
        investor.minimum_investment = Set(input.minimum_investment);
        investor.maximum_investment = Set(input.maximum_investment);
        investor.focus_sectors = Set(encode_list(&input.focus_sectors));
        investor.geographic_focus = Set(encode_list(&input.geographic_focus));
        investor.investment_horizon = Set(input.investment_horizon);
        investor.notes = Set(input.notes);

        let investor = investor
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::from_db("create investor", e))?;

        self.audit
            .record(
                ctx,
                AuditEvent::new("CREATE_INVESTOR", "investor", investor.id).after(&investor),
            )
            .await;

        info!(investor_id = investor.id, "created investor");
        Ok(investor)
    }

    pub async fn update_investor(
        &self,
        ctx: &RequestContext,
        investor_id: i32,
        patch: InvestorPatch,
    ) -> CoreResult<investors::Model> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        if patch.is_empty() {
            return Err(CoreError::invalid_input("No fields to update"));
        }
        let name = patch
            .name
            .as_deref()
            .map(|name| ValidationService::validate_name("name", name))
            .transpose()?;

        let before = self.find_investor(investor_id).await?;
        let email = validate_contact_fields(
            patch.email.as_deref(),
            patch.minimum_investment.or(before.minimum_investment),
            patch.maximum_investment.or(before.maximum_investment),
        )?;

        let mut investor: investors::ActiveModel = before.clone().into();
        if let Some(user_id) = patch.user_id {
            investor.user_id = Set(Some(user_id));
        }
        if let Some(name) = name {
            investor.name = Set(name);
        }
        if let Some(entity_type) = patch.entity_type {
            investor.entity_type = Set(entity_type.as_str().to_string());
        }
        if let Some(email) = email {
            investor.email = Set(email);
        }
        if let Some(phone) = patch.phone {
            investor.phone = Set(Some(phone));
        }
        if let Some(organization) = patch.organization_name {
            investor.organization_name = Set(Some(organization));
        }
        if let Some(website) = patch.website {
            investor.website = Set(Some(website));
        }
        if let Some(stage) = patch.investment_stage {
            investor.investment_stage = Set(stage.as_str().to_string());
        }
        if let Some(status) = patch.accreditation_status {
            investor.accreditation_status = Set(status.as_str().to_string());
        }
        if let Some(minimum) = patch.minimum_investment {
            investor.minimum_investment = Set(Some(minimum));
        }
        if let Some(maximum) = patch.maximum_investment {
            investor.maximum_investment = Set(Some(maximum));
        }
        if let Some(sectors) = patch.focus_sectors {
            investor.focus_sectors = Set(encode_list(&sectors));
        }
        if let Some(geography) = patch.geographic_focus {
            investor.geographic_focus = Set(encode_list(&geography));
        }
        if let Some(horizon) = patch.investment_horizon {
            investor.investment_horizon = Set(Some(horizon));
        }
        if let Some(notes) = patch.notes {
            investor.notes = Set(Some(notes));
        }
        if let Some(is_active) = patch.is_active {
            investor.is_active = Set(is_active);
        }
        if let Some(contacted) = patch.last_contacted_at {
            investor.last_contacted_at = Set(Some(contacted));
        }
        investor.updated_at = Set(Utc::now());

        let after = investor
            .update(&self.db)
            .await
            .map_err(|e| CoreError::from_db("update investor", e))?;

        self.audit
            .record(
                ctx,
                AuditEvent::new("UPDATE_INVESTOR", "investor", investor_id)
                    .before(&before)
                    .after(&after),
            )
            .await;

        info!(investor_id, "updated investor");
        Ok(after)
    }

    /// Soft delete: investors are never physically removed.
    pub async fn deactivate_investor(
        &self,
        ctx: &RequestContext,
        investor_id: i32,
    ) -> CoreResult<investors::Model> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        let before = self.find_investor(investor_id).await?;
        let mut investor: investors::ActiveModel = before.clone().into();
        investor.is_active = Set(false);
        investor.updated_at = Set(Utc::now());

        let after = investor
            .update(&self.db)
            .await
            .map_err(|e| CoreError::from_db("deactivate investor", e))?;

        self.audit
            .record(
                ctx,
                AuditEvent::new("DEACTIVATE_INVESTOR", "investor", investor_id)
                    .before(&before)
                    .after(&after),
            )
            .await;

        info!(investor_id, "deactivated investor");
        Ok(after)
    }

    pub async fn list_project_investors(
        &self,
        ctx: &RequestContext,
        project_id: i32,
    ) -> CoreResult<Vec<ProjectInvestment>> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        let result = project_investors::Entity::find()
            .filter(project_investors::Column::ProjectId.eq(project_id))
            .order_by_desc(project_investors::Column::InvestmentDate)
            .find_also_related(investors::Entity)
            .all(&self.db)
            .await
            .map(|rows| {
                rows.into_iter()
                    .map(|(link, investor)| ProjectInvestment {
                        link,
                        investor_name: investor.map(|i| i.name),
                    })
                    .collect()
            })
            .map_err(|e| CoreError::from_db("list project investors", e));

        degrade_read("list project investors", result)
    }

    /// Link an investor to a project. A second link for the same pair is a
    /// conflict; amendments go through [`InvestorService::update_investment`].
    pub async fn record_investment(
        &self,
        ctx: &RequestContext,
        project_id: i32,
        input: NewInvestment,
    ) -> CoreResult<project_investors::Model> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        ValidationService::validate_amount("investment_amount", input.investment_amount)?;

        projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find project", e))?
            .ok_or_else(|| CoreError::not_found("Project", project_id.to_string()))?;
        self.find_investor(input.investor_id).await?;

        let existing = project_investors::Entity::find()
            .filter(project_investors::Column::ProjectId.eq(project_id))
            .filter(project_investors::Column::InvestorId.eq(input.investor_id))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find investment", e))?;
        if existing.is_some() {
            return Err(CoreError::conflict(format!(
                "Investor {} is already linked to project {}",
                input.investor_id, project_id
            )));
        }

        let mut link =
            project_investors::ActiveModel::new(project_id, input.investor_id, input.investment_amount);
        if let Some(date) = input.investment_date {
            link.investment_date = Set(date);
        }
        if let Some(status) = input.status {
            link.status = Set(status.as_str().to_string());
        }
        link.return_percentage = Set(input.return_percentage);
        link.notes = Set(input.notes);

        let link = link
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::from_db("record investment", e))?;

        reconcile_total_deployed(&self.db, link.investor_id).await;
        self.audit
            .record(
                ctx,
                AuditEvent::new("CREATE_INVESTMENT", "project_investor", link.id).after(&link),
            )
            .await;

        info!(
            link_id = link.id,
            project_id,
            investor_id = link.investor_id,
            "recorded investment"
        );
        Ok(link)
    }

    pub async fn update_investment(
        &self,
        ctx: &RequestContext,
        link_id: i32,
        patch: InvestmentPatch,
    ) -> CoreResult<project_investors::Model> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        if patch.is_empty() {
            return Err(CoreError::invalid_input("No fields to update"));
        }
        if let Some(amount) = patch.investment_amount {
            ValidationService::validate_amount("investment_amount", amount)?;
        }

        let before = project_investors::Entity::find_by_id(link_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find investment", e))?
            .ok_or_else(|| CoreError::not_found("ProjectInvestor", link_id.to_string()))?;

        let mut link: project_investors::ActiveModel = before.clone().into();
        if let Some(amount) = patch.investment_amount {
            link.investment_amount = Set(amount);
        }
        if let Some(date) = patch.investment_date {
            link.investment_date = Set(date);
        }
        if let Some(status) = patch.status {
            link.status = Set(status.as_str().to_string());
        }
        if let Some(percentage) = patch.return_percentage {
            link.return_percentage = Set(Some(percentage));
        }
        if let Some(actual) = patch.actual_return {
            link.actual_return = Set(Some(actual));
        }
        if let Some(exit_date) = patch.exit_date {
            link.exit_date = Set(Some(exit_date));
        }
        if let Some(notes) = patch.notes {
            link.notes = Set(Some(notes));
        }
        link.updated_at = Set(Utc::now());

        let after = link
            .update(&self.db)
            .await
            .map_err(|e| CoreError::from_db("update investment", e))?;

        reconcile_total_deployed(&self.db, after.investor_id).await;
        self.audit
            .record(
                ctx,
                AuditEvent::new("UPDATE_INVESTMENT", "project_investor", link_id)
                    .before(&before)
                    .after(&after),
            )
            .await;

        info!(link_id, "updated investment");
        Ok(after)
    }
}
