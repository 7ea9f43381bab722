use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{Authorizer, Operation, RequestContext};
use crate::database::entities::projects::{ProjectStatus, ProjectType};
use crate::database::entities::{
    capital_stack_layers, documents, encode_list, project_investors, project_updates, projects,
};
use crate::errors::{degrade_read, CoreError, CoreResult};
use crate::services::audit_service::{AuditEvent, AuditService};
use crate::services::capital_stack::{aggregate, CapitalStackService, CapitalStackView};
use crate::services::investor_service::reconcile_total_deployed;
use crate::services::pagination::{Page, PageRequest};
use crate::services::ValidationService;
use crate::storage::ObjectStore;

const RECENT_UPDATES: u64 = 10;
const FULL_DETAIL_UPDATES: u64 = 50;

/// Project fields any caller may see.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub project_type: String,
    pub location: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub scope: Option<String>,
    pub total_units: Option<i32>,
    pub total_sqft: Option<f64>,
    pub project_status: String,
    pub start_date: Option<DateTime<Utc>>,
    pub completion_date: Option<DateTime<Utc>>,
    pub expected_completion: Option<DateTime<Utc>>,
    pub sustainability_features: Vec<String>,
    pub image_url: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&projects::Model> for ProjectSummary {
    fn from(model: &projects::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            slug: model.slug.clone(),
            project_type: model.project_type.clone(),
            location: model.location.clone(),
            city: model.city.clone(),
            state: model.state.clone(),
            country: model.country.clone(),
            latitude: model.latitude,
            longitude: model.longitude,
            description: model.description.clone(),
            scope: model.scope.clone(),
            total_units: model.total_units,
            total_sqft: model.total_sqft,
            project_status: model.project_status.clone(),
            start_date: model.start_date,
            completion_date: model.completion_date,
            expected_completion: model.expected_completion,
            sustainability_features: model.sustainability_features(),
            image_url: model.image_url.clone(),
            is_public: model.is_public,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Financial fields, only returned to authenticated callers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectFinancials {
    pub total_project_cost: Option<f64>,
    pub capital_deployed: f64,
    pub projected_return: Option<f64>,
    pub actual_return: Option<f64>,
    pub occupancy_rate: Option<f64>,
    pub noi: Option<f64>,
    pub notes: Option<String>,
}

impl From<&projects::Model> for ProjectFinancials {
    fn from(model: &projects::Model) -> Self {
        Self {
            total_project_cost: model.total_project_cost,
            capital_deployed: model.capital_deployed,
            projected_return: model.projected_return,
            actual_return: model.actual_return,
            occupancy_rate: model.occupancy_rate,
            noi: model.noi,
            notes: model.notes.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ProjectDetail {
    pub project: ProjectSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financials: Option<ProjectFinancials>,
    pub capital_stack: CapitalStackView,
    pub investors: Vec<project_investors::Model>,
    pub recent_updates: Vec<project_updates::Model>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    #[serde(rename = "type")]
    pub project_type: Option<ProjectType>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub slug: String,
    pub project_type: ProjectType,
    pub location: String,
    pub city: String,
    pub state: String,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub scope: Option<String>,
    pub total_units: Option<i32>,
    pub total_sqft: Option<f64>,
    pub project_status: Option<ProjectStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub completion_date: Option<DateTime<Utc>>,
    pub expected_completion: Option<DateTime<Utc>>,
    pub total_project_cost: Option<f64>,
    pub capital_deployed: Option<f64>,
    pub projected_return: Option<f64>,
    pub actual_return: Option<f64>,
    pub occupancy_rate: Option<f64>,
    pub noi: Option<f64>,
    #[serde(default)]
    pub sustainability_features: Vec<String>,
    pub image_url: Option<String>,
    pub notes: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub project_type: Option<ProjectType>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub scope: Option<String>,
    pub total_units: Option<i32>,
    pub total_sqft: Option<f64>,
    pub project_status: Option<ProjectStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub completion_date: Option<DateTime<Utc>>,
    pub expected_completion: Option<DateTime<Utc>>,
    pub total_project_cost: Option<f64>,
    pub capital_deployed: Option<f64>,
    pub projected_return: Option<f64>,
    pub actual_return: Option<f64>,
    pub occupancy_rate: Option<f64>,
    pub noi: Option<f64>,
    pub sustainability_features: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub notes: Option<String>,
    pub is_public: Option<bool>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.project_type.is_none()
            && self.location.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.country.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.description.is_none()
            && self.scope.is_none()
            && self.total_units.is_none()
            && self.total_sqft.is_none()
            && self.project_status.is_none()
            && self.start_date.is_none()
            && self.completion_date.is_none()
            && self.expected_completion.is_none()
            && self.total_project_cost.is_none()
            && self.capital_deployed.is_none()
            && self.projected_return.is_none()
            && self.actual_return.is_none()
            && self.occupancy_rate.is_none()
            && self.noi.is_none()
            && self.sustainability_features.is_none()
            && self.image_url.is_none()
            && self.notes.is_none()
            && self.is_public.is_none()
    }
}

fn validate_metrics(
    total_units: Option<i32>,
    total_sqft: Option<f64>,
    total_project_cost: Option<f64>,
    capital_deployed: Option<f64>,
    occupancy_rate: Option<f64>,
) -> CoreResult<()> {
    if matches!(total_units, Some(units) if units < 0) {
        return Err(CoreError::invalid_field(
            "total_units",
            "total_units cannot be negative",
        ));
    }
    if let Some(sqft) = total_sqft {
        ValidationService::validate_amount("total_sqft", sqft)?;
    }
    if let Some(cost) = total_project_cost {
        ValidationService::validate_amount("total_project_cost", cost)?;
    }
    if let Some(deployed) = capital_deployed {
        ValidationService::validate_amount("capital_deployed", deployed)?;
    }
    if let Some(occupancy) = occupancy_rate {
        ValidationService::validate_percentage("occupancy_rate", occupancy)?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct ProjectService {
    db: DatabaseConnection,
    authorizer: Arc<dyn Authorizer>,
    audit: AuditService,
    capital_stack: CapitalStackService,
    store: Arc<dyn ObjectStore>,
}

impl ProjectService {
    pub fn new(
        db: DatabaseConnection,
        authorizer: Arc<dyn Authorizer>,
        audit: AuditService,
        capital_stack: CapitalStackService,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            db,
            authorizer,
            audit,
            capital_stack,
            store,
        }
    }

    /// Newest first. Non-admin callers only see public projects.
    pub async fn list_projects(
        &self,
        ctx: &RequestContext,
        filter: ProjectFilter,
        page: PageRequest,
    ) -> CoreResult<Vec<projects::Model>> {
        self.authorizer.authorize(&ctx.actor, Operation::ReadPublic)?;
        let page = if ctx.actor.is_admin() {
            Page::admin(page)?
        } else {
            Page::public(page)?
        };

        let mut query = projects::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(projects::Column::ProjectStatus.eq(status.as_str()));
        }
        if let Some(project_type) = filter.project_type {
            query = query.filter(projects::Column::ProjectType.eq(project_type.as_str()));
        }
        if !ctx.actor.is_admin() {
            query = query.filter(projects::Column::IsPublic.eq(true));
        }

        let result = query
            .order_by_desc(projects::Column::CreatedAt)
            .order_by_desc(projects::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::from_db("list projects", e));

        degrade_read("list projects", result)
    }

    async fn find_project(&self, project_id: i32) -> CoreResult<projects::Model> {
        projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find project", e))?
            .ok_or_else(|| CoreError::not_found("Project", project_id.to_string()))
    }

    pub async fn get_project(
        &self,
        ctx: &RequestContext,
        project_id: i32,
    ) -> CoreResult<ProjectDetail> {
        self.authorizer.authorize(&ctx.actor, Operation::ReadPublic)?;
        let project = self.find_project(project_id).await?;
        self.visible_detail(ctx, project).await
    }

    pub async fn get_project_by_slug(
        &self,
        ctx: &RequestContext,
        slug: &str,
    ) -> CoreResult<ProjectDetail> {
        self.authorizer.authorize(&ctx.actor, Operation::ReadPublic)?;
        let project = projects::Entity::find()
            .filter(projects::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find project by slug", e))?
            .ok_or_else(|| CoreError::not_found("Project", slug))?;
        self.visible_detail(ctx, project).await
    }

    async fn visible_detail(
        &self,
        ctx: &RequestContext,
        project: projects::Model,
    ) -> CoreResult<ProjectDetail> {
        if !project.is_public {
            self.authorizer
                .authorize(&ctx.actor, Operation::ReadSensitive)?;
        }

        let authenticated = ctx.actor.is_authenticated();
        self.build_detail(
            project,
            authenticated,
            ctx.actor.is_admin(),
            RECENT_UPDATES,
        )
        .await
    }

    /// Financials, every investor link and up to 50 updates. Audited.
    pub async fn get_project_full_details(
        &self,
        ctx: &RequestContext,
        project_id: i32,
    ) -> CoreResult<ProjectDetail> {
        self.authorizer.authorize(&ctx.actor, Operation::ReadSensitive)?;

        let project = self.find_project(project_id).await?;
        let detail = self
            .build_detail(project, true, true, FULL_DETAIL_UPDATES)
            .await?;

        self.audit
            .record(
                ctx,
                AuditEvent::new("VIEW_PROJECT_DETAILS", "project", project_id),
            )
            .await;

        Ok(detail)
    }

    async fn build_detail(
        &self,
        project: projects::Model,
        include_financials: bool,
        include_private_updates: bool,
        update_limit: u64,
    ) -> CoreResult<ProjectDetail> {
        let layers = self.capital_stack.load_layers(project.id).await?;

        let investors = if include_financials {
            project_investors::Entity::find()
                .filter(project_investors::Column::ProjectId.eq(project.id))
                .order_by_desc(project_investors::Column::InvestmentDate)
                .all(&self.db)
                .await
                .map_err(|e| CoreError::from_db("load project investors", e))?
        } else {
            Vec::new()
        };

        let mut updates = project_updates::Entity::find()
            .filter(project_updates::Column::ProjectId.eq(project.id));
        if !include_private_updates {
            updates = updates.filter(project_updates::Column::IsPublic.eq(true));
        }
        let recent_updates = updates
            .order_by_desc(project_updates::Column::CreatedAt)
            .order_by_desc(project_updates::Column::Id)
            .limit(update_limit)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::from_db("load project updates", e))?;

        Ok(ProjectDetail {
            project: ProjectSummary::from(&project),
            financials: include_financials.then(|| ProjectFinancials::from(&project)),
            capital_stack: aggregate(layers),
            investors,
            recent_updates,
        })
    }

    pub async fn create_project(
        &self,
        ctx: &RequestContext,
        input: NewProject,
    ) -> CoreResult<projects::Model> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        let name = ValidationService::validate_name("name", &input.name)?;
        let slug = ValidationService::validate_slug(&input.slug)?;
        let location = ValidationService::validate_name("location", &input.location)?;
        let city = ValidationService::validate_name("city", &input.city)?;
        let state = ValidationService::validate_name("state", &input.state)?;
        let country = input
            .country
            .as_deref()
            .map(|country| ValidationService::validate_name("country", country))
            .transpose()?;
        ValidationService::validate_coordinates(input.latitude, input.longitude)?;
        validate_metrics(
            input.total_units,
            input.total_sqft,
            input.total_project_cost,
            input.capital_deployed,
            input.occupancy_rate,
        )?;

        let mut project = projects::ActiveModel::new();
        project.name = Set(name);
        project.slug = Set(slug);
        project.project_type = Set(input.project_type.as_str().to_string());
        project.location = Set(location);
        project.city = Set(city);
        project.state = Set(state);
        if let Some(country) = country {
            project.country = Set(country);
        }
        project.latitude = Set(input.latitude);
        project.longitude = Set(input.longitude);
        project.description = Set(input.description);
        project.scope = Set(input.scope);
        project.total_units = Set(input.total_units);
        project.total_sqft = Set(input.total_sqft);
        if let Some(status) = input.project_status {
            project.project_status = Set(status.as_str().to_string());
        }
        project.start_date = Set(input.start_date);
        project.completion_date = Set(input.completion_date);
        project.expected_completion = Set(input.expected_completion);
        project.total_project_cost = Set(input.total_project_cost);
        if let Some(deployed) = input.capital_deployed {
            project.capital_deployed = Set(deployed);
        }
        project.projected_return = Set(input.projected_return);
        project.actual_return = Set(input.actual_return);
        project.occupancy_rate = Set(input.occupancy_rate);
        project.noi = Set(input.noi);
        project.sustainability_features = Set(encode_list(&input.sustainability_features));
        project.image_url = Set(input.image_url);
        project.notes = Set(input.notes);
        if let Some(is_public) = input.is_public {
            project.is_public = Set(is_public);
        }

        let project = project
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::from_db("create project", e))?;

        self.audit
            .record(
                ctx,
                AuditEvent::new("CREATE_PROJECT", "project", project.id).after(&project),
            )
            .await;

        info!(project_id = project.id, slug = %project.slug, "created project");
        Ok(project)
    }

    /// Partial update; unsupplied fields keep their stored values.
    pub async fn update_project(
        &self,
        ctx: &RequestContext,
        project_id: i32,
        patch: ProjectPatch,
    ) -> CoreResult<projects::Model> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        if patch.is_empty() {
            return Err(CoreError::invalid_input("No fields to update"));
        }

        let name = patch
            .name
            .as_deref()
            .map(|v| ValidationService::validate_name("name", v))
            .transpose()?;
        // Slugs are published in URLs and stay fixed after creation.
        if patch.slug.is_some() {
            return Err(CoreError::invalid_field("slug", "slug cannot be changed"));
        }
        let location = patch
            .location
            .as_deref()
            .map(|v| ValidationService::validate_name("location", v))
            .transpose()?;
        let city = patch
            .city
            .as_deref()
            .map(|v| ValidationService::validate_name("city", v))
            .transpose()?;
        let state = patch
            .state
            .as_deref()
            .map(|v| ValidationService::validate_name("state", v))
            .transpose()?;
        let country = patch
            .country
            .as_deref()
            .map(|v| ValidationService::validate_name("country", v))
            .transpose()?;
        ValidationService::validate_coordinates(patch.latitude, patch.longitude)?;
        validate_metrics(
            patch.total_units,
            patch.total_sqft,
            patch.total_project_cost,
            patch.capital_deployed,
            patch.occupancy_rate,
        )?;

        let before = self.find_project(project_id).await?;
        let mut project: projects::ActiveModel = before.clone().into();

        if let Some(name) = name {
            project.name = Set(name);
        }
        if let Some(project_type) = patch.project_type {
            project.project_type = Set(project_type.as_str().to_string());
        }
        if let Some(location) = location {
            project.location = Set(location);
        }
        if let Some(city) = city {
            project.city = Set(city);
        }
        if let Some(state) = state {
            project.state = Set(state);
        }
        if let Some(country) = country {
            project.country = Set(country);
        }
        if let Some(latitude) = patch.latitude {
            project.latitude = Set(Some(latitude));
        }
        if let Some(longitude) = patch.longitude {
            project.longitude = Set(Some(longitude));
        }
        if let Some(description) = patch.description {
            project.description = Set(Some(description));
        }
        if let Some(scope) = patch.scope {
            project.scope = Set(Some(scope));
        }
        if let Some(units) = patch.total_units {
            project.total_units = Set(Some(units));
        }
        if let Some(sqft) = patch.total_sqft {
            project.total_sqft = Set(Some(sqft));
        }
        if let Some(status) = patch.project_status {
            project.project_status = Set(status.as_str().to_string());
        }
        if let Some(date) = patch.start_date {
            project.start_date = Set(Some(date));
        }
        if let Some(date) = patch.completion_date {
            project.completion_date = Set(Some(date));
        }
        if let Some(date) = patch.expected_completion {
            project.expected_completion = Set(Some(date));
        }
        if let Some(cost) = patch.total_project_cost {
            project.total_project_cost = Set(Some(cost));
        }
        if let Some(deployed) = patch.capital_deployed {
            project.capital_deployed = Set(deployed);
        }
        if let Some(projected) = patch.projected_return {
            project.projected_return = Set(Some(projected));
        }
        if let Some(actual) = patch.actual_return {
            project.actual_return = Set(Some(actual));
        }
        if let Some(occupancy) = patch.occupancy_rate {
            project.occupancy_rate = Set(Some(occupancy));
        }
        if let Some(noi) = patch.noi {
            project.noi = Set(Some(noi));
        }
        if let Some(features) = patch.sustainability_features {
            project.sustainability_features = Set(encode_list(&features));
        }
        if let Some(image_url) = patch.image_url {
            project.image_url = Set(Some(image_url));
        }
        if let Some(notes) = patch.notes {
            project.notes = Set(Some(notes));
        }
        if let Some(is_public) = patch.is_public {
            project.is_public = Set(is_public);
        }

        let after = project
            .set_updated_at()
            .update(&self.db)
            .await
            .map_err(|e| CoreError::from_db("update project", e))?;

        self.audit
            .record(
                ctx,
                AuditEvent::new("UPDATE_PROJECT", "project", project_id)
                    .before(&before)
                    .after(&after),
            )
            .await;

        info!(project_id, "updated project");
        Ok(after)
    }

    /// Delete a project and everything hanging off it.
    ///
    /// Children go first inside one transaction, so a failure part way leaves
    /// the project and all of its children in place. Stored document objects
    /// are removed after commit on a best-effort basis.
    pub async fn delete_project(&self, ctx: &RequestContext, project_id: i32) -> CoreResult<()> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        let before = self.find_project(project_id).await?;

        let linked_investors: BTreeSet<i32> = project_investors::Entity::find()
            .filter(project_investors::Column::ProjectId.eq(project_id))
            .all(&self.db)
            .await
            .map_err(|e| CoreError::from_db("load project investors", e))?
            .into_iter()
            .map(|link| link.investor_id)
            .collect();
        let storage_keys: Vec<String> = documents::Entity::find()
            .filter(documents::Column::ProjectId.eq(project_id))
            .all(&self.db)
            .await
            .map_err(|e| CoreError::from_db("load project documents", e))?
            .into_iter()
            .map(|document| document.storage_key)
            .collect();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::from_db("begin project delete", e))?;

        capital_stack_layers::Entity::delete_many()
            .filter(capital_stack_layers::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await
            .map_err(|e| CoreError::from_db("delete capital stack layers", e))?;
        project_investors::Entity::delete_many()
            .filter(project_investors::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await
            .map_err(|e| CoreError::from_db("delete project investors", e))?;
        project_updates::Entity::delete_many()
            .filter(project_updates::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await
            .map_err(|e| CoreError::from_db("delete project updates", e))?;
        documents::Entity::delete_many()
            .filter(documents::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await
            .map_err(|e| CoreError::from_db("delete project documents", e))?;
        projects::Entity::delete_by_id(project_id)
            .exec(&txn)
            .await
            .map_err(|e| CoreError::from_db("delete project", e))?;

        txn.commit()
            .await
            .map_err(|e| CoreError::from_db("commit project delete", e))?;

        for key in &storage_keys {
            if let Err(err) = self.store.delete(key).await {
                warn!(project_id, key = %key, error = %err, "failed to delete stored object");
            }
        }
        for investor_id in linked_investors {
            reconcile_total_deployed(&self.db, investor_id).await;
        }

        self.audit
            .record(
                ctx,
                AuditEvent::new("DELETE_PROJECT", "project", project_id).before(&before),
            )
            .await;

        info!(project_id, documents = storage_keys.len(), "deleted project");
        Ok(())
    }
}
