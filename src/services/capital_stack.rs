//! Capital stack aggregation and layer management.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{Authorizer, Operation, RequestContext};
use crate::database::entities::capital_stack_layers::{
    self, FundingStatus, LayerType, ReturnType,
};
use crate::database::entities::{encode_list, projects};
use crate::errors::{degrade_read, CoreError, CoreResult};
use crate::services::audit_service::{AuditEvent, AuditService};
use crate::services::ValidationService;

/// A layer annotated with its share of the stack total.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayerView {
    #[serde(flatten)]
    pub layer: capital_stack_layers::Model,
    pub percentage: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CapitalStackView {
    pub layers: Vec<LayerView>,
    pub total: f64,
}

/// Order layers by `layer_order` and attach each one's percentage of the total.
///
/// Equal orders keep their input order. A zero total yields 0% for every layer.
pub fn aggregate(mut layers: Vec<capital_stack_layers::Model>) -> CapitalStackView {
    layers.sort_by_key(|layer| layer.layer_order);

    let total: f64 = layers.iter().map(|layer| layer.amount).sum();
    let layers = layers
        .into_iter()
        .map(|layer| {
            let percentage = if total == 0.0 {
                0.0
            } else {
                layer.amount / total * 100.0
            };
            LayerView { layer, percentage }
        })
        .collect();

    CapitalStackView { layers, total }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewCapitalStackLayer {
    pub project_id: i32,
    pub layer_name: String,
    pub layer_type: LayerType,
    pub layer_order: i32,
    pub amount: f64,
    pub interest_rate: Option<f64>,
    pub term_months: Option<i32>,
    pub maturity_date: Option<DateTime<Utc>>,
    pub expected_return: Option<f64>,
    pub return_type: Option<ReturnType>,
    pub source_investor_id: Option<i32>,
    pub source_description: Option<String>,
    pub funding_status: Option<FundingStatus>,
    pub funded_amount: Option<f64>,
    pub funded_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub covenants: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CapitalStackLayerPatch {
    pub layer_name: Option<String>,
    pub layer_type: Option<LayerType>,
    pub layer_order: Option<i32>,
    pub amount: Option<f64>,
    pub interest_rate: Option<f64>,
    pub term_months: Option<i32>,
    pub maturity_date: Option<DateTime<Utc>>,
    pub expected_return: Option<f64>,
    pub return_type: Option<ReturnType>,
    pub source_investor_id: Option<i32>,
    pub source_description: Option<String>,
    pub funding_status: Option<FundingStatus>,
    pub funded_amount: Option<f64>,
    pub funded_date: Option<DateTime<Utc>>,
    pub covenants: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl CapitalStackLayerPatch {
    pub fn is_empty(&self) -> bool {
        self.layer_name.is_none()
            && self.layer_type.is_none()
            && self.layer_order.is_none()
            && self.amount.is_none()
            && self.interest_rate.is_none()
            && self.term_months.is_none()
            && self.maturity_date.is_none()
            && self.expected_return.is_none()
            && self.return_type.is_none()
            && self.source_investor_id.is_none()
            && self.source_description.is_none()
            && self.funding_status.is_none()
            && self.funded_amount.is_none()
            && self.funded_date.is_none()
            && self.covenants.is_none()
            && self.notes.is_none()
    }
}

fn validate_terms(
    interest_rate: Option<f64>,
    expected_return: Option<f64>,
    term_months: Option<i32>,
) -> CoreResult<()> {
    if let Some(rate) = interest_rate {
        ValidationService::validate_percentage("interest_rate", rate)?;
    }
    if let Some(expected) = expected_return {
        ValidationService::validate_percentage("expected_return", expected)?;
    }
    if matches!(term_months, Some(months) if months < 0) {
        return Err(CoreError::invalid_field(
            "term_months",
            "term_months cannot be negative",
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CapitalStackService {
    db: DatabaseConnection,
    authorizer: Arc<dyn Authorizer>,
    audit: AuditService,
}

impl CapitalStackService {
    pub fn new(db: DatabaseConnection, authorizer: Arc<dyn Authorizer>, audit: AuditService) -> Self {
        Self {
            db,
            authorizer,
            audit,
        }
    }

    /// Layers of a project in priority order with computed percentages.
    ///
    /// An unknown project yields an empty stack.
    pub async fn get_capital_stack(
        &self,
        ctx: &RequestContext,
        project_id: i32,
    ) -> CoreResult<CapitalStackView> {
        self.authorizer.authorize(&ctx.actor, Operation::ReadPublic)?;

        let layers = self.load_layers(project_id).await;
        degrade_read("get capital stack", layers.map(aggregate))
    }

    pub(crate) async fn load_layers(
        &self,
        project_id: i32,
    ) -> CoreResult<Vec<capital_stack_layers::Model>> {
        capital_stack_layers::Entity::find()
            .filter(capital_stack_layers::Column::ProjectId.eq(project_id))
            .order_by_asc(capital_stack_layers::Column::LayerOrder)
            .order_by_asc(capital_stack_layers::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::from_db("load capital stack layers", e))
    }

    pub async fn get_layer(
        &self,
        ctx: &RequestContext,
        layer_id: i32,
    ) -> CoreResult<capital_stack_layers::Model> {
        self.authorizer.authorize(&ctx.actor, Operation::ReadPublic)?;
        self.find_layer(layer_id).await
    }

    async fn find_layer(&self, layer_id: i32) -> CoreResult<capital_stack_layers::Model> {
        capital_stack_layers::Entity::find_by_id(layer_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find capital stack layer", e))?
            .ok_or_else(|| CoreError::not_found("CapitalStackLayer", layer_id.to_string()))
    }

    pub async fn create_layer(
        &self,
        ctx: &RequestContext,
        input: NewCapitalStackLayer,
    ) -> CoreResult<capital_stack_layers::Model> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        let layer_name = ValidationService::validate_name("layer_name", &input.layer_name)?;
        ValidationService::validate_layer_order(input.layer_order)?;
        ValidationService::validate_amount("amount", input.amount)?;
        let funded_amount = input.funded_amount.unwrap_or(0.0);
        ValidationService::validate_funded_amount(funded_amount, input.amount)?;
        validate_terms(input.interest_rate, input.expected_return, input.term_months)?;

        projects::Entity::find_by_id(input.project_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find project", e))?
            .ok_or_else(|| CoreError::not_found("Project", input.project_id.to_string()))?;

        let mut layer = capital_stack_layers::ActiveModel::new(input.project_id);
        layer.layer_name = Set(layer_name);
        layer.layer_type = Set(input.layer_type.as_str().to_string());
        layer.layer_order = Set(input.layer_order);
        layer.amount = Set(input.amount);
        layer.interest_rate = Set(input.interest_rate);
        layer.term_months = Set(input.term_months);
        layer.maturity_date = Set(input.maturity_date);
        layer.expected_return = Set(input.expected_return);
        layer.return_type = Set(input.return_type.map(|r| r.as_str().to_string()));
        layer.source_investor_id = Set(input.source_investor_id);
        layer.source_description = Set(input.source_description);
        if let Some(status) = input.funding_status {
            layer.funding_status = Set(status.as_str().to_string());
        }
        layer.funded_amount = Set(funded_amount);
        layer.funded_date = Set(input.funded_date);
        layer.covenants = Set(encode_list(&input.covenants));
        layer.notes = Set(input.notes);

        let layer = layer
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::from_db("create capital stack layer", e))?;

        self.audit
            .record(
                ctx,
                AuditEvent::new("CREATE_CAPITAL_STACK_LAYER", "capital_stack_layer", layer.id)
                    .after(&layer),
            )
            .await;

        info!(layer_id = layer.id, project_id = layer.project_id, "created capital stack layer");
        Ok(layer)
    }

    pub async fn update_layer(
        &self,
        ctx: &RequestContext,
        layer_id: i32,
        patch: CapitalStackLayerPatch,
    ) -> CoreResult<capital_stack_layers::Model> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        if patch.is_empty() {
            return Err(CoreError::invalid_input("No fields to update"));
        }

        let layer_name = patch
            .layer_name
            .as_deref()
            .map(|name| ValidationService::validate_name("layer_name", name))
            .transpose()?;
        if let Some(order) = patch.layer_order {
            ValidationService::validate_layer_order(order)?;
        }
        if let Some(amount) = patch.amount {
            ValidationService::validate_amount("amount", amount)?;
        }
        validate_terms(patch.interest_rate, patch.expected_return, patch.term_months)?;

        let before = self.find_layer(layer_id).await?;
        let amount = patch.amount.unwrap_or(before.amount);
        let funded_amount = patch.funded_amount.unwrap_or(before.funded_amount);
        ValidationService::validate_funded_amount(funded_amount, amount)?;

        let mut layer: capital_stack_layers::ActiveModel = before.clone().into();
        if let Some(name) = layer_name {
            layer.layer_name = Set(name);
        }
        if let Some(layer_type) = patch.layer_type {
            layer.layer_type = Set(layer_type.as_str().to_string());
        }
        if let Some(order) = patch.layer_order {
            layer.layer_order = Set(order);
        }
        if patch.amount.is_some() {
            layer.amount = Set(amount);
        }
        if let Some(rate) = patch.interest_rate {
            layer.interest_rate = Set(Some(rate));
        }
        if let Some(term) = patch.term_months {
            layer.term_months = Set(Some(term));
        }
        if let Some(maturity) = patch.maturity_date {
            layer.maturity_date = Set(Some(maturity));
        }
        if let Some(expected) = patch.expected_return {
            layer.expected_return = Set(Some(expected));
        }
        if let Some(return_type) = patch.return_type {
            layer.return_type = Set(Some(return_type.as_str().to_string()));
        }
        if let Some(investor_id) = patch.source_investor_id {
            layer.source_investor_id = Set(Some(investor_id));
        }
        if let Some(description) = patch.source_description {
            layer.source_description = Set(Some(description));
        }
        if let Some(status) = patch.funding_status {
            layer.funding_status = Set(status.as_str().to_string());
        }
        if patch.funded_amount.is_some() {
            layer.funded_amount = Set(funded_amount);
        }
        if let Some(funded_date) = patch.funded_date {
            layer.funded_date = Set(Some(funded_date));
        }
        if let Some(covenants) = patch.covenants {
            layer.covenants = Set(encode_list(&covenants));
        }
        if let Some(notes) = patch.notes {
            layer.notes = Set(Some(notes));
        }
        layer.updated_at = Set(Utc::now());

        let after = layer
            .update(&self.db)
            .await
            .map_err(|e| CoreError::from_db("update capital stack layer", e))?;

        self.audit
            .record(
                ctx,
                AuditEvent::new("UPDATE_CAPITAL_STACK_LAYER", "capital_stack_layer", layer_id)
                    .before(&before)
                    .after(&after),
            )
            .await;

        info!(layer_id, "updated capital stack layer");
        Ok(after)
    }

    pub async fn delete_layer(&self, ctx: &RequestContext, layer_id: i32) -> CoreResult<()> {
        self.authorizer.authorize(&ctx.actor, Operation::ManageEntities)?;

        let before = self.find_layer(layer_id).await?;
        capital_stack_layers::Entity::delete_by_id(layer_id)
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::from_db("delete capital stack layer", e))?;

        self.audit
            .record(
                ctx,
                AuditEvent::new("DELETE_CAPITAL_STACK_LAYER", "capital_stack_layer", layer_id)
                    .before(&before),
            )
            .await;

        info!(layer_id, "deleted capital stack layer");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(id: i32, order: i32, amount: f64) -> capital_stack_layers::Model {
        let now = Utc::now();
        capital_stack_layers::Model {
            id,
            project_id: 1,
            layer_name: format!("Layer {}", id),
            layer_type: "equity".to_string(),
            layer_order: order,
            amount,
            interest_rate: None,
            term_months: None,
            maturity_date: None,
            expected_return: None,
            return_type: None,
            source_investor_id: None,
            source_description: None,
            funding_status: "pending".to_string(),
            funded_amount: 0.0,
            funded_date: None,
            covenants: "[]".to_string(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn computes_shares_of_total() {
        let view = aggregate(vec![layer(2, 2, 400.0), layer(1, 1, 600.0)]);

        assert_eq!(view.total, 1000.0);
        assert_eq!(view.layers[0].layer.id, 1);
        assert!((view.layers[0].percentage - 60.0).abs() < 1e-9);
        assert!((view.layers[1].percentage - 40.0).abs() < 1e-9);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let view = aggregate(vec![
            layer(1, 1, 1_250_000.0),
            layer(2, 2, 333.33),
            layer(3, 3, 7.0),
            layer(4, 4, 98_765.4321),
        ]);
        let sum: f64 = view.layers.iter().map(|l| l.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_gives_zero_percentages() {
        let view = aggregate(vec![layer(1, 1, 0.0), layer(2, 2, 0.0)]);
        assert_eq!(view.total, 0.0);
        assert!(view.layers.iter().all(|l| l.percentage == 0.0));
    }

    #[test]
    fn equal_orders_keep_input_order() {
        let view = aggregate(vec![
            layer(10, 2, 1.0),
            layer(11, 1, 1.0),
            layer(12, 2, 1.0),
            layer(13, 1, 1.0),
        ]);
        let ids: Vec<i32> = view.layers.iter().map(|l| l.layer.id).collect();
        assert_eq!(ids, vec![11, 13, 10, 12]);
    }

    #[test]
    fn empty_input_is_empty_stack() {
        assert_eq!(aggregate(Vec::new()), CapitalStackView::default());
    }
}
