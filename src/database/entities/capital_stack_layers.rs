use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use crate::errors::CoreResult;

string_enum! {
    LayerType {
        SeniorDebt => "senior_debt",
        MezzanineDebt => "mezzanine_debt",
        Equity => "equity",
        PreferredEquity => "preferred_equity",
        TaxCredits => "tax_credits",
        Grants => "grants",
        AlternativeFinancing => "alternative_financing",
        Other => "other",
    }
}

string_enum! {
    FundingStatus {
        Committed => "committed",
        Funded => "funded",
        PartiallyFunded => "partially_funded",
        Pending => "pending",
    }
}

string_enum! {
    ReturnType {
        Fixed => "fixed",
        Variable => "variable",
        EquityKicker => "equity_kicker",
        PerformanceBased => "performance_based",
    }
}

/// One tranche of a project's financing. `layer_order` is unique per project;
/// lower values are more senior.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "capital_stack_layers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub layer_name: String,
    pub layer_type: String,
    pub layer_order: i32,
    pub amount: f64,
    pub interest_rate: Option<f64>,
    pub term_months: Option<i32>,
    pub maturity_date: Option<ChronoDateTimeUtc>,
    pub expected_return: Option<f64>,
    pub return_type: Option<String>,
    pub source_investor_id: Option<i32>,
    pub source_description: Option<String>,
    pub funding_status: String,
    pub funded_amount: f64,
    pub funded_date: Option<ChronoDateTimeUtc>,
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub covenants: String, // JSON array stored as string
    pub notes: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_delete = "Cascade"
    )]
    Projects,
    #[sea_orm(
        belongs_to = "super::investors::Entity",
        from = "Column::SourceInvestorId",
        to = "super::investors::Column::Id",
        on_delete = "SetNull"
    )]
    SourceInvestor,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new(project_id: i32) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: ActiveValue::NotSet,
            project_id: Set(project_id),
            layer_name: ActiveValue::NotSet,
            layer_type: ActiveValue::NotSet,
            layer_order: ActiveValue::NotSet,
            amount: ActiveValue::NotSet,
            interest_rate: Set(None),
            term_months: Set(None),
            maturity_date: Set(None),
            expected_return: Set(None),
            return_type: Set(None),
            source_investor_id: Set(None),
            source_description: Set(None),
            funding_status: Set(FundingStatus::Pending.as_str().to_string()),
            funded_amount: Set(0.0),
            funded_date: Set(None),
            covenants: Set("[]".to_string()),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

impl Model {
    pub fn layer_type(&self) -> CoreResult<LayerType> {
        self.layer_type.parse()
    }

    pub fn funding_status(&self) -> CoreResult<FundingStatus> {
        self.funding_status.parse()
    }

    pub fn covenants(&self) -> Vec<String> {
        super::decode_list(&self.covenants)
    }
}
