use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use crate::errors::CoreResult;

string_enum! {
    EntityType {
        Individual => "individual",
        FamilyOffice => "family_office",
        Institutional => "institutional",
        Spv => "spv",
        Jv => "jv",
        Partnership => "partnership",
        Corporation => "corporation",
    }
}

string_enum! {
    /// Where an investor sits in the relationship pipeline.
    InvestmentStage {
        PreQualification => "pre_qualification",
        Qualified => "qualified",
        Active => "active",
        Portfolio => "portfolio",
        Exited => "exited",
    }
}

string_enum! {
    AccreditationStatus {
        Pending => "pending",
        Verified => "verified",
        Expired => "expired",
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Option<i32>,
    pub name: String,
    pub entity_type: String,
    pub email: String,
    pub phone: Option<String>,
    pub organization_name: Option<String>,
    pub website: Option<String>,
    pub investment_stage: String,
    pub accreditation_status: String,
    pub minimum_investment: Option<f64>,
    pub maximum_investment: Option<f64>,
    pub total_deployed: f64,
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub focus_sectors: String, // JSON array stored as string
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub geographic_focus: String, // JSON array stored as string
    pub investment_horizon: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub last_contacted_at: Option<ChronoDateTimeUtc>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    Users,
    #[sea_orm(has_many = "super::project_investors::Entity")]
    ProjectInvestors,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::project_investors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectInvestors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            id: ActiveValue::NotSet,
            user_id: Set(None),
            name: ActiveValue::NotSet,
            entity_type: ActiveValue::NotSet,
            email: ActiveValue::NotSet,
            phone: Set(None),
            organization_name: Set(None),
            website: Set(None),
            investment_stage: Set(InvestmentStage::PreQualification.as_str().to_string()),
            accreditation_status: Set(AccreditationStatus::Pending.as_str().to_string()),
            minimum_investment: Set(None),
            maximum_investment: Set(None),
            total_deployed: Set(0.0),
            focus_sectors: Set("[]".to_string()),
            geographic_focus: Set("[]".to_string()),
            investment_horizon: Set(None),
            notes: Set(None),
            is_active: Set(true),
            last_contacted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

impl Model {
    pub fn entity_type(&self) -> CoreResult<EntityType> {
        self.entity_type.parse()
    }

    pub fn investment_stage(&self) -> CoreResult<InvestmentStage> {
        self.investment_stage.parse()
    }

    pub fn accreditation_status(&self) -> CoreResult<AccreditationStatus> {
        self.accreditation_status.parse()
    }

    pub fn focus_sectors(&self) -> Vec<String> {
        super::decode_list(&self.focus_sectors)
    }

    pub fn geographic_focus(&self) -> Vec<String> {
        super::decode_list(&self.geographic_focus)
    }
}
