use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use crate::errors::CoreResult;

string_enum! {
    ProjectType {
        MixedUse => "mixed_use",
        Industrial => "industrial",
        Residential => "residential",
        Commercial => "commercial",
        Energy => "energy",
        Infrastructure => "infrastructure",
        PublicPrivate => "public_private",
        Other => "other",
    }
}

string_enum! {
    /// Lifecycle stage of a development project.
    ProjectStatus {
        Planning => "planning",
        Entitlement => "entitlement",
        Construction => "construction",
        Stabilized => "stabilized",
        Exited => "exited",
        OnHold => "on_hold",
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
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
    pub start_date: Option<ChronoDateTimeUtc>,
    pub completion_date: Option<ChronoDateTimeUtc>,
    pub expected_completion: Option<ChronoDateTimeUtc>,
    pub total_project_cost: Option<f64>,
    pub capital_deployed: f64,
    pub projected_return: Option<f64>,
    pub actual_return: Option<f64>,
    pub occupancy_rate: Option<f64>,
    pub noi: Option<f64>,
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub sustainability_features: String, // JSON array stored as string
    pub image_url: Option<String>,
    pub notes: Option<String>,
    pub is_public: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::capital_stack_layers::Entity")]
    CapitalStackLayers,
    #[sea_orm(has_many = "super::project_investors::Entity")]
    ProjectInvestors,
    #[sea_orm(has_many = "super::project_updates::Entity")]
    ProjectUpdates,
    #[sea_orm(has_many = "super::documents::Entity")]
    Documents,
}

impl Related<super::capital_stack_layers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CapitalStackLayers.def()
    }
}

impl Related<super::project_investors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectInvestors.def()
    }
}

impl Related<super::project_updates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectUpdates.def()
    }
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::NotSet,
            slug: ActiveValue::NotSet,
            project_type: ActiveValue::NotSet,
            location: ActiveValue::NotSet,
            city: ActiveValue::NotSet,
            state: ActiveValue::NotSet,
            country: Set("USA".to_string()),
            latitude: Set(None),
            longitude: Set(None),
            description: Set(None),
            scope: Set(None),
            total_units: Set(None),
            total_sqft: Set(None),
            project_status: Set(ProjectStatus::Planning.as_str().to_string()),
            start_date: Set(None),
            completion_date: Set(None),
            expected_completion: Set(None),
            total_project_cost: Set(None),
            capital_deployed: Set(0.0),
            projected_return: Set(None),
            actual_return: Set(None),
            occupancy_rate: Set(None),
            noi: Set(None),
            sustainability_features: Set("[]".to_string()),
            image_url: Set(None),
            notes: Set(None),
            is_public: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    pub fn set_updated_at(mut self) -> Self {
        self.updated_at = Set(chrono::Utc::now());
        self
    }
}

impl Model {
    pub fn project_type(&self) -> CoreResult<ProjectType> {
        self.project_type.parse()
    }

    pub fn project_status(&self) -> CoreResult<ProjectStatus> {
        self.project_status.parse()
    }

    pub fn sustainability_features(&self) -> Vec<String> {
        super::decode_list(&self.sustainability_features)
    }
}
