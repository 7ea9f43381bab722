use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use crate::errors::CoreResult;

string_enum! {
    DocumentType {
        TermSheet => "term_sheet",
        FinancialReport => "financial_report",
        LegalDocument => "legal_document",
        OperationalReport => "operational_report",
        RiskAssessment => "risk_assessment",
        MarketAnalysis => "market_analysis",
        TrackRecord => "track_record",
        Other => "other",
    }
}

string_enum! {
    /// Minimum privilege needed to request a download URL.
    AccessLevel {
        Public => "public",
        QualifiedInvestors => "qualified_investors",
        PortfolioInvestors => "portfolio_investors",
        Admin => "admin",
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: Option<i32>,
    pub title: String,
    pub document_type: String,
    pub access_level: String,
    pub file_url: String,
    pub storage_key: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub version: i32,
    pub previous_version_id: Option<i32>,
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub tags: String, // JSON array stored as string
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
        belongs_to = "Entity",
        from = "Column::PreviousVersionId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    PreviousVersion,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new(project_id: Option<i32>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: ActiveValue::NotSet,
            project_id: Set(project_id),
            title: ActiveValue::NotSet,
            document_type: ActiveValue::NotSet,
            access_level: Set(AccessLevel::Admin.as_str().to_string()),
            file_url: ActiveValue::NotSet,
            storage_key: ActiveValue::NotSet,
            file_size: Set(None),
            file_type: Set(None),
            version: Set(1),
            previous_version_id: Set(None),
            description: Set(None),
            tags: Set("[]".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

impl Model {
    pub fn document_type(&self) -> CoreResult<DocumentType> {
        self.document_type.parse()
    }

    pub fn access_level(&self) -> CoreResult<AccessLevel> {
        self.access_level.parse()
    }

    pub fn tags(&self) -> Vec<String> {
        super::decode_list(&self.tags)
    }
}
