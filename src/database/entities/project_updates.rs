use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use crate::errors::CoreResult;

string_enum! {
    UpdateType {
        Milestone => "milestone",
        Financial => "financial",
        Operational => "operational",
        Risk => "risk",
        Regulatory => "regulatory",
        Construction => "construction",
        Market => "market",
        General => "general",
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_updates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub update_type: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub financial_impact: Option<f64>,
    pub timeline_impact_days: Option<i32>,
    pub is_public: bool,
    pub notify_investors: bool,
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub attachment_urls: String, // JSON array stored as string
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
            update_type: ActiveValue::NotSet,
            title: ActiveValue::NotSet,
            description: ActiveValue::NotSet,
            financial_impact: Set(None),
            timeline_impact_days: Set(None),
            is_public: Set(false),
            notify_investors: Set(true),
            attachment_urls: Set("[]".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

impl Model {
    pub fn update_type(&self) -> CoreResult<UpdateType> {
        self.update_type.parse()
    }

    pub fn attachment_urls(&self) -> Vec<String> {
        super::decode_list(&self.attachment_urls)
    }
}
