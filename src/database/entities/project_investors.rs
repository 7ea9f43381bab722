use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use crate::errors::CoreResult;

string_enum! {
    InvestmentStatus {
        Interested => "interested",
        Committed => "committed",
        Funded => "funded",
        Exited => "exited",
        Withdrawn => "withdrawn",
    }
}

/// One investor's commitment to one project. `(project_id, investor_id)` is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_investors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub investor_id: i32,
    pub investment_amount: f64,
    pub investment_date: ChronoDateTimeUtc,
    pub status: String,
    pub return_percentage: Option<f64>,
    pub actual_return: Option<f64>,
    pub exit_date: Option<ChronoDateTimeUtc>,
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
        from = "Column::InvestorId",
        to = "super::investors::Column::Id",
        on_delete = "Cascade"
    )]
    Investors,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::investors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new(project_id: i32, investor_id: i32, investment_amount: f64) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: ActiveValue::NotSet,
            project_id: Set(project_id),
            investor_id: Set(investor_id),
            investment_amount: Set(investment_amount),
            investment_date: Set(now),
            status: Set(InvestmentStatus::Interested.as_str().to_string()),
            return_percentage: Set(None),
            actual_return: Set(None),
            exit_date: Set(None),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

impl Model {
    pub fn status(&self) -> CoreResult<InvestmentStatus> {
        self.status.parse()
    }

    pub fn is_funded(&self) -> bool {
        matches!(self.status(), Ok(InvestmentStatus::Funded))
    }
}
