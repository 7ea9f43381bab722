use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use crate::errors::CoreResult;

string_enum! {
    InquiryType {
        InvestorPortalAccess => "investor_portal_access",
        Partnership => "partnership",
        ProjectInquiry => "project_inquiry",
        General => "general",
        Other => "other",
    }
}

string_enum! {
    /// Triage state of an inbound inquiry.
    ContactStatus {
        New => "new",
        Contacted => "contacted",
        Qualified => "qualified",
        Disqualified => "disqualified",
        Converted => "converted",
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investor_contacts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub inquiry_type: String,
    pub message: Option<String>,
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub interested_project_ids: String, // JSON array stored as string
    pub investment_range: Option<String>,
    pub status: String,
    pub assigned_to: Option<i32>,
    pub notes: Option<String>,
    pub follow_up_date: Option<ChronoDateTimeUtc>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::NotSet,
            email: ActiveValue::NotSet,
            phone: Set(None),
            company: Set(None),
            inquiry_type: ActiveValue::NotSet,
            message: Set(None),
            interested_project_ids: Set("[]".to_string()),
            investment_range: Set(None),
            status: Set(ContactStatus::New.as_str().to_string()),
            assigned_to: Set(None),
            notes: Set(None),
            follow_up_date: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

impl Model {
    pub fn inquiry_type(&self) -> CoreResult<InquiryType> {
        self.inquiry_type.parse()
    }

    pub fn status(&self) -> CoreResult<ContactStatus> {
        self.status.parse()
    }

    pub fn interested_project_ids(&self) -> Vec<i32> {
        super::decode_list(&self.interested_project_ids)
    }
}
