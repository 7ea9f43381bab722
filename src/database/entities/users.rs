use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use crate::errors::CoreResult;

string_enum! {
    /// Account role used as the access-control subject.
    UserRole {
        User => "user",
        Admin => "admin",
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub display_name: String,
    pub role: String, // "user", "admin"
    pub is_active: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
    pub last_signed_in: Option<ChronoDateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_sessions::Entity")]
    UserSessions,
    #[sea_orm(has_many = "super::investors::Entity")]
    Investors,
}

impl Related<super::user_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserSessions.def()
    }
}

impl Related<super::investors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            id: ActiveValue::NotSet,
            email: ActiveValue::NotSet,
            display_name: ActiveValue::NotSet,
            role: Set(UserRole::User.as_str().to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            last_signed_in: ActiveValue::NotSet,
        }
    }

    pub fn set_last_signed_in(mut self) -> Self {
        self.last_signed_in = Set(Some(chrono::Utc::now()));
        self
    }
}

impl Model {
    pub fn role(&self) -> CoreResult<UserRole> {
        self.role.parse()
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role(), Ok(UserRole::Admin))
    }
}
