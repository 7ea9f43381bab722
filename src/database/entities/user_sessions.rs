use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub session_id: String,
    pub user_id: i32,
    pub is_active: bool,
    pub created_at: ChronoDateTimeUtc,
    pub expires_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new(user_id: i32, ttl: chrono::Duration) -> Self {
        let now = chrono::Utc::now();

        Self {
            id: ActiveValue::NotSet,
            session_id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(user_id),
            is_active: Set(true),
            created_at: Set(now),
            expires_at: Set(now + ttl),
        }
    }
}

impl Model {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= chrono::Utc::now()
    }
}
