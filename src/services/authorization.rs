use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::auth::{Actor, InvestorQualification};
use crate::database::entities::{investors, user_sessions, users};
use crate::errors::{CoreError, CoreResult};

/// Resolves bearer sessions into access-control actors.
#[derive(Clone, Debug)]
pub struct AuthorizationService {
    db: DatabaseConnection,
}

impl AuthorizationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get user from session ID
    pub async fn get_user_from_session(&self, session_id: &str) -> CoreResult<users::Model> {
        let session = user_sessions::Entity::find()
            .filter(user_sessions::Column::SessionId.eq(session_id))
            .filter(user_sessions::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find session", e))?
            .ok_or_else(|| CoreError::unauthorized("Invalid or expired session"))?;

        if session.expires_at <= Utc::now() {
            return Err(CoreError::unauthorized("Session expired"));
        }

        let user = users::Entity::find_by_id(session.user_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find session user", e))?
            .ok_or_else(|| CoreError::unauthorized("Invalid or expired session"))?;

        if !user.is_active {
            return Err(CoreError::unauthorized("Account is deactivated"));
        }

        Ok(user)
    }

    /// Qualification of the active investor record linked to a user, if any.
    pub async fn investor_qualification(
        &self,
        user_id: i32,
    ) -> CoreResult<Option<InvestorQualification>> {
        let investor = investors::Entity::find()
            .filter(investors::Column::UserId.eq(user_id))
            .filter(investors::Column::IsActive.eq(true))
            .order_by_desc(investors::Column::UpdatedAt)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find investor for user", e))?;

        match investor {
            Some(investor) => Ok(Some(InvestorQualification::new(
                investor.investment_stage()?,
                investor.accreditation_status()?,
            ))),
            None => Ok(None),
        }
    }

    /// Build the actor for an optional bearer token.
    ///
    /// No token means an anonymous caller; a token that does not resolve is an
    /// error rather than a silent downgrade.
    pub async fn resolve_actor(&self, session_id: Option<&str>) -> CoreResult<Actor> {
        let Some(session_id) = session_id else {
            return Ok(Actor::anonymous());
        };

        let user = self.get_user_from_session(session_id).await?;
        if user.is_admin() {
            return Ok(Actor::admin(user.id));
        }

        let actor = Actor::user(user.id);
        Ok(match self.investor_qualification(user.id).await? {
            Some(qualification) => actor.with_qualification(qualification),
            None => actor,
        })
    }
}
