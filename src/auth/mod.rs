//! Access-control gate.
//!
//! Every service call is checked against [`decide`] before the repository is
//! touched. The decision is a pure function of the caller and the operation
//! class; the only resource attribute it looks at is a document's access tier.

use tracing::debug;

use crate::database::entities::documents::AccessLevel;
use crate::database::entities::investors::{AccreditationStatus, InvestmentStage};
use crate::errors::{CoreError, CoreResult};

/// The subject of an access decision.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Anonymous,
    User,
    Admin,
}

/// Qualification state of the investor record attached to a user account.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvestorQualification {
    pub stage: InvestmentStage,
    pub accreditation: AccreditationStatus,
}

impl InvestorQualification {
    pub fn new(stage: InvestmentStage, accreditation: AccreditationStatus) -> Self {
        Self {
            stage,
            accreditation,
        }
    }

    fn is_verified(&self) -> bool {
        self.accreditation == AccreditationStatus::Verified
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Actor {
    pub user_id: Option<i32>,
    role: Role,
    qualification: Option<InvestorQualification>,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            role: Role::Anonymous,
            qualification: None,
        }
    }

    pub fn user(user_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
            role: Role::User,
            qualification: None,
        }
    }

    pub fn admin(user_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
            role: Role::Admin,
            qualification: None,
        }
    }

    pub fn with_qualification(mut self, qualification: InvestorQualification) -> Self {
        self.qualification = Some(qualification);
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn qualification(&self) -> Option<InvestorQualification> {
        self.qualification
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_authenticated(&self) -> bool {
        self.role != Role::Anonymous
    }
}

/// Operation classes the gate knows how to decide.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    /// Public project and investor summaries, capital stacks, public updates.
    ReadPublic,
    /// Full project financials and full investor profiles.
    ReadSensitive,
    /// Create, update or delete projects, investors, layers, links, updates
    /// and inquiry records.
    ManageEntities,
    /// Upload or delete documents and list every document.
    ManageDocuments,
    /// Request a download URL for a document of the given tier.
    RequestDocumentUrl(AccessLevel),
    /// Read the audit trail.
    ReadAuditLog,
    /// Submit a contact inquiry.
    SubmitInquiry,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ReadPublic => "read_public",
            Operation::ReadSensitive => "read_sensitive",
            Operation::ManageEntities => "manage_entities",
            Operation::ManageDocuments => "manage_documents",
            Operation::RequestDocumentUrl(_) => "request_document_url",
            Operation::ReadAuditLog => "read_audit_log",
            Operation::SubmitInquiry => "submit_inquiry",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    Allow,
    Deny,
}

/// The policy table.
pub fn decide(actor: &Actor, operation: Operation) -> Decision {
    use Decision::{Allow, Deny};

    let allowed = match (actor.role(), operation) {
        (_, Operation::ReadPublic) | (_, Operation::SubmitInquiry) => true,

        (Role::Anonymous, Operation::ReadSensitive) => false,
        (Role::User | Role::Admin, Operation::ReadSensitive) => true,

        (Role::Admin, Operation::ManageEntities)
        | (Role::Admin, Operation::ManageDocuments)
        | (Role::Admin, Operation::ReadAuditLog) => true,
        (_, Operation::ManageEntities)
        | (_, Operation::ManageDocuments)
        | (_, Operation::ReadAuditLog) => false,

        (Role::Anonymous, Operation::RequestDocumentUrl(_)) => false,
        (Role::Admin, Operation::RequestDocumentUrl(_)) => true,
        (Role::User, Operation::RequestDocumentUrl(level)) => tier_satisfied(actor, level),
    };

    if allowed {
        Allow
    } else {
        Deny
    }
}

/// Whether the caller's role and investor qualification reach a document tier.
///
/// This is the tier check on its own; callers still need the operation-level
/// decision (anonymous callers never receive download URLs).
pub fn tier_satisfied(actor: &Actor, level: AccessLevel) -> bool {
    actor.is_admin() || qualification_satisfies(actor.qualification(), level)
}

/// Tier check for a non-admin holder of `qualification`. Also used to pick
/// which investors hear about a new document.
pub fn qualification_satisfies(
    qualification: Option<InvestorQualification>,
    level: AccessLevel,
) -> bool {
    match level {
        AccessLevel::Public => true,
        AccessLevel::Admin => false,
        AccessLevel::QualifiedInvestors => qualification.is_some_and(|q| {
            q.is_verified()
                && matches!(
                    q.stage,
                    InvestmentStage::Qualified
                        | InvestmentStage::Active
                        | InvestmentStage::Portfolio
                )
        }),
        AccessLevel::PortfolioInvestors => qualification
            .is_some_and(|q| q.is_verified() && q.stage == InvestmentStage::Portfolio),
    }
}

pub trait Authorizer: Send + Sync {
    fn authorize(&self, actor: &Actor, operation: Operation) -> CoreResult<()>;
}

/// Authorizer backed by [`decide`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PolicyAuthorizer;

impl Authorizer for PolicyAuthorizer {
    fn authorize(&self, actor: &Actor, operation: Operation) -> CoreResult<()> {
        match decide(actor, operation) {
            Decision::Allow => Ok(()),
            Decision::Deny => {
                debug!(
                    user_id = ?actor.user_id,
                    role = ?actor.role(),
                    operation = operation.name(),
                    "access denied"
                );
                Err(CoreError::unauthorized("access denied"))
            }
        }
    }
}

/// Caller identity plus request origin, threaded through every service call.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub actor: Actor,
    pub origin_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            origin_ip: None,
            user_agent: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(Actor::anonymous())
    }

    pub fn with_origin(mut self, origin_ip: Option<String>, user_agent: Option<String>) -> Self {
        self.origin_ip = origin_ip;
        self.user_agent = user_agent;
        self
    }
}
