pub mod audit_service;
pub mod authorization;
pub mod capital_stack;
pub mod contact_service;
pub mod document_service;
pub mod investor_notice_service;
pub mod investor_service;
pub mod pagination;
pub mod project_service;
pub mod project_update_service;
pub mod user_service;
pub mod validation;

pub use audit_service::AuditService;
pub use authorization::AuthorizationService;
pub use capital_stack::CapitalStackService;
pub use contact_service::ContactService;
pub use document_service::DocumentService;
pub use investor_notice_service::InvestorNoticeService;
pub use investor_service::InvestorService;
pub use pagination::{Page, PageRequest};
pub use project_service::ProjectService;
pub use project_update_service::ProjectUpdateService;
pub use user_service::UserService;
pub use validation::ValidationService;
