use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::{Authorizer, PolicyAuthorizer};
use crate::config::AppConfig;
use crate::notifications::{LogNotifier, Notifier};
use crate::services::{
    AuditService, AuthorizationService, CapitalStackService, ContactService, DocumentService,
    InvestorNoticeService, InvestorService, ProjectService, ProjectUpdateService, UserService,
};
use crate::storage::{LocalObjectStore, ObjectStore};

/// Shared application context exposing the services to the HTTP layer and CLI.
#[derive(Clone)]
pub struct AppContext {
    db: DatabaseConnection,
    store: Arc<dyn ObjectStore>,
    authorization: Arc<AuthorizationService>,
    users: Arc<UserService>,
    audit: Arc<AuditService>,
    capital_stack: Arc<CapitalStackService>,
    projects: Arc<ProjectService>,
    investors: Arc<InvestorService>,
    updates: Arc<ProjectUpdateService>,
    documents: Arc<DocumentService>,
    notices: Arc<InvestorNoticeService>,
    contacts: Arc<ContactService>,
}

impl AppContext {
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        let store: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(
            config.storage_root.clone(),
            config.public_base_url(),
            config.signing_secret.clone(),
        ));
        Self::with_collaborators(db, config, store, Arc::new(LogNotifier))
    }

    pub fn with_collaborators(
        db: DatabaseConnection,
        config: &AppConfig,
        store: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let authorizer: Arc<dyn Authorizer> = Arc::new(PolicyAuthorizer);
        let audit = AuditService::new(db.clone(), authorizer.clone());
        let capital_stack =
            CapitalStackService::new(db.clone(), authorizer.clone(), audit.clone());

        let projects = ProjectService::new(
            db.clone(),
            authorizer.clone(),
            audit.clone(),
            capital_stack.clone(),
            store.clone(),
        );
        let investors = InvestorService::new(db.clone(), authorizer.clone(), audit.clone());
        let updates = ProjectUpdateService::new(
            db.clone(),
            authorizer.clone(),
            audit.clone(),
            notifier.clone(),
        );
        let notices = InvestorNoticeService::new(
            db.clone(),
            authorizer.clone(),
            audit.clone(),
            notifier.clone(),
        );
        let documents = DocumentService::new(
            db.clone(),
            authorizer.clone(),
            audit.clone(),
            store.clone(),
            notices.clone(),
            config.download_url_ttl(),
        );
        let contacts = ContactService::new(db.clone(), authorizer, audit.clone(), notifier);

        Self {
            authorization: Arc::new(AuthorizationService::new(db.clone())),
            users: Arc::new(UserService::new(db.clone(), config.session_ttl())),
            audit: Arc::new(audit),
            capital_stack: Arc::new(capital_stack),
            projects: Arc::new(projects),
            investors: Arc::new(investors),
            updates: Arc::new(updates),
            documents: Arc::new(documents),
            notices: Arc::new(notices),
            contacts: Arc::new(contacts),
            store,
            db,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn store(&self) -> Arc<dyn ObjectStore> {
        self.store.clone()
    }

    pub fn authorization(&self) -> &AuthorizationService {
        &self.authorization
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn audit(&self) -> &AuditService {
        &self.audit
    }

    pub fn capital_stack(&self) -> &CapitalStackService {
        &self.capital_stack
    }

    pub fn projects(&self) -> &ProjectService {
        &self.projects
    }

    pub fn investors(&self) -> &InvestorService {
        &self.investors
    }

    pub fn updates(&self) -> &ProjectUpdateService {
        &self.updates
    }

    pub fn documents(&self) -> &DocumentService {
        &self.documents
    }

    pub fn notices(&self) -> &InvestorNoticeService {
        &self.notices
    }

    pub fn contacts(&self) -> &ContactService {
        &self.contacts
    }
}
