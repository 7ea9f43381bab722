//! Shared fixtures for integration tests: a migrated SQLite file, a
//! temporary object store and a notifier that records what it was asked
//! to send.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use guardian::app_context::AppContext;
use guardian::auth::{Actor, RequestContext};
use guardian::config::AppConfig;
use guardian::database::entities::capital_stack_layers::LayerType;
use guardian::database::entities::projects::{self, ProjectType};
use guardian::database::entities::users::UserRole;
use guardian::database::migrations::Migrator;
use guardian::errors::CoreResult;
use guardian::notifications::{Notification, Notifier};
use guardian::services::capital_stack::NewCapitalStackLayer;
use guardian::services::project_service::NewProject;
use guardian::storage::{LocalObjectStore, ObjectStore};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tempfile::{NamedTempFile, TempDir};

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: Notification) -> CoreResult<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification);
        }
        Ok(())
    }
}

pub struct TestApp {
    pub context: AppContext,
    pub db: DatabaseConnection,
    pub notifier: Arc<RecordingNotifier>,
    pub admin: RequestContext,
    pub user: RequestContext,
    pub admin_token: String,
    pub user_token: String,
    _db_file: NamedTempFile,
    _storage: TempDir,
}

pub fn test_config(storage: &TempDir) -> AppConfig {
    AppConfig {
        storage_root: storage.path().to_path_buf(),
        public_base_url: Some("http://portal.test".to_string()),
        signing_secret: "test-secret".to_string(),
        ..AppConfig::default()
    }
}

/// Build a fully migrated context with one admin and one plain user.
pub async fn setup() -> Result<TestApp> {
    let db_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", db_file.path().display());
    let db = Database::connect(&db_url).await?;
    Migrator::up(&db, None).await?;

    let storage = TempDir::new()?;
    let config = test_config(&storage);
    let store: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(
        config.storage_root.clone(),
        config.public_base_url(),
        config.signing_secret.clone(),
    ));
    let notifier = Arc::new(RecordingNotifier::default());
    let context = AppContext::with_collaborators(db.clone(), &config, store, notifier.clone());

    let admin = context
        .users()
        .create_user("admin@guardian.test", "Admin", UserRole::Admin)
        .await?;
    let user = context
        .users()
        .create_user("user@guardian.test", "Regular User", UserRole::User)
        .await?;
    let admin_token = context
        .users()
        .issue_session("admin@guardian.test")
        .await?
        .session_id;
    let user_token = context
        .users()
        .issue_session("user@guardian.test")
        .await?
        .session_id;

    Ok(TestApp {
        context,
        db,
        notifier,
        admin: RequestContext::new(Actor::admin(admin.id)),
        user: RequestContext::new(Actor::user(user.id)),
        admin_token,
        user_token,
        _db_file: db_file,
        _storage: storage,
    })
}

/// A connection whose pool has already been shut down, so every query fails
/// to acquire a connection.
pub async fn closed_store() -> Result<(DatabaseConnection, NamedTempFile)> {
    let db_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", db_file.path().display());
    let db = Database::connect(&db_url).await?;
    let handle = db.clone();
    db.close().await?;
    Ok((handle, db_file))
}

pub fn new_project(slug: &str) -> NewProject {
    NewProject {
        name: format!("Project {}", slug),
        slug: slug.to_string(),
        project_type: ProjectType::MixedUse,
        location: "100 Main Street".to_string(),
        city: "Portland".to_string(),
        state: "OR".to_string(),
        country: None,
        latitude: None,
        longitude: None,
        description: Some("Mixed-use redevelopment".to_string()),
        scope: None,
        total_units: Some(120),
        total_sqft: None,
        project_status: None,
        start_date: None,
        completion_date: None,
        expected_completion: None,
        total_project_cost: Some(1_000_000.0),
        capital_deployed: None,
        projected_return: Some(12.5),
        actual_return: None,
        occupancy_rate: None,
        noi: None,
        sustainability_features: vec!["solar".to_string()],
        image_url: None,
        notes: None,
        is_public: Some(true),
    }
}

pub fn new_layer(project_id: i32, name: &str, order: i32, amount: f64) -> NewCapitalStackLayer {
    NewCapitalStackLayer {
        project_id,
        layer_name: name.to_string(),
        layer_type: LayerType::SeniorDebt,
        layer_order: order,
        amount,
        interest_rate: None,
        term_months: None,
        maturity_date: None,
        expected_return: None,
        return_type: None,
        source_investor_id: None,
        source_description: None,
        funding_status: None,
        funded_amount: None,
        funded_date: None,
        covenants: Vec::new(),
        notes: None,
    }
}

pub async fn seed_project(app: &TestApp, slug: &str) -> Result<projects::Model> {
    Ok(app
        .context
        .projects()
        .create_project(&app.admin, new_project(slug))
        .await?)
}
