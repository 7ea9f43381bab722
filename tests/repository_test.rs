//! Persistence contracts: uniqueness, cascades, audit trail and read-path
//! degradation.

mod common;

use anyhow::Result;
use common::{closed_store, new_layer, seed_project, setup};
use guardian::app_context::AppContext;
use guardian::auth::RequestContext;
use guardian::config::AppConfig;
use guardian::database::entities::documents::{AccessLevel, DocumentType};
use guardian::database::entities::investor_contacts::InquiryType;
use guardian::database::entities::investors::EntityType;
use guardian::database::entities::project_investors::InvestmentStatus;
use guardian::database::entities::project_updates::UpdateType;
use guardian::database::entities::{
    audit_logs, capital_stack_layers, documents, investors, project_investors, project_updates,
};
use guardian::errors::CoreErrorKind;
use guardian::notifications::Notification;
use guardian::services::contact_service::NewContact;
use guardian::services::document_service::UploadDocument;
use guardian::services::investor_service::{InvestmentPatch, InvestorFilter, NewInvestment, NewInvestor};
use guardian::services::project_service::{ProjectFilter, ProjectPatch};
use guardian::services::project_update_service::NewProjectUpdate;
use guardian::services::PageRequest;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

fn investor(name: &str, email: &str) -> NewInvestor {
    NewInvestor {
        user_id: None,
        name: name.to_string(),
        entity_type: EntityType::Institutional,
        email: email.to_string(),
        phone: None,
        organization_name: Some("Example Capital".to_string()),
        website: None,
        investment_stage: None,
        accreditation_status: None,
        minimum_investment: Some(50_000.0),
        maximum_investment: Some(2_000_000.0),
        focus_sectors: vec!["industrial".to_string()],
        geographic_focus: Vec::new(),
        investment_horizon: None,
        notes: None,
    }
}

fn investment(investor_id: i32, amount: f64) -> NewInvestment {
    NewInvestment {
        investor_id,
        investment_amount: amount,
        investment_date: None,
        status: None,
        return_percentage: None,
        notes: None,
    }
}

fn update(title: &str, notify: bool) -> NewProjectUpdate {
    NewProjectUpdate {
        update_type: UpdateType::Milestone,
        title: title.to_string(),
        description: "Topping out ceremony held".to_string(),
        financial_impact: None,
        timeline_impact_days: None,
        is_public: Some(true),
        notify_investors: Some(notify),
        attachment_urls: Vec::new(),
    }
}

#[tokio::test]
async fn test_duplicate_investment_conflicts() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "conflict-yard").await?;
    let investor = app
        .context
        .investors()
        .create_investor(&app.admin, investor("Oak Partners", "oak@example.com"))
        .await?;

    app.context
        .investors()
        .record_investment(&app.admin, project.id, investment(investor.id, 250_000.0))
        .await?;
    let err = app
        .context
        .investors()
        .record_investment(&app.admin, project.id, investment(investor.id, 100_000.0))
        .await
        .expect_err("second link for the same pair");

    assert_eq!(err.kind(), CoreErrorKind::Conflict);
    let links = project_investors::Entity::find()
        .filter(project_investors::Column::ProjectId.eq(project.id))
        .count(&app.db)
        .await?;
    assert_eq!(links, 1);
    Ok(())
}

#[tokio::test]
async fn test_funded_investments_roll_up_to_investor() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "rollup").await?;
    let service = app.context.investors();
    let investor = service
        .create_investor(&app.admin, investor("Birch Fund", "birch@example.com"))
        .await?;

    let link = service
        .record_investment(&app.admin, project.id, investment(investor.id, 300_000.0))
        .await?;
    let stored = investors::Entity::find_by_id(investor.id)
        .one(&app.db)
        .await?
        .expect("investor row");
    assert_eq!(stored.total_deployed, 0.0);

    service
        .update_investment(
            &app.admin,
            link.id,
            InvestmentPatch {
                status: Some(InvestmentStatus::Funded),
                ..Default::default()
            },
        )
        .await?;

    let profile = service.get_investor_full_profile(&app.user, investor.id).await?;
    assert_eq!(profile.investor.total_deployed, 300_000.0);
    assert_eq!(profile.investments.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_delete_project_cascades() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "cascade").await?;
    let other = seed_project(&app, "survivor").await?;

    app.context
        .capital_stack()
        .create_layer(&app.admin, new_layer(project.id, "Senior", 1, 700.0))
        .await?;
    app.context
        .capital_stack()
        .create_layer(&app.admin, new_layer(other.id, "Senior", 1, 700.0))
        .await?;
    let investor = app
        .context
        .investors()
        .create_investor(&app.admin, investor("Elm Trust", "elm@example.com"))
        .await?;
    app.context
        .investors()
        .record_investment(&app.admin, project.id, investment(investor.id, 10_000.0))
        .await?;
    app.context
        .updates()
        .create_project_update(&app.admin, project.id, update("Groundbreaking", false))
        .await?;
    app.context
        .documents()
        .upload_document(
            &app.admin,
            UploadDocument {
                project_id: Some(project.id),
                title: "Budget".to_string(),
                document_type: DocumentType::FinancialReport,
                access_level: Some(AccessLevel::Admin),
                content_type: None,
                bytes: b"budget".to_vec(),
                description: None,
                tags: Vec::new(),
                previous_version_id: None,
            },
        )
        .await?;

    app.context.projects().delete_project(&app.admin, project.id).await?;

    let err = app
        .context
        .projects()
        .get_project(&app.admin, project.id)
        .await
        .expect_err("deleted project");
    assert_eq!(err.kind(), CoreErrorKind::NotFound);

    let layers = capital_stack_layers::Entity::find()
        .filter(capital_stack_layers::Column::ProjectId.eq(project.id))
        .count(&app.db)
        .await?;
    let links = project_investors::Entity::find()
        .filter(project_investors::Column::ProjectId.eq(project.id))
        .count(&app.db)
        .await?;
    let updates = project_updates::Entity::find()
        .filter(project_updates::Column::ProjectId.eq(project.id))
        .count(&app.db)
        .await?;
    let docs = documents::Entity::find()
        .filter(documents::Column::ProjectId.eq(project.id))
        .count(&app.db)
        .await?;
    assert_eq!((layers, links, updates, docs), (0, 0, 0, 0));

    // Unrelated rows and the investor itself stay.
    assert_eq!(capital_stack_layers::Entity::find().count(&app.db).await?, 1);
    assert!(app.context.investors().get_investor(&app.admin, investor.id).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn test_deleting_old_version_detaches_successor() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "versioned").await?;
    let service = app.context.documents();
    let draft = |previous_version_id: Option<i32>| UploadDocument {
        project_id: Some(project.id),
        title: "Operating Agreement".to_string(),
        document_type: DocumentType::LegalDocument,
        access_level: Some(AccessLevel::Admin),
        content_type: None,
        bytes: b"agreement".to_vec(),
        description: None,
        tags: Vec::new(),
        previous_version_id,
    };

    let first = service.upload_document(&app.admin, draft(None)).await?;
    let second = service
        .upload_document(&app.admin, draft(Some(first.id)))
        .await?;
    assert_eq!(second.version, 2);
    assert_eq!(second.previous_version_id, Some(first.id));

    service.delete_document(&app.admin, first.id).await?;

    let stored = documents::Entity::find_by_id(second.id)
        .one(&app.db)
        .await?
        .expect("newer version survives");
    assert_eq!(stored.version, 2);
    assert_eq!(stored.previous_version_id, None);
    Ok(())
}

#[tokio::test]
async fn test_update_project_writes_one_audit_row() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "audited").await?;

    let updated = app
        .context
        .projects()
        .update_project(
            &app.admin,
            project.id,
            ProjectPatch {
                name: Some("Audited Tower".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.name, "Audited Tower");
    assert_eq!(updated.slug, "audited");

    let rows = audit_logs::Entity::find()
        .filter(audit_logs::Column::Action.eq("UPDATE_PROJECT"))
        .filter(audit_logs::Column::EntityId.eq(project.id))
        .all(&app.db)
        .await?;
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.entity_type, "project");
    assert_eq!(row.user_id, app.admin.actor.user_id);
    let before = row.old_values.as_ref().expect("before snapshot");
    let after = row.new_values.as_ref().expect("after snapshot");
    assert_eq!(before["name"], project.name.as_str());
    assert_eq!(after["name"], "Audited Tower");
    Ok(())
}

#[tokio::test]
async fn test_slug_is_fixed_after_creation() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "original-slug").await?;

    let err = app
        .context
        .projects()
        .update_project(
            &app.admin,
            project.id,
            ProjectPatch {
                slug: Some("renamed-slug".to_string()),
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect_err("slug change must be rejected");
    assert_eq!(err.kind(), CoreErrorKind::InvalidInput);
    assert_eq!(
        err.fields().and_then(|fields| fields.get("field")).map(String::as_str),
        Some("slug")
    );

    let stored = app
        .context
        .projects()
        .get_project_by_slug(&app.admin, "original-slug")
        .await?;
    assert_eq!(stored.project.name, project.name);
    Ok(())
}

#[tokio::test]
async fn test_update_survives_audit_failure() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "no-audit").await?;

    app.db.execute_unprepared("DROP TABLE audit_logs").await?;

    let updated = app
        .context
        .projects()
        .update_project(
            &app.admin,
            project.id,
            ProjectPatch {
                occupancy_rate: Some(92.5),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.occupancy_rate, Some(92.5));
    Ok(())
}

#[tokio::test]
async fn test_empty_patch_is_rejected() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "untouched").await?;

    let err = app
        .context
        .projects()
        .update_project(&app.admin, project.id, ProjectPatch::default())
        .await
        .expect_err("nothing to update");
    assert_eq!(err.kind(), CoreErrorKind::InvalidInput);
    Ok(())
}

#[tokio::test]
async fn test_full_profile_reads_are_audited() -> Result<()> {
    let app = setup().await?;
    let investor = app
        .context
        .investors()
        .create_investor(&app.admin, investor("Pine Holdings", "pine@example.com"))
        .await?;

    app.context
        .investors()
        .get_investor_full_profile(&app.user, investor.id)
        .await?;
    app.context
        .investors()
        .get_investor_full_profile(&app.user, investor.id)
        .await?;

    let reads = audit_logs::Entity::find()
        .filter(audit_logs::Column::Action.eq("VIEW_INVESTOR_PROFILE"))
        .count(&app.db)
        .await?;
    assert_eq!(reads, 2);

    let err = app
        .context
        .investors()
        .get_investor_full_profile(&RequestContext::anonymous(), investor.id)
        .await
        .expect_err("anonymous profile");
    assert_eq!(err.kind(), CoreErrorKind::Unauthorized);
    Ok(())
}

#[tokio::test]
async fn test_private_projects_hidden_from_public_list() -> Result<()> {
    let app = setup().await?;
    seed_project(&app, "public-one").await?;
    let private = seed_project(&app, "private-one").await?;
    app.context
        .projects()
        .update_project(
            &app.admin,
            private.id,
            ProjectPatch {
                is_public: Some(false),
                ..Default::default()
            },
        )
        .await?;

    let public = app
        .context
        .projects()
        .list_projects(&RequestContext::anonymous(), ProjectFilter::default(), PageRequest::default())
        .await?;
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].slug, "public-one");

    let all = app
        .context
        .projects()
        .list_projects(&app.admin, ProjectFilter::default(), PageRequest::default())
        .await?;
    assert_eq!(all.len(), 2);

    let err = app
        .context
        .projects()
        .list_projects(
            &RequestContext::anonymous(),
            ProjectFilter::default(),
            PageRequest::new(Some(101), None),
        )
        .await
        .expect_err("limit over public bound");
    assert_eq!(err.kind(), CoreErrorKind::InvalidInput);
    Ok(())
}

#[tokio::test]
async fn test_update_notifies_linked_investors() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "notify").await?;
    let investor = app
        .context
        .investors()
        .create_investor(&app.admin, investor("Maple LP", "maple@example.com"))
        .await?;
    app.context
        .investors()
        .record_investment(&app.admin, project.id, investment(investor.id, 5_000.0))
        .await?;

    app.context
        .updates()
        .create_project_update(&app.admin, project.id, update("Quiet update", false))
        .await?;
    assert!(app.notifier.sent().is_empty());

    app.context
        .updates()
        .create_project_update(&app.admin, project.id, update("Topped out", true))
        .await?;
    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        Notification::ProjectUpdate { to, update_title, .. } => {
            assert_eq!(to, "maple@example.com");
            assert_eq!(update_title, "Topped out");
        }
        other => panic!("unexpected notification {:?}", other),
    }

    let recent = app
        .context
        .updates()
        .list_recent_public_updates(&RequestContext::anonymous(), None)
        .await?;
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].project_slug, "notify");
    Ok(())
}

#[tokio::test]
async fn test_anonymous_inquiry_is_recorded() -> Result<()> {
    let app = setup().await?;

    let contact = app
        .context
        .contacts()
        .create_contact(
            &RequestContext::anonymous(),
            NewContact {
                name: "Jordan Reyes".to_string(),
                email: "Jordan@Example.com".to_string(),
                phone: None,
                company: None,
                inquiry_type: InquiryType::InvestorPortalAccess,
                message: Some("Interested in the industrial fund".to_string()),
                interested_project_ids: Vec::new(),
                investment_range: None,
            },
        )
        .await?;
    assert_eq!(contact.status, "new");

    let kinds: Vec<&str> = app.notifier.sent().iter().map(|n| n.kind()).collect();
    assert_eq!(kinds, vec!["inquiry_acknowledgement", "inquiry_received"]);
    Ok(())
}

#[tokio::test]
async fn test_lists_degrade_when_store_unreachable() -> Result<()> {
    let (db, _db_file) = closed_store().await?;
    let context = AppContext::new(db, &AppConfig::default());
    let anonymous = RequestContext::anonymous();

    let projects = context
        .projects()
        .list_projects(&anonymous, ProjectFilter::default(), PageRequest::default())
        .await?;
    assert!(projects.is_empty());

    let investors = context
        .investors()
        .list_investors(&anonymous, InvestorFilter::default(), PageRequest::default())
        .await?;
    assert!(investors.is_empty());

    // Single-entity reads still report the outage.
    let err = context
        .projects()
        .get_project(&anonymous, 1)
        .await
        .expect_err("store is closed");
    assert_eq!(err.kind(), CoreErrorKind::Unavailable);
    Ok(())
}
