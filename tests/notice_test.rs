//! Investor notices: recipients, computed amounts and tier filtering.

mod common;

use anyhow::Result;
use chrono::NaiveDate;
use common::{seed_project, setup, TestApp};
use guardian::database::entities::audit_logs;
use guardian::database::entities::documents::{AccessLevel, DocumentType};
use guardian::database::entities::investors::{AccreditationStatus, EntityType, InvestmentStage};
use guardian::database::entities::project_investors::InvestmentStatus;
use guardian::errors::CoreErrorKind;
use guardian::notifications::Notification;
use guardian::services::document_service::UploadDocument;
use guardian::services::investor_notice_service::{
    CapitalCallNotice, DistributionNotice, MilestoneNotice,
};
use guardian::services::investor_service::{NewInvestment, NewInvestor};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

async fn link_investor(
    app: &TestApp,
    project_id: i32,
    email: &str,
    amount: f64,
    status: InvestmentStatus,
    qualification: Option<(InvestmentStage, AccreditationStatus)>,
) -> Result<i32> {
    let investor = app
        .context
        .investors()
        .create_investor(
            &app.admin,
            NewInvestor {
                user_id: None,
                name: format!("Investor {}", email),
                entity_type: EntityType::Individual,
                email: email.to_string(),
                phone: None,
                organization_name: None,
                website: None,
                investment_stage: qualification.map(|(stage, _)| stage),
                accreditation_status: qualification.map(|(_, status)| status),
                minimum_investment: None,
                maximum_investment: None,
                focus_sectors: Vec::new(),
                geographic_focus: Vec::new(),
                investment_horizon: None,
                notes: None,
            },
        )
        .await?;
    app.context
        .investors()
        .record_investment(
            &app.admin,
            project_id,
            NewInvestment {
                investor_id: investor.id,
                investment_amount: amount,
                investment_date: None,
                status: Some(status),
                return_percentage: None,
                notes: None,
            },
        )
        .await?;
    Ok(investor.id)
}

fn upload(project_id: i32, title: &str, level: AccessLevel) -> UploadDocument {
    UploadDocument {
        project_id: Some(project_id),
        title: title.to_string(),
        document_type: DocumentType::OperationalReport,
        access_level: Some(level),
        content_type: Some("application/pdf".to_string()),
        bytes: b"%PDF-1.4 report".to_vec(),
        description: None,
        tags: Vec::new(),
        previous_version_id: None,
    }
}

fn recipients(sent: &[Notification]) -> Vec<String> {
    let mut to: Vec<String> = sent
        .iter()
        .filter_map(|notification| match notification {
            Notification::DocumentUploaded { to, .. } => Some(to.clone()),
            _ => None,
        })
        .collect();
    to.sort();
    to
}

#[tokio::test]
async fn test_capital_call_targets_committed_investments() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "call-yard").await?;
    link_investor(&app, project.id, "a@example.com", 100_000.0, InvestmentStatus::Committed, None).await?;
    link_investor(&app, project.id, "b@example.com", 300_000.0, InvestmentStatus::Committed, None).await?;
    link_investor(&app, project.id, "c@example.com", 500_000.0, InvestmentStatus::Funded, None).await?;

    let receipt = app
        .context
        .notices()
        .send_capital_call(
            &app.admin,
            project.id,
            CapitalCallNotice {
                call_percentage: 25.0,
                due_date: date(2025, 9, 30),
                investor_id: None,
            },
        )
        .await?;
    assert_eq!((receipt.delivered, receipt.failed), (2, 0));

    let mut calls: Vec<(String, f64)> = app
        .notifier
        .sent()
        .into_iter()
        .filter_map(|notification| match notification {
            Notification::CapitalCall { to, amount, .. } => Some((to, amount)),
            _ => None,
        })
        .collect();
    calls.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        calls,
        vec![
            ("a@example.com".to_string(), 25_000.0),
            ("b@example.com".to_string(), 75_000.0),
        ]
    );

    let audited = audit_logs::Entity::find()
        .filter(audit_logs::Column::Action.eq("SEND_CAPITAL_CALL"))
        .filter(audit_logs::Column::EntityId.eq(project.id))
        .all(&app.db)
        .await?;
    assert_eq!(audited.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_distribution_is_pro_rata_over_funded() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "payout").await?;
    link_investor(&app, project.id, "big@example.com", 300_000.0, InvestmentStatus::Funded, None).await?;
    let small =
        link_investor(&app, project.id, "small@example.com", 100_000.0, InvestmentStatus::Funded, None)
            .await?;
    link_investor(&app, project.id, "late@example.com", 900_000.0, InvestmentStatus::Committed, None)
        .await?;

    // Delivery limited to one investor still uses the project-wide split.
    let receipt = app
        .context
        .notices()
        .send_distribution(
            &app.admin,
            project.id,
            DistributionNotice {
                total_amount: 40_000.0,
                distribution_date: date(2025, 12, 15),
                investor_id: Some(small),
            },
        )
        .await?;
    assert_eq!(receipt.delivered, 1);

    match app.notifier.sent().as_slice() {
        [Notification::Distribution { to, amount, .. }] => {
            assert_eq!(to, "small@example.com");
            assert_eq!(*amount, 10_000.0);
        }
        other => panic!("unexpected notifications: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_milestone_for_unlinked_investor_is_not_found() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "milestones").await?;
    let other = seed_project(&app, "elsewhere").await?;
    let outsider =
        link_investor(&app, other.id, "out@example.com", 1_000.0, InvestmentStatus::Committed, None)
            .await?;

    let err = app
        .context
        .notices()
        .send_milestone(
            &app.admin,
            project.id,
            MilestoneNotice {
                milestone_name: "Topping Out".to_string(),
                completion_date: date(2025, 5, 1),
                investor_id: Some(outsider),
            },
        )
        .await
        .expect_err("outsider has no investment here");
    assert_eq!(err.kind(), CoreErrorKind::NotFound);
    assert!(app.notifier.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_notices_are_admin_only() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "restricted").await?;
    link_investor(&app, project.id, "a@example.com", 1_000.0, InvestmentStatus::Committed, None).await?;

    let err = app
        .context
        .notices()
        .send_milestone(
            &app.user,
            project.id,
            MilestoneNotice {
                milestone_name: "Certificate of Occupancy".to_string(),
                completion_date: date(2025, 7, 1),
                investor_id: None,
            },
        )
        .await
        .expect_err("users cannot send notices");
    assert_eq!(err.kind(), CoreErrorKind::Unauthorized);
    assert!(app.notifier.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_upload_notifies_investors_by_tier() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "reports").await?;
    link_investor(
        &app,
        project.id,
        "portfolio@example.com",
        50_000.0,
        InvestmentStatus::Funded,
        Some((InvestmentStage::Portfolio, AccreditationStatus::Verified)),
    )
    .await?;
    link_investor(
        &app,
        project.id,
        "pending@example.com",
        50_000.0,
        InvestmentStatus::Committed,
        Some((InvestmentStage::Qualified, AccreditationStatus::Pending)),
    )
    .await?;
    link_investor(
        &app,
        project.id,
        "gone@example.com",
        50_000.0,
        InvestmentStatus::Withdrawn,
        Some((InvestmentStage::Portfolio, AccreditationStatus::Verified)),
    )
    .await?;
    let documents = app.context.documents();

    documents
        .upload_document(&app.admin, upload(project.id, "Board Minutes", AccessLevel::Admin))
        .await?;
    assert!(recipients(&app.notifier.sent()).is_empty());

    documents
        .upload_document(
            &app.admin,
            upload(project.id, "Quarterly Report", AccessLevel::QualifiedInvestors),
        )
        .await?;
    assert_eq!(recipients(&app.notifier.sent()), vec!["portfolio@example.com"]);

    let public = documents
        .upload_document(&app.admin, upload(project.id, "Fact Sheet", AccessLevel::Public))
        .await?;
    assert_eq!(
        recipients(&app.notifier.sent()),
        vec!["pending@example.com", "portfolio@example.com", "portfolio@example.com"]
    );

    let receipt = app
        .context
        .notices()
        .send_document_notice(&app.admin, public.id)
        .await?;
    assert_eq!(receipt.delivered, 2);
    Ok(())
}
