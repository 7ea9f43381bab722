//! Capital stack aggregation over persisted layers.

mod common;

use anyhow::Result;
use common::{new_layer, seed_project, setup};
use guardian::auth::RequestContext;
use guardian::errors::CoreErrorKind;
use guardian::services::capital_stack::CapitalStackLayerPatch;

#[tokio::test]
async fn test_capital_stack_percentages() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "harbor-point").await?;
    let stack = app.context.capital_stack();

    // Insert out of order to check the ordering comes from layer_order.
    stack
        .create_layer(&app.admin, new_layer(project.id, "Sponsor Equity", 2, 400.0))
        .await?;
    stack
        .create_layer(&app.admin, new_layer(project.id, "Senior Loan", 1, 600.0))
        .await?;

    let view = stack
        .get_capital_stack(&RequestContext::anonymous(), project.id)
        .await?;

    assert_eq!(view.total, 1000.0);
    assert_eq!(view.layers.len(), 2);
    assert_eq!(view.layers[0].layer.layer_order, 1);
    assert_eq!(view.layers[0].layer.layer_name, "Senior Loan");
    assert!((view.layers[0].percentage - 60.0).abs() < 1e-9);
    assert_eq!(view.layers[1].layer.layer_order, 2);
    assert!((view.layers[1].percentage - 40.0).abs() < 1e-9);

    Ok(())
}

#[tokio::test]
async fn test_capital_stack_is_idempotent() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "riverside").await?;
    let stack = app.context.capital_stack();

    for (order, amount) in [(1, 250.0), (2, 500.0), (3, 250.0)] {
        stack
            .create_layer(&app.admin, new_layer(project.id, "Layer", order, amount))
            .await?;
    }

    let first = stack.get_capital_stack(&app.user, project.id).await?;
    let second = stack.get_capital_stack(&app.user, project.id).await?;

    assert_eq!(first.total, second.total);
    assert_eq!(first.layers, second.layers);

    Ok(())
}

#[tokio::test]
async fn test_unknown_project_has_empty_stack() -> Result<()> {
    let app = setup().await?;

    let view = app
        .context
        .capital_stack()
        .get_capital_stack(&RequestContext::anonymous(), 9999)
        .await?;

    assert!(view.layers.is_empty());
    assert_eq!(view.total, 0.0);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_layer_order_conflicts() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "north-yard").await?;
    let stack = app.context.capital_stack();

    stack
        .create_layer(&app.admin, new_layer(project.id, "Senior", 1, 100.0))
        .await?;
    let err = stack
        .create_layer(&app.admin, new_layer(project.id, "Another", 1, 100.0))
        .await
        .expect_err("same order in one project");

    assert_eq!(err.kind(), CoreErrorKind::Conflict);
    Ok(())
}

#[tokio::test]
async fn test_funded_amount_cannot_exceed_layer_amount() -> Result<()> {
    let app = setup().await?;
    let project = seed_project(&app, "east-bank").await?;
    let stack = app.context.capital_stack();

    let layer = stack
        .create_layer(&app.admin, new_layer(project.id, "Senior", 1, 100.0))
        .await?;

    let err = stack
        .update_layer(
            &app.admin,
            layer.id,
            CapitalStackLayerPatch {
                funded_amount: Some(150.0),
                ..Default::default()
            },
        )
        .await
        .expect_err("over-funded");
    assert_eq!(err.kind(), CoreErrorKind::InvalidInput);

    let updated = stack
        .update_layer(
            &app.admin,
            layer.id,
            CapitalStackLayerPatch {
                funded_amount: Some(80.0),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.funded_amount, 80.0);
    assert_eq!(updated.amount, 100.0);

    Ok(())
}
