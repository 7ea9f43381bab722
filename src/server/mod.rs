pub mod app;
pub mod error;
pub mod extract;
pub mod handlers;

use anyhow::Result;
use clap::Subcommand;
use sea_orm_migration::prelude::*;
use tracing::info;

use crate::app_context::AppContext;
use crate::config::AppConfig;
use crate::database::{connection::*, migrations::Migrator};

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let database_url = get_database_url(Some(&config.database));
    let db = establish_connection(&database_url).await?;

    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    let context = AppContext::new(db, &config);
    let app = app::create_app(context, config.cors_origin.as_deref())?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Server running on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                     - Health check");
    info!("  /files/*key                 - Signed document downloads");
    info!("  /api/v1/*                   - REST API (projects, investors, capital stacks, documents)");
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
