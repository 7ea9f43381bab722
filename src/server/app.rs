use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use super::handlers::{
    audit, capital_stacks, contacts, documents, files, health, investors, notices, projects,
    updates,
};
use crate::app_context::AppContext;
use crate::services::validation::MAX_UPLOAD_BYTES;

/// Request body ceiling for document uploads: the largest accepted file once
/// base64-encoded, plus room for the surrounding JSON fields.
pub const UPLOAD_BODY_LIMIT: usize = (MAX_UPLOAD_BYTES + 2) / 3 * 4 + 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub context: AppContext,
}

pub fn create_app(context: AppContext, cors_origin: Option<&str>) -> Result<Router> {
    let state = AppState { context };

    let cors = match cors_origin.filter(|origin| *origin != "*") {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("invalid CORS origin '{}'", origin))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/files/*key", get(files::serve_file))
        .nest("/api/v1", api_v1_routes())
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Projects
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/projects/slug/:slug", get(projects::get_project_by_slug))
        .route("/projects/:id/full", get(projects::get_project_full_details))
        .route(
            "/projects/:id/capital-stack",
            get(capital_stacks::get_capital_stack),
        )
        .route(
            "/projects/:id/investors",
            get(investors::list_project_investors).post(investors::record_investment),
        )
        .route(
            "/projects/:id/updates",
            get(updates::list_project_updates).post(updates::create_project_update),
        )
        .route(
            "/projects/:id/documents",
            get(documents::list_project_documents),
        )
        .route(
            "/projects/:id/notices/milestone",
            post(notices::send_milestone),
        )
        .route(
            "/projects/:id/notices/capital-call",
            post(notices::send_capital_call),
        )
        .route(
            "/projects/:id/notices/distribution",
            post(notices::send_distribution),
        )
        .route("/project-investors/:id", put(investors::update_investment))
        .route("/updates/recent", get(updates::list_recent_public_updates))
        // Capital stack layers
        .route("/capital-stack-layers", post(capital_stacks::create_layer))
        .route(
            "/capital-stack-layers/:id",
            get(capital_stacks::get_layer)
                .put(capital_stacks::update_layer)
                .delete(capital_stacks::delete_layer),
        )
        // Investors
        .route(
            "/investors",
            get(investors::list_investors).post(investors::create_investor),
        )
        .route(
            "/investors/:id",
            get(investors::get_investor)
                .put(investors::update_investor)
                .delete(investors::deactivate_investor),
        )
        .route("/investors/:id/full", get(investors::get_investor_full_profile))
        // Documents
        .route(
            "/documents",
            get(documents::list_all_documents)
                .post(documents::upload_document)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/documents/:id/download-url",
            get(documents::get_download_url),
        )
        .route(
            "/documents/:id",
            axum::routing::delete(documents::delete_document),
        )
        .route("/documents/:id/notify", post(notices::send_document_notice))
        // Contacts
        .route(
            "/contacts",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route("/contacts/:id", put(contacts::update_contact))
        // Audit trail
        .route("/audit-logs", get(audit::list_audit_logs))
}
