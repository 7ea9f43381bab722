//! API integration tests
//!
//! Exercise the REST surface end to end through the router.

mod common;

use std::collections::HashMap;

use anyhow::Result;
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use base64::Engine;
use common::{closed_store, setup, TestApp};
use guardian::app_context::AppContext;
use guardian::config::AppConfig;
use guardian::server::app::create_app;
use serde_json::{json, Value};

async fn setup_test_server() -> Result<(TestServer, TestApp)> {
    let app = setup().await?;
    let router = create_app(app.context.clone(), None)?;
    let server = TestServer::new(router)?;
    Ok((server, app))
}

fn bearer(token: &str) -> Result<HeaderValue> {
    Ok(HeaderValue::from_str(&format!("Bearer {}", token))?)
}

/// Split a signed download URL into its router path and query parameters.
fn split_signed_url(url: &str) -> (String, HashMap<String, String>) {
    let relative = url.strip_prefix("http://portal.test").expect("public base url");
    let (path, query) = relative.split_once('?').expect("signed url query");
    let params = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    (path.to_string(), params)
}

fn project_payload(slug: &str) -> Value {
    json!({
        "name": "Harbor Point",
        "slug": slug,
        "project_type": "mixed_use",
        "location": "1 Harbor Way",
        "city": "Baltimore",
        "state": "MD",
        "total_project_cost": 1000000.0,
        "is_public": true
    })
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, _app) = setup_test_server().await?;

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["service"], "guardian-portal");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_anonymous_write_is_denied() -> Result<()> {
    let (server, _app) = setup_test_server().await?;

    let response = server
        .post("/api/v1/projects")
        .json(&project_payload("denied"))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body, json!({ "error": "access denied", "code": "UNAUTHORIZED" }));

    let response = server.get("/api/v1/projects").await;
    let projects: Vec<Value> = response.json();
    assert!(projects.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_invalid_session_is_denied() -> Result<()> {
    let (server, _app) = setup_test_server().await?;

    let response = server
        .get("/api/v1/projects")
        .add_header(header::AUTHORIZATION, bearer("not-a-session")?)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn test_project_and_capital_stack_api() -> Result<()> {
    let (server, app) = setup_test_server().await?;
    let admin = bearer(&app.admin_token)?;

    let response = server
        .post("/api/v1/projects")
        .add_header(header::AUTHORIZATION, admin.clone())
        .json(&project_payload("harbor-point"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let project: Value = response.json();
    let project_id = project["id"].as_i64().expect("project id");
    assert_eq!(project["slug"], "harbor-point");

    for (order, amount) in [(1, 600.0), (2, 400.0)] {
        let response = server
            .post("/api/v1/capital-stack-layers")
            .add_header(header::AUTHORIZATION, admin.clone())
            .json(&json!({
                "project_id": project_id,
                "layer_name": format!("Layer {}", order),
                "layer_type": "senior_debt",
                "layer_order": order,
                "amount": amount
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let response = server
        .get(&format!("/api/v1/projects/{}/capital-stack", project_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let stack: Value = response.json();
    assert_eq!(stack["total"], 1000.0);
    assert_eq!(stack["layers"][0]["layer_order"], 1);
    assert_eq!(stack["layers"][0]["percentage"], 60.0);
    assert_eq!(stack["layers"][1]["percentage"], 40.0);

    // Anonymous readers get the summary without financials.
    let response = server.get("/api/v1/projects/slug/harbor-point").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let detail: Value = response.json();
    assert_eq!(detail["project"]["id"], project_id);
    assert!(detail.get("financials").is_none());

    let response = server
        .get(&format!("/api/v1/projects/{}", project_id))
        .add_header(header::AUTHORIZATION, bearer(&app.user_token)?)
        .await;
    let detail: Value = response.json();
    assert_eq!(detail["financials"]["total_project_cost"], 1000000.0);

    let response = server
        .delete(&format!("/api/v1/projects/{}", project_id))
        .add_header(header::AUTHORIZATION, admin)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server
        .get(&format!("/api/v1/projects/{}", project_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn test_validation_errors_name_the_field() -> Result<()> {
    let (server, app) = setup_test_server().await?;

    let payload = project_payload("Not A Slug");
    let response = server
        .post("/api/v1/projects")
        .add_header(header::AUTHORIZATION, bearer(&app.admin_token)?)
        .json(&payload)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["fields"]["field"], "slug");

    Ok(())
}

#[tokio::test]
async fn test_document_upload_and_signed_download() -> Result<()> {
    let (server, app) = setup_test_server().await?;
    let admin = bearer(&app.admin_token)?;

    let response = server
        .post("/api/v1/projects")
        .add_header(header::AUTHORIZATION, admin.clone())
        .json(&project_payload("docs-project"))
        .await;
    let project_id = response.json::<Value>()["id"].as_i64().expect("project id");

    let content = b"quarterly numbers";
    let response = server
        .post("/api/v1/documents")
        .add_header(header::AUTHORIZATION, admin.clone())
        .json(&json!({
            "project_id": project_id,
            "title": "Q3 Report",
            "document_type": "financial_report",
            "access_level": "public",
            "content_type": "text/plain",
            "file_base64": base64::engine::general_purpose::STANDARD.encode(content)
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let document: Value = response.json();
    assert!(document.get("file_url").is_none());
    assert!(document.get("storage_key").is_none());
    let document_id = document["id"].as_i64().expect("document id");

    // Anonymous callers never receive download URLs.
    let response = server
        .get(&format!("/api/v1/documents/{}/download-url", document_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .get(&format!("/api/v1/documents/{}/download-url", document_id))
        .add_header(header::AUTHORIZATION, bearer(&app.user_token)?)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let url = response.json::<Value>()["url"]
        .as_str()
        .expect("url")
        .to_string();
    let (path, params) = split_signed_url(&url);
    assert!(path.starts_with("/files/documents/"));

    let response = server
        .get(&path)
        .add_query_param("expires", &params["expires"])
        .add_query_param("signature", &params["signature"])
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), content);

    let response = server
        .get(&path)
        .add_query_param("expires", &params["expires"])
        .add_query_param("signature", format!("0{}", params["signature"]))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server.get(&path).await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_contact_submission_is_open() -> Result<()> {
    let (server, app) = setup_test_server().await?;

    let response = server
        .post("/api/v1/contacts")
        .json(&json!({
            "name": "Avery Chen",
            "email": "avery@example.com",
            "inquiry_type": "partnership",
            "message": "Let's talk"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = server.get("/api/v1/contacts").await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .get("/api/v1/contacts")
        .add_header(header::AUTHORIZATION, bearer(&app.admin_token)?)
        .await;
    let contacts: Vec<Value> = response.json();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0]["status"], "new");

    let response = server
        .get("/api/v1/audit-logs")
        .add_query_param("entity_type", "investor_contact")
        .add_header(header::AUTHORIZATION, bearer(&app.admin_token)?)
        .await;
    let entries: Vec<Value> = response.json();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "CREATE_INVESTOR_CONTACT");

    Ok(())
}

#[tokio::test]
async fn test_large_document_upload() -> Result<()> {
    let (server, app) = setup_test_server().await?;
    let admin = bearer(&app.admin_token)?;

    // Well past axum's default 2 MB body limit once base64-encoded.
    let content = vec![7u8; 3 * 1024 * 1024];
    let response = server
        .post("/api/v1/documents")
        .add_header(header::AUTHORIZATION, admin.clone())
        .json(&json!({
            "title": "Site Survey Scans",
            "document_type": "other",
            "access_level": "admin",
            "content_type": "application/pdf",
            "file_base64": base64::engine::general_purpose::STANDARD.encode(&content)
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let document: Value = response.json();
    assert_eq!(document["file_size"], content.len() as u64);

    Ok(())
}

#[tokio::test]
async fn test_reads_degrade_when_store_unreachable() -> Result<()> {
    let (db, _db_file) = closed_store().await?;
    let context = AppContext::new(db, &AppConfig::default());
    let server = TestServer::new(create_app(context, None)?)?;
    let token = bearer("00000000-0000-4000-8000-000000000000")?;

    let response = server.get("/api/v1/projects").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Vec<Value>>().len(), 0);

    // A bearer token that cannot be checked does not turn a read into an error.
    let response = server
        .get("/api/v1/projects")
        .add_header(header::AUTHORIZATION, token.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Vec<Value>>().len(), 0);

    let response = server
        .post("/api/v1/projects")
        .add_header(header::AUTHORIZATION, token)
        .json(&project_payload("offline"))
        .await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    Ok(())
}

#[tokio::test]
async fn test_investor_notices_require_admin() -> Result<()> {
    let (server, app) = setup_test_server().await?;
    let admin = bearer(&app.admin_token)?;

    let response = server
        .post("/api/v1/projects")
        .add_header(header::AUTHORIZATION, admin.clone())
        .json(&project_payload("notice-host"))
        .await;
    let project_id = response.json::<Value>()["id"].as_i64().expect("project id");
    let path = format!("/api/v1/projects/{}/notices/milestone", project_id);
    let notice = json!({
        "milestone_name": "Foundation Complete",
        "completion_date": "2025-04-18"
    });

    let response = server
        .post(&path)
        .add_header(header::AUTHORIZATION, bearer(&app.user_token)?)
        .json(&notice)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .post(&path)
        .add_header(header::AUTHORIZATION, admin)
        .json(&notice)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let receipt: Value = response.json();
    assert_eq!(receipt["kind"], "milestone");
    assert_eq!(receipt["delivered"], 0);

    Ok(())
}
