use axum::{extract::State, response::Json};
use sea_orm::ConnectionTrait;
use serde_json::{json, Value};

use crate::server::app::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = match state.context.db().execute_unprepared("SELECT 1").await {
        Ok(_) => "ok",
        Err(_) => "unavailable",
    };

    Json(json!({
        "status": "healthy",
        "service": "guardian-portal",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    }))
}
