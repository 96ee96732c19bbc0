//! Liveness endpoint and the welcome page.

use std::collections::BTreeMap;

use crate::{types::HealthResponse, AppState};
use axum::{extract::State, response::Html, Json};
use chrono::Utc;

/// Service name to availability, shared with the admin health view.
pub async fn service_status(state: &AppState) -> BTreeMap<String, bool> {
    BTreeMap::from([
        ("database".to_string(), state.db.ping().await),
        ("chatbot".to_string(), true),
        ("websocket".to_string(), true),
        ("analytics".to_string(), state.analytics.is_enabled()),
    ])
}

/// `healthy` unless the database is unreachable.
pub fn overall_status(services: &BTreeMap<String, bool>) -> &'static str {
    if services.get("database").copied().unwrap_or(false) {
        "healthy"
    } else {
        "degraded"
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service health", body = HealthResponse)),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let services = service_status(&state).await;
    Json(HealthResponse {
        status: overall_status(&services).to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>ChatBotX - AI Support Assistant</title>
</head>
<body>
    <h1>ChatBotX - AI Support Assistant</h1>
    <p>The API is served under <code>/api/v1</code> and real-time chat under <code>/ws/{client_id}</code>.</p>
    <p>Service status: <a href="/health">/health</a></p>
</body>
</html>
"#;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
