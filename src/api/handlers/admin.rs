//! Operator endpoints. Every route here sits behind the bearer-token layer.

use crate::{
    api::handlers::health::{overall_status, service_status},
    types::SystemHealth,
    ws::ConnectionStats,
    AppState,
};
use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

/// Configuration values that are safe to show: no secrets, no storage paths.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicConfig {
    pub version: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub allowed_origins: Vec<String>,
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: usize,
    pub rate_limit_period_secs: u64,
    pub supported_languages: Vec<String>,
    pub default_language: String,
    pub language_detection: bool,
    pub sentiment_analysis: bool,
    pub max_quick_replies: usize,
    pub inactivity_timeout_secs: u64,
    pub analytics_enabled: bool,
    pub retention_days: u32,
    /// e.g. `09:00-17:00`
    pub business_hours: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/health",
    responses(
        (status = 200, description = "System health", body = SystemHealth),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(("bearer" = []))
)]
pub async fn system_health(State(state): State<AppState>) -> Json<SystemHealth> {
    let services = service_status(&state).await;
    Json(SystemHealth {
        status: overall_status(&services).to_string(),
        services,
        uptime: state.uptime(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_connections: state.connections.connection_count(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/config",
    responses(
        (status = 200, description = "Non-sensitive configuration", body = PublicConfig),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(("bearer" = []))
)]
pub async fn public_config(State(state): State<AppState>) -> Json<PublicConfig> {
    let config = state.config_manager.config();
    Json(PublicConfig {
        version: env!("CARGO_PKG_VERSION").to_string(),
        host: config.server.host.clone(),
        port: config.server.port,
        log_level: config.server.log_level.clone(),
        allowed_origins: config.cors.allowed_origins.clone(),
        rate_limit_enabled: config.rate_limit.enabled,
        rate_limit_requests: config.rate_limit.requests,
        rate_limit_period_secs: config.rate_limit.period_secs,
        supported_languages: config.chat.supported_languages.clone(),
        default_language: config.chat.default_language.clone(),
        language_detection: config.chat.enable_language_detection,
        sentiment_analysis: config.chat.enable_sentiment_analysis,
        max_quick_replies: config.chat.max_quick_replies,
        inactivity_timeout_secs: config.websocket.inactivity_timeout_secs,
        analytics_enabled: config.analytics.enabled,
        retention_days: config.analytics.retention_days,
        business_hours: format!(
            "{:02}:00-{:02}:00",
            config.business.hours_start, config.business.hours_end
        ),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/connections",
    responses(
        (status = 200, description = "Live WebSocket connections", body = ConnectionStats),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(("bearer" = []))
)]
pub async fn connections(State(state): State<AppState>) -> Json<ConnectionStats> {
    Json(state.connections.stats())
}
