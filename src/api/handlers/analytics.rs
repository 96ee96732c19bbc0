use crate::{
    analytics::{ConversationRecord, UserActivity},
    types::{AppError, Result},
    AppState,
};
use axum::{
    extract::{Query, State},
    Json,
};
use chatbotx_session::analytics::{DashboardMetrics, IntentCount};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

const DEFAULT_DASHBOARD_DAYS: u32 = 7;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// Window length in days, 1 to 90
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConversationQuery {
    /// RFC 3339 lower bound
    pub start_date: Option<String>,
    /// RFC 3339 upper bound
    pub end_date: Option<String>,
}

fn parse_bound(name: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| {
            DateTime::parse_from_rfc3339(v.trim())
                .map(|d| d.with_timezone(&Utc))
                .map_err(|_| AppError::InvalidInput(format!("{} must be an RFC 3339 timestamp", name)))
        })
        .transpose()
}

/// Dashboard figures
#[utoipa::path(
    get,
    path = "/api/v1/analytics/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard metrics"),
        (status = 400, description = "days outside 1..=90")
    ),
    tag = "analytics"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardMetrics>> {
    let days = query.days.unwrap_or(DEFAULT_DASHBOARD_DAYS);
    if !(1..=90).contains(&days) {
        return Err(AppError::InvalidInput(
            "days must be between 1 and 90".to_string(),
        ));
    }
    Ok(Json(state.analytics.dashboard(days)))
}

/// Logged exchanges within optional bounds
#[utoipa::path(
    get,
    path = "/api/v1/analytics/conversations",
    params(ConversationQuery),
    responses(
        (status = 200, description = "Conversation log", body = [ConversationRecord]),
        (status = 400, description = "Malformed bound")
    ),
    tag = "analytics"
)]
pub async fn conversations(
    State(state): State<AppState>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<ConversationRecord>>> {
    let start = parse_bound("start_date", query.start_date.as_deref())?;
    let end = parse_bound("end_date", query.end_date.as_deref())?;
    Ok(Json(state.analytics.conversations(start, end)))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/intents",
    responses((status = 200, description = "Intent counts")),
    tag = "analytics"
)]
pub async fn intents(State(state): State<AppState>) -> Json<Vec<IntentCount>> {
    Json(state.analytics.intent_distribution())
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/users",
    responses((status = 200, description = "Per-user activity", body = [UserActivity])),
    tag = "analytics"
)]
pub async fn users(State(state): State<AppState>) -> Json<Vec<UserActivity>> {
    Json(state.analytics.user_activity())
}
