//! Analytics dashboard slice.

use serde::{Deserialize, Serialize};

/// Smallest selectable dashboard window in days.
pub const MIN_RANGE_DAYS: u32 = 1;
/// Largest selectable dashboard window in days.
pub const MAX_RANGE_DAYS: u32 = 90;
/// Window used until the user picks one.
pub const DEFAULT_RANGE_DAYS: u32 = 7;

/// Count of messages classified under one intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentCount {
    /// Intent name
    pub intent: String,
    /// Number of messages
    pub count: u64,
}

/// Per-day totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Distinct senders that day
    pub conversations: u64,
    /// Messages that day
    pub messages: u64,
}

/// Payload of `GET /api/v1/analytics/dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Distinct senders in the window
    pub total_conversations: u64,
    /// Messages in the window
    pub total_messages: u64,
    /// Mean responder latency in seconds
    pub average_response_time: f64,
    /// Mean feedback rating (0 when nobody rated)
    pub user_satisfaction: f64,
    /// Most frequent intents, highest first
    pub top_intents: Vec<IntentCount>,
    /// Oldest day first
    pub daily_stats: Vec<DailyStat>,
}

/// Updates accepted by [`AnalyticsState::reduce`].
#[derive(Debug, Clone)]
pub enum AnalyticsAction {
    /// A dashboard request was sent
    FetchStarted,
    /// Dashboard metrics arrived
    FetchSucceeded(DashboardMetrics),
    /// The dashboard request failed
    FetchFailed(String),
    /// Change the dashboard window
    SetRange(u32),
}

/// State of the analytics dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsState {
    /// Most recent metrics
    pub dashboard: Option<DashboardMetrics>,
    /// Whether a fetch is in flight
    pub loading: bool,
    /// Last fetch error
    pub error: Option<String>,
    /// Dashboard window in days
    pub range_days: u32,
}

impl Default for AnalyticsState {
    fn default() -> Self {
        Self {
            dashboard: None,
            loading: false,
            error: None,
            range_days: DEFAULT_RANGE_DAYS,
        }
    }
}

impl AnalyticsState {
    /// Apply an update.
    pub fn reduce(&mut self, action: AnalyticsAction) {
        match action {
            AnalyticsAction::FetchStarted => {
                self.loading = true;
                self.error = None;
            }
            AnalyticsAction::FetchSucceeded(metrics) => {
                self.loading = false;
                self.dashboard = Some(metrics);
            }
            AnalyticsAction::FetchFailed(error) => {
                self.loading = false;
                self.error = Some(error);
            }
            AnalyticsAction::SetRange(days) => {
                self.range_days = days.clamp(MIN_RANGE_DAYS, MAX_RANGE_DAYS);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_clamped() {
        let mut state = AnalyticsState::default();
        assert_eq!(state.range_days, 7);
        state.reduce(AnalyticsAction::SetRange(0));
        assert_eq!(state.range_days, 1);
        state.reduce(AnalyticsAction::SetRange(365));
        assert_eq!(state.range_days, 90);
        state.reduce(AnalyticsAction::SetRange(30));
        assert_eq!(state.range_days, 30);
    }

    #[test]
    fn test_fetch_keeps_previous_metrics_on_failure() {
        let mut state = AnalyticsState::default();
        let metrics = DashboardMetrics {
            total_conversations: 2,
            total_messages: 5,
            average_response_time: 0.01,
            user_satisfaction: 4.5,
            top_intents: vec![IntentCount {
                intent: "course_info".to_string(),
                count: 3,
            }],
            daily_stats: vec![],
        };
        state.reduce(AnalyticsAction::FetchStarted);
        state.reduce(AnalyticsAction::FetchSucceeded(metrics.clone()));
        state.reduce(AnalyticsAction::FetchStarted);
        state.reduce(AnalyticsAction::FetchFailed("timeout".to_string()));

        assert_eq!(state.dashboard, Some(metrics));
        assert_eq!(state.error.as_deref(), Some("timeout"));
        assert!(!state.loading);
    }
}
