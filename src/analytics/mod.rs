//! In-memory conversation analytics.
//!
//! Every processed message is appended to a log, and feedback ratings are
//! kept beside it. Dashboard figures are computed on demand from the log,
//! so pruning old records also removes them from every aggregate.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chatbotx_session::analytics::{
    DailyStat, DashboardMetrics, IntentCount, MAX_RANGE_DAYS, MIN_RANGE_DAYS,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::bot::BotReply;
use crate::utils::toml_config::ConfigManager;

const TOP_INTENTS: usize = 5;

/// One logged exchange.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationRecord {
    pub sender_id: String,
    pub message: String,
    pub response: String,
    pub intent: String,
    pub source: String,
    pub confidence: f32,
    /// Responder latency in seconds
    pub response_time: f64,
    pub language: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SatisfactionRecord {
    pub sender_id: String,
    pub rating: u8,
    pub feedback: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Message totals for one sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserActivity {
    pub sender_id: String,
    pub messages: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Conversation log plus satisfaction ratings.
pub struct Analytics {
    config: Arc<ConfigManager>,
    conversations: RwLock<Vec<ConversationRecord>>,
    ratings: RwLock<Vec<SatisfactionRecord>>,
}

impl Analytics {
    /// `[analytics].enabled` is read from `config` on every call.
    pub fn new(config: Arc<ConfigManager>) -> Self {
        Self {
            config,
            conversations: RwLock::new(Vec::new()),
            ratings: RwLock::new(Vec::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.config().analytics.enabled
    }

    /// Append one exchange to the log. No-op when analytics is disabled.
    pub fn log_conversation(&self, sender_id: &str, message: &str, reply: &BotReply) {
        if !self.is_enabled() {
            return;
        }

        let record = ConversationRecord {
            sender_id: sender_id.to_string(),
            message: message.to_string(),
            response: reply.text.clone(),
            intent: reply.intent.as_str().to_string(),
            source: reply.source.to_string(),
            confidence: reply.confidence,
            response_time: reply
                .metadata
                .get("response_time")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
            language: reply
                .metadata
                .get("language")
                .and_then(|v| v.as_str())
                .unwrap_or("en")
                .to_string(),
            timestamp: Utc::now(),
        };
        debug!(sender_id = %sender_id, intent = %record.intent, "Logged conversation");
        self.conversations.write().push(record);
    }

    /// Record a feedback rating. No-op when analytics is disabled.
    pub fn track_satisfaction(&self, sender_id: &str, rating: u8, feedback: Option<&str>) {
        if !self.is_enabled() {
            return;
        }
        self.ratings.write().push(SatisfactionRecord {
            sender_id: sender_id.to_string(),
            rating,
            feedback: feedback.map(str::to_string),
            timestamp: Utc::now(),
        });
    }

    /// Dashboard figures over the last `days` days (clamped to 1..=90).
    pub fn dashboard(&self, days: u32) -> DashboardMetrics {
        self.dashboard_at(days, Utc::now())
    }

    fn dashboard_at(&self, days: u32, now: DateTime<Utc>) -> DashboardMetrics {
        let days = days.clamp(MIN_RANGE_DAYS, MAX_RANGE_DAYS);
        let first_day = now.date_naive() - Duration::days(i64::from(days) - 1);

        let conversations = self.conversations.read();
        let window: Vec<&ConversationRecord> = conversations
            .iter()
            .filter(|r| r.timestamp.date_naive() >= first_day && r.timestamp <= now)
            .collect();

        let total_messages = window.len() as u64;
        let total_conversations = window
            .iter()
            .map(|r| r.sender_id.as_str())
            .collect::<HashSet<_>>()
            .len() as u64;
        let average_response_time = if window.is_empty() {
            0.0
        } else {
            window.iter().map(|r| r.response_time).sum::<f64>() / window.len() as f64
        };

        let ratings = self.ratings.read();
        let rated: Vec<f64> = ratings
            .iter()
            .filter(|r| r.timestamp.date_naive() >= first_day && r.timestamp <= now)
            .map(|r| f64::from(r.rating))
            .collect();
        let user_satisfaction = if rated.is_empty() {
            0.0
        } else {
            rated.iter().sum::<f64>() / rated.len() as f64
        };

        let mut top_intents = count_intents(window.iter().copied());
        top_intents.truncate(TOP_INTENTS);

        let mut per_day: BTreeMap<NaiveDate, (HashSet<&str>, u64)> = (0..days)
            .map(|offset| {
                (
                    first_day + Duration::days(i64::from(offset)),
                    (HashSet::new(), 0),
                )
            })
            .collect();
        for record in &window {
            if let Some((senders, messages)) = per_day.get_mut(&record.timestamp.date_naive()) {
                senders.insert(record.sender_id.as_str());
                *messages += 1;
            }
        }
        let daily_stats = per_day
            .into_iter()
            .map(|(date, (senders, messages))| DailyStat {
                date: date.format("%Y-%m-%d").to_string(),
                conversations: senders.len() as u64,
                messages,
            })
            .collect();

        DashboardMetrics {
            total_conversations,
            total_messages,
            average_response_time,
            user_satisfaction,
            top_intents,
            daily_stats,
        }
    }

    /// Logged exchanges between optional inclusive bounds, oldest first.
    pub fn conversations(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Vec<ConversationRecord> {
        self.conversations
            .read()
            .iter()
            .filter(|r| start.map_or(true, |s| r.timestamp >= s))
            .filter(|r| end.map_or(true, |e| r.timestamp <= e))
            .cloned()
            .collect()
    }

    /// Intent counts over the whole log, most frequent first.
    pub fn intent_distribution(&self) -> Vec<IntentCount> {
        count_intents(self.conversations.read().iter())
    }

    /// Per-sender activity, most active first.
    pub fn user_activity(&self) -> Vec<UserActivity> {
        let conversations = self.conversations.read();
        let mut by_user: HashMap<&str, UserActivity> = HashMap::new();
        for record in conversations.iter() {
            by_user
                .entry(record.sender_id.as_str())
                .and_modify(|a| {
                    a.messages += 1;
                    a.first_seen = a.first_seen.min(record.timestamp);
                    a.last_seen = a.last_seen.max(record.timestamp);
                })
                .or_insert_with(|| UserActivity {
                    sender_id: record.sender_id.clone(),
                    messages: 1,
                    first_seen: record.timestamp,
                    last_seen: record.timestamp,
                });
        }

        let mut users: Vec<UserActivity> = by_user.into_values().collect();
        users.sort_by(|a, b| {
            b.messages
                .cmp(&a.messages)
                .then_with(|| a.sender_id.cmp(&b.sender_id))
        });
        users
    }

    pub fn ratings(&self) -> Vec<SatisfactionRecord> {
        self.ratings.read().clone()
    }

    /// Drop records older than `retention_days`. Returns how many were removed.
    pub fn prune(&self, retention_days: u32) -> usize {
        let cutoff = Utc::now() - Duration::days(i64::from(retention_days));

        let mut conversations = self.conversations.write();
        let before = conversations.len();
        conversations.retain(|r| r.timestamp >= cutoff);
        let mut removed = before - conversations.len();

        let mut ratings = self.ratings.write();
        let before = ratings.len();
        ratings.retain(|r| r.timestamp >= cutoff);
        removed += before - ratings.len();

        if removed > 0 {
            debug!(removed, retention_days, "Pruned analytics records");
        }
        removed
    }

    #[cfg(test)]
    fn push_record(&self, record: ConversationRecord) {
        self.conversations.write().push(record);
    }
}

fn count_intents<'a>(records: impl Iterator<Item = &'a ConversationRecord>) -> Vec<IntentCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for record in records {
        *counts.entry(record.intent.as_str()).or_default() += 1;
    }
    let mut intents: Vec<IntentCount> = counts
        .into_iter()
        .map(|(intent, count)| IntentCount {
            intent: intent.to_string(),
            count,
        })
        .collect();
    intents.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.intent.cmp(&b.intent)));
    intents
}
