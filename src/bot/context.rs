//! Per-sender conversation memory.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cache::TtlCache;

/// What the assistant remembers about one sender between messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Display name supplied by the client, used to personalise replies
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_response: Option<String>,
    #[serde(default)]
    pub last_intent: Option<String>,
    #[serde(default)]
    pub message_count: u64,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// TTL-bounded map of sender id to [`ConversationContext`].
pub struct ContextStore {
    cache: TtlCache<ConversationContext>,
}

impl ContextStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: TtlCache::new(ttl),
        }
    }

    /// Context for `sender_id`, or an empty one if none is live.
    pub fn load(&self, sender_id: &str) -> ConversationContext {
        self.cache.get(sender_id).unwrap_or_default()
    }

    pub fn get(&self, sender_id: &str) -> Option<ConversationContext> {
        self.cache.get(sender_id)
    }

    /// Record one exchange and restart the context TTL.
    pub fn record_exchange(
        &self,
        sender_id: &str,
        mut context: ConversationContext,
        message: &str,
        response: &str,
        intent: &str,
    ) -> ConversationContext {
        context.last_message = Some(message.to_string());
        context.last_response = Some(response.to_string());
        context.last_intent = Some(intent.to_string());
        context.message_count += 1;
        context.last_updated = Some(Utc::now());
        self.cache.insert(sender_id, context.clone());
        context
    }

    pub fn set_ttl(&self, ttl: Duration) {
        self.cache.set_ttl(ttl);
    }

    pub fn forget(&self, sender_id: &str) {
        self.cache.remove(sender_id);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }
}
