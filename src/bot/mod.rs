//! Rule-based chat assistant.
//!
//! [`Responder`] is the entry point; the other modules are its building
//! blocks and are public so the API and CLI can reuse them.

pub mod cache;
pub mod context;
pub mod intents;
pub mod language;
pub mod responder;
pub mod sentiment;

pub use context::ConversationContext;
pub use intents::Intent;
pub use responder::{BotReply, Responder};
pub use sentiment::SentimentScore;
