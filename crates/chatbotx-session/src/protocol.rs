//! JSON wire protocol between the chat panel and the server.
//!
//! Every frame is a JSON object carrying a snake_case `type` discriminator.
//! Client frames flow from the browser to `/ws/{client_id}`; server frames
//! flow back. The original chat panel sent bare `{"message": "..."}`
//! objects, so [`ClientFrame::parse`] still reads those as message frames.

use crate::error::{Result, SessionError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A clickable suggestion attached to a bot message.
///
/// Activating it sends `payload` back to the server while `title` is what
/// the user sees in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    /// Label shown on the button
    pub title: String,
    /// Pre-filled message sent on activation (usually a `/command`)
    pub payload: String,
}

impl QuickReply {
    /// Create a quick reply from a title and payload.
    pub fn new(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: payload.into(),
        }
    }
}

/// An inline button rendered inside a bot message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Label shown on the button
    pub title: String,
    /// Message sent on activation
    pub payload: String,
}

/// Who authored a message in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing in the chat panel
    User,
    /// The rule-based assistant
    Bot,
    /// Connection notices and errors
    System,
}

/// One rendered transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Locally unique message id
    pub id: String,
    /// Message body
    pub text: String,
    /// Author of the message
    pub sender: Sender,
    /// When the message entered the transcript
    pub timestamp: DateTime<Utc>,
    /// Inline buttons, bot messages only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<Button>>,
    /// Quick replies, bot messages only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<QuickReply>>,
}

impl ChatMessage {
    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            buttons: None,
            quick_replies: None,
        }
    }

    /// A message typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    /// A connection notice or error line.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(text, Sender::System)
    }

    /// A bot message built from a `bot_response` frame.
    ///
    /// Empty button and quick-reply lists are dropped so they are omitted
    /// from the serialized record.
    pub fn bot(response: &BotResponse) -> Self {
        let mut message = Self::new(response.text.clone(), Sender::Bot);
        message.timestamp = response.timestamp;
        if !response.buttons.is_empty() {
            message.buttons = Some(response.buttons.clone());
        }
        if !response.quick_replies.is_empty() {
            message.quick_replies = Some(response.quick_replies.clone());
        }
        message
    }
}

/// Body of a `bot_response` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotResponse {
    /// Reply text
    pub text: String,
    /// Inline buttons
    #[serde(default)]
    pub buttons: Vec<Button>,
    /// Suggested replies
    #[serde(default)]
    pub quick_replies: Vec<QuickReply>,
    /// Free-text follow-up suggestions
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Language, sentiment, intent and timing details
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Set when the user seems frustrated and a human hand-off is offered
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub escalation_suggested: bool,
    /// Server time of the reply
    pub timestamp: DateTime<Utc>,
}

/// Frames sent by the chat panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Free-text user message
    Message {
        /// Message text
        message: String,
        /// Arbitrary client metadata forwarded to the responder
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        metadata: Map<String, Value>,
    },
    /// Activation of a quick reply or button
    QuickReply {
        /// Payload of the activated reply
        payload: String,
        /// Title of the activated reply
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// The user started or stopped typing
    Typing {
        /// Current typing state
        is_typing: bool,
    },
    /// Join a broadcast room
    JoinRoom {
        /// Room name
        room: String,
    },
    /// Leave a broadcast room
    LeaveRoom {
        /// Room name
        room: String,
    },
    /// Keep-alive
    Ping,
}

impl ClientFrame {
    /// Build a plain message frame.
    pub fn message(text: impl Into<String>) -> Self {
        ClientFrame::Message {
            message: text.into(),
            metadata: Map::new(),
        }
    }

    /// Decode a client frame.
    ///
    /// Tagged frames are decoded directly. An untagged object with a string
    /// `message` field is read as [`ClientFrame::Message`].
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(mut object) = value else {
            return Err(SessionError::Unrecognized(
                "frame must be a JSON object".to_string(),
            ));
        };

        if object.contains_key("type") {
            return Ok(serde_json::from_value(Value::Object(object))?);
        }

        match object.remove("message") {
            Some(Value::String(message)) => {
                let metadata = match object.remove("metadata") {
                    Some(Value::Object(metadata)) => metadata,
                    _ => Map::new(),
                };
                Ok(ClientFrame::Message { message, metadata })
            }
            _ => Err(SessionError::Unrecognized(
                "missing `type` or `message` field".to_string(),
            )),
        }
    }

    /// Encode the frame as JSON text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Frames pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Connection notice
    System {
        /// Notice text
        message: String,
        /// `info`, `warning`, ...
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_type: Option<String>,
        /// Server time
        timestamp: DateTime<Utc>,
    },
    /// Typing indicator toggle
    Typing {
        /// Whether the bot is composing a reply
        is_typing: bool,
        /// Server time
        timestamp: DateTime<Utc>,
    },
    /// A bot reply
    BotResponse(BotResponse),
    /// Processing or protocol error
    Error {
        /// Error text
        message: String,
        /// Server time
        timestamp: DateTime<Utc>,
    },
    /// Reply to a client ping
    Pong {
        /// Server time
        timestamp: DateTime<Utc>,
    },
}

impl ServerFrame {
    /// A system notice without a message type.
    pub fn system(message: impl Into<String>) -> Self {
        ServerFrame::System {
            message: message.into(),
            message_type: None,
            timestamp: Utc::now(),
        }
    }

    /// A system notice tagged with a message type such as `warning`.
    pub fn system_with_type(message: impl Into<String>, message_type: impl Into<String>) -> Self {
        ServerFrame::System {
            message: message.into(),
            message_type: Some(message_type.into()),
            timestamp: Utc::now(),
        }
    }

    /// A typing indicator frame.
    pub fn typing(is_typing: bool) -> Self {
        ServerFrame::Typing {
            is_typing,
            timestamp: Utc::now(),
        }
    }

    /// An error frame.
    pub fn error(message: impl Into<String>) -> Self {
        ServerFrame::Error {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// A pong frame.
    pub fn pong() -> Self {
        ServerFrame::Pong {
            timestamp: Utc::now(),
        }
    }

    /// Decode a server frame.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode the frame as JSON text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
