//! Chat session state machine.
//!
//! Tracks the connection flag, the ordered transcript, and the typing
//! indicator for one chat panel. User messages are inserted optimistically,
//! before the server has seen them; the caller is handed the frame to put
//! on the wire.

use crate::protocol::{Button, ChatMessage, ClientFrame, QuickReply, ServerFrame};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Updates accepted by [`ChatSession::reduce`].
#[derive(Debug, Clone)]
pub enum ChatAction {
    /// The transport reported `connect`
    Connected,
    /// The transport reported `disconnect`
    Disconnected,
    /// A server frame arrived
    FrameReceived(ServerFrame),
    /// Drop every message from the transcript
    Cleared,
}

/// State of a single chat panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatSession {
    /// Id used in the `/ws/{client_id}` path
    pub client_id: String,
    /// Whether the socket is currently connected
    pub connected: bool,
    /// Whether the bot is composing a reply
    pub typing: bool,
    /// Transcript in insertion order
    pub messages: Vec<ChatMessage>,
    /// Most recent error reported by the server
    pub last_error: Option<String>,
}

impl ChatSession {
    /// Create a disconnected session with an empty transcript.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Default::default()
        }
    }

    /// Apply a transport or server event.
    pub fn reduce(&mut self, action: ChatAction) {
        match action {
            ChatAction::Connected => self.connect(),
            ChatAction::Disconnected => self.disconnect(),
            ChatAction::FrameReceived(frame) => self.receive(frame),
            ChatAction::Cleared => self.clear(),
        }
    }

    /// Mark the session connected.
    pub fn connect(&mut self) {
        debug!(client_id = %self.client_id, "chat session connected");
        self.connected = true;
        self.last_error = None;
    }

    /// Mark the session disconnected. A pending typing indicator is dropped.
    pub fn disconnect(&mut self) {
        debug!(client_id = %self.client_id, "chat session disconnected");
        self.connected = false;
        self.typing = false;
    }

    /// Insert the user's message and return the frame to emit.
    ///
    /// Returns `None` without touching the transcript when the text is
    /// blank or the session is not connected.
    pub fn send_text(&mut self, text: &str) -> Option<ClientFrame> {
        let text = text.trim();
        if text.is_empty() || !self.connected {
            return None;
        }

        self.messages.push(ChatMessage::user(text));
        Some(ClientFrame::message(text))
    }

    /// Insert the reply's title as a user message and return the frame that
    /// carries its payload.
    pub fn activate_quick_reply(&mut self, reply: &QuickReply) -> Option<ClientFrame> {
        self.dispatch_payload(&reply.title, &reply.payload)
    }

    /// Buttons dispatch exactly like quick replies.
    pub fn activate_button(&mut self, button: &Button) -> Option<ClientFrame> {
        self.dispatch_payload(&button.title, &button.payload)
    }

    fn dispatch_payload(&mut self, title: &str, payload: &str) -> Option<ClientFrame> {
        if !self.connected || payload.trim().is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::user(title));
        Some(ClientFrame::QuickReply {
            payload: payload.to_string(),
            title: Some(title.to_string()),
        })
    }

    /// Apply a frame pushed by the server.
    pub fn receive(&mut self, frame: ServerFrame) {
        match frame {
            ServerFrame::BotResponse(response) => {
                self.messages.push(ChatMessage::bot(&response));
                self.typing = false;
            }
            ServerFrame::Typing { is_typing, .. } => {
                self.typing = is_typing;
            }
            ServerFrame::System { message, .. } => {
                self.messages.push(ChatMessage::system(message));
            }
            ServerFrame::Error { message, .. } => {
                self.messages.push(ChatMessage::system(message.clone()));
                self.last_error = Some(message);
            }
            ServerFrame::Pong { .. } => {}
        }
    }

    /// Empty the transcript.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Quick replies offered by the most recent bot message, if it is also
    /// the most recent message.
    pub fn pending_quick_replies(&self) -> &[QuickReply] {
        self.messages
            .last()
            .and_then(|m| m.quick_replies.as_deref())
            .unwrap_or(&[])
    }
}
