//! The combined client store.
//!
//! One [`Store`] owns every slice and routes an [`Action`] to the slice it
//! belongs to. Chat actions that put something on the wire return the
//! frame from [`Store::dispatch`]; everything else returns `None`.

use crate::analytics::{AnalyticsAction, AnalyticsState};
use crate::chat::{ChatAction, ChatSession};
use crate::courses::{CoursesAction, CoursesState};
use crate::protocol::{Button, ClientFrame, QuickReply, ServerFrame};
use crate::ui::{Severity, UiAction, UiState};
use crate::user::{UserAction, UserState};
use serde::Serialize;
use tracing::trace;

/// Every update the store understands.
#[derive(Debug, Clone)]
pub enum Action {
    /// Transport connected
    Connected,
    /// Transport disconnected
    Disconnected,
    /// Server frame arrived
    FrameReceived(ServerFrame),
    /// The user typed and submitted a message
    MessageSent(String),
    /// The user pressed a quick reply
    QuickReplyActivated(QuickReply),
    /// The user pressed an inline button
    ButtonActivated(Button),
    /// Clear the chat transcript
    ChatCleared,
    /// User slice update
    User(UserAction),
    /// Courses slice update
    Courses(CoursesAction),
    /// Analytics slice update
    Analytics(AnalyticsAction),
    /// Ui slice update
    Ui(UiAction),
}

/// Root of the client state tree.
#[derive(Debug, Clone, Serialize)]
pub struct Store {
    /// Chat panel
    pub chat: ChatSession,
    /// Signed-in user
    pub user: UserState,
    /// Course catalog
    pub courses: CoursesState,
    /// Analytics dashboard
    pub analytics: AnalyticsState,
    /// Presentation state
    pub ui: UiState,
}

impl Store {
    /// Fresh store for the given WebSocket client id.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            chat: ChatSession::new(client_id),
            user: UserState::default(),
            courses: CoursesState::default(),
            analytics: AnalyticsState::default(),
            ui: UiState::default(),
        }
    }

    /// Apply an action, returning the frame to send when there is one.
    pub fn dispatch(&mut self, action: Action) -> Option<ClientFrame> {
        trace!(?action, "dispatch");
        match action {
            Action::Connected => {
                self.chat.reduce(ChatAction::Connected);
                None
            }
            Action::Disconnected => {
                self.chat.reduce(ChatAction::Disconnected);
                self.ui.reduce(UiAction::Notify {
                    message: "Disconnected from chat server".to_string(),
                    severity: Severity::Warning,
                });
                None
            }
            Action::FrameReceived(frame) => {
                if let ServerFrame::Error { message, .. } = &frame {
                    self.ui.reduce(UiAction::Notify {
                        message: message.clone(),
                        severity: Severity::Error,
                    });
                }
                self.chat.reduce(ChatAction::FrameReceived(frame));
                None
            }
            Action::MessageSent(text) => self.chat.send_text(&text),
            Action::QuickReplyActivated(reply) => self.chat.activate_quick_reply(&reply),
            Action::ButtonActivated(button) => self.chat.activate_button(&button),
            Action::ChatCleared => {
                self.chat.reduce(ChatAction::Cleared);
                None
            }
            Action::User(action) => {
                self.user.reduce(action);
                None
            }
            Action::Courses(action) => {
                self.courses.reduce(action);
                None
            }
            Action::Analytics(action) => {
                self.analytics.reduce(action);
                None
            }
            Action::Ui(action) => {
                self.ui.reduce(action);
                None
            }
        }
    }

    /// Shorthand for [`Action::MessageSent`].
    pub fn send_text(&mut self, text: &str) -> Option<ClientFrame> {
        self.dispatch(Action::MessageSent(text.to_string()))
    }

    /// Shorthand for [`Action::QuickReplyActivated`].
    pub fn activate_quick_reply(&mut self, reply: &QuickReply) -> Option<ClientFrame> {
        self.dispatch(Action::QuickReplyActivated(reply.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Sender;
    use crate::user::UserProfile;

    #[test]
    fn test_dispatch_routes_to_slices() {
        let mut store = Store::new("client-7");
        assert!(store.dispatch(Action::Connected).is_none());
        store.dispatch(Action::User(UserAction::LoggedIn {
            profile: UserProfile {
                id: "1".to_string(),
                name: "Sam".to_string(),
                email: "sam@example.com".to_string(),
            },
            token: "t".to_string(),
        }));
        store.dispatch(Action::Analytics(AnalyticsAction::SetRange(120)));
        store.dispatch(Action::Ui(UiAction::ToggleSidebar));

        assert!(store.chat.connected);
        assert!(store.user.is_authenticated);
        assert_eq!(store.analytics.range_days, 90);
        assert!(store.ui.sidebar_open);
    }

    #[test]
    fn test_send_returns_frame() {
        let mut store = Store::new("client-7");
        assert!(store.send_text("hello").is_none());

        store.dispatch(Action::Connected);
        let frame = store.send_text("hello");
        assert_eq!(frame, Some(ClientFrame::message("hello")));
        assert_eq!(store.chat.messages[0].sender, Sender::User);

        let reply = QuickReply::new("FAQ", "/faq");
        let frame = store.activate_quick_reply(&reply);
        assert!(matches!(frame, Some(ClientFrame::QuickReply { ref payload, .. }) if payload == "/faq"));
        assert_eq!(store.chat.messages.len(), 2);
    }

    #[test]
    fn test_button_action_dispatches_like_quick_reply() {
        let button = Button {
            title: "Enroll Now".to_string(),
            payload: "/enroll".to_string(),
        };

        let mut store = Store::new("client-7");
        assert!(store.dispatch(Action::ButtonActivated(button.clone())).is_none());
        assert!(store.chat.messages.is_empty());

        store.dispatch(Action::Connected);
        let frame = store.dispatch(Action::ButtonActivated(button));
        assert_eq!(
            frame,
            Some(ClientFrame::QuickReply {
                payload: "/enroll".to_string(),
                title: Some("Enroll Now".to_string()),
            })
        );
        assert_eq!(store.chat.messages.len(), 1);
        assert_eq!(store.chat.messages[0].sender, Sender::User);
        assert_eq!(store.chat.messages[0].text, "Enroll Now");
    }

    #[test]
    fn test_server_error_raises_notification() {
        let mut store = Store::new("client-7");
        store.dispatch(Action::Connected);
        store.dispatch(Action::FrameReceived(ServerFrame::error(
            "Invalid message format",
        )));
        assert_eq!(store.ui.notifications.len(), 1);
        assert_eq!(store.ui.notifications[0].severity, Severity::Error);

        store.dispatch(Action::Disconnected);
        assert_eq!(store.ui.notifications.len(), 2);
        assert!(!store.chat.connected);
    }
}
