//! # chatbotx-session
//!
//! Client-side state for the ChatBotX chat panel, plus the JSON wire protocol
//! shared with the server.
//!
//! ## Overview
//!
//! The crate is transport-agnostic. A front end owns a [`Store`], feeds it
//! transport events (`connect`, `disconnect`, incoming frames) and user
//! intents (send text, press a quick reply), and writes whatever
//! [`ClientFrame`] the store hands back onto its socket.
//!
//! ```rust,ignore
//! use chatbotx_session::{Action, Store, ServerFrame};
//!
//! let mut store = Store::new("client-42");
//! store.dispatch(Action::Connected);
//!
//! // Optimistic insert: the user's message is visible before the server replies
//! if let Some(frame) = store.send_text("What courses do you offer?") {
//!     socket.send(frame.to_json()?).await?;
//! }
//!
//! let incoming = ServerFrame::parse(&socket.recv().await?)?;
//! store.dispatch(Action::FrameReceived(incoming));
//! ```
//!
//! ## State layout
//!
//! ```text
//! Store
//!  ├── chat       ChatSession   connection flag, ordered messages, typing flag
//!  ├── user       UserState     profile, token, preferences
//!  ├── courses    CoursesState  catalog, selection, filter
//!  ├── analytics  AnalyticsState dashboard metrics, date range
//!  └── ui         UiState       theme, sidebar, notification queue
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analytics;
pub mod chat;
pub mod courses;
pub mod error;
pub mod protocol;
pub mod store;
pub mod ui;
pub mod user;

// Re-exports for convenience
pub use analytics::{AnalyticsAction, AnalyticsState, DashboardMetrics};
pub use chat::{ChatAction, ChatSession};
pub use courses::{Course, CourseFilter, CoursesAction, CoursesState};
pub use error::{Result, SessionError};
pub use protocol::{
    BotResponse, Button, ChatMessage, ClientFrame, QuickReply, Sender, ServerFrame,
};
pub use store::{Action, Store};
pub use ui::{Notification, Severity, Theme, UiAction, UiState};
pub use user::{UserAction, UserProfile, UserState};
