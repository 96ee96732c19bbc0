//! Presentation slice: theme, sidebar and snackbar notifications.

use serde::{Deserialize, Serialize};

/// Colour scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light scheme
    #[default]
    Light,
    /// Dark scheme
    Dark,
}

/// Snackbar severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral notice
    Info,
    /// Completed action
    Success,
    /// Something to look at
    Warning,
    /// Failure
    Error,
}

/// A queued snackbar notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Queue-unique id
    pub id: u64,
    /// Text to show
    pub message: String,
    /// Severity
    pub severity: Severity,
}

/// Updates accepted by [`UiState::reduce`].
#[derive(Debug, Clone)]
pub enum UiAction {
    /// Switch between light and dark
    ToggleTheme,
    /// Flip the sidebar
    ToggleSidebar,
    /// Open or close the sidebar
    SetSidebar(bool),
    /// Queue a notification
    Notify {
        /// Text to show
        message: String,
        /// Severity
        severity: Severity,
    },
    /// Remove a notification by id
    Dismiss(u64),
    /// Global loading overlay
    SetLoading(bool),
}

/// Presentation state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiState {
    /// Active theme
    pub theme: Theme,
    /// Whether the sidebar is open
    pub sidebar_open: bool,
    /// Pending notifications, oldest first
    pub notifications: Vec<Notification>,
    /// Global loading overlay
    pub loading: bool,
    next_notification_id: u64,
}

impl UiState {
    /// Apply an update.
    pub fn reduce(&mut self, action: UiAction) {
        match action {
            UiAction::ToggleTheme => {
                self.theme = match self.theme {
                    Theme::Light => Theme::Dark,
                    Theme::Dark => Theme::Light,
                };
            }
            UiAction::ToggleSidebar => self.sidebar_open = !self.sidebar_open,
            UiAction::SetSidebar(open) => self.sidebar_open = open,
            UiAction::Notify { message, severity } => {
                self.next_notification_id += 1;
                self.notifications.push(Notification {
                    id: self.next_notification_id,
                    message,
                    severity,
                });
            }
            UiAction::Dismiss(id) => self.notifications.retain(|n| n.id != id),
            UiAction::SetLoading(loading) => self.loading = loading,
        }
    }
}
