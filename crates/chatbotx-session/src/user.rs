//! Signed-in user slice.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Profile returned by the users API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User id
    pub id: String,
    /// Display name
    pub name: String,
    /// Login e-mail
    pub email: String,
}

/// Updates accepted by [`UserState::reduce`].
#[derive(Debug, Clone)]
pub enum UserAction {
    /// Login or registration succeeded
    LoggedIn {
        /// Profile of the signed-in user
        profile: UserProfile,
        /// Bearer token for authenticated calls
        token: String,
    },
    /// Forget the user entirely
    LoggedOut,
    /// Replace the stored profile
    ProfileUpdated(UserProfile),
    /// Set a single preference
    PreferenceSet {
        /// Preference key
        key: String,
        /// Preference value
        value: String,
    },
}

/// State of the signed-in user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserState {
    /// Current profile
    pub profile: Option<UserProfile>,
    /// Bearer token
    pub token: Option<String>,
    /// Whether a user is signed in
    pub is_authenticated: bool,
    /// Free-form preferences such as language
    pub preferences: HashMap<String, String>,
}

impl UserState {
    /// Apply an update.
    pub fn reduce(&mut self, action: UserAction) {
        match action {
            UserAction::LoggedIn { profile, token } => {
                self.profile = Some(profile);
                self.token = Some(token);
                self.is_authenticated = true;
            }
            UserAction::LoggedOut => *self = Self::default(),
            UserAction::ProfileUpdated(profile) => self.profile = Some(profile),
            UserAction::PreferenceSet { key, value } => {
                self.preferences.insert(key, value);
            }
        }
    }

    /// First name of the user, used to personalise the chat greeting.
    pub fn first_name(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .and_then(|p| p.name.split_whitespace().next())
    }
}
