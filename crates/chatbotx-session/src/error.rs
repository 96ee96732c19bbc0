//! Error types for chatbotx-session.

use thiserror::Error;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised while decoding or encoding wire frames.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The payload was not valid JSON.
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload was JSON but matched no known frame shape.
    #[error("Unrecognized frame: {0}")]
    Unrecognized(String),
}
