//! Relational storage.
//!
//! A libsql database (local file or `:memory:`) holds users, chat history,
//! feedback, consultation bookings and notifications.

pub mod turso;

pub use turso::{TursoClient, User};
