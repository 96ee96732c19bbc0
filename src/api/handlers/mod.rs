//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Operator endpoints (health, config, connections).
pub mod admin;
/// Dashboard and conversation analytics.
pub mod analytics;
/// Consultation booking.
pub mod booking;
/// Courses, FAQs and contact details.
pub mod catalog;
/// Chat messages, history and feedback.
pub mod chat;
/// Liveness and welcome page.
pub mod health;
/// Notification feed.
pub mod notifications;
/// Registration, login and profiles.
pub mod users;
