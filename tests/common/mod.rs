//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use chatbotx::{create_app, AppState, ChatbotxConfig, ConfigManager, TursoClient};
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";

pub async fn test_state(config: ChatbotxConfig) -> AppState {
    let manager = Arc::new(ConfigManager::from_config(config));
    let db = TursoClient::new_memory()
        .await
        .expect("Failed to open in-memory database");
    AppState::new(manager, db, TEST_SECRET.to_string())
}

pub async fn test_server() -> TestServer {
    let state = test_state(ChatbotxConfig::default()).await;
    TestServer::new(create_app(state)).expect("Failed to create test server")
}

/// The first Monday-to-Friday date after today.
pub fn next_weekday() -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(1);
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date += Duration::days(1);
    }
    date
}
