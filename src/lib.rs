//! # ChatBotX - Education Support Assistant
//!
//! A rule-based support assistant for an education provider. It answers
//! questions about courses, pricing, enrollment and consultations over a
//! REST API and a WebSocket chat endpoint.
//!
//! ## Overview
//!
//! ChatBotX can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `chatbotx-server` binary
//! 2. **As a library** - Build an [`AppState`] and mount [`create_app`]
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use chatbotx::{create_app, AppState, ChatbotxConfig, ConfigManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let manager = Arc::new(ConfigManager::from_config(ChatbotxConfig::default()));
//!     let state = AppState::build(manager).await?;
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, create_app(state)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST handlers and routes under `/api/v1`
//! - [`ws`] - WebSocket endpoint and connection manager
//! - [`bot`] - Rule-based responder (intents, language, sentiment, context)
//! - [`catalog`] - Courses, FAQs and contact details
//! - [`booking`] - Consultation slots
//! - [`analytics`] - In-memory conversation analytics
//! - [`auth`] - JWT authentication and middleware
//! - [`db`] - libsql storage
//! - [`types`] - Request/response types and errors
//!
//! The client-side state machine and the wire protocol live in the
//! `chatbotx-session` crate.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Conversation analytics.
pub mod analytics;
/// HTTP API handlers and routes.
pub mod api;
/// JWT authentication and middleware.
pub mod auth;
/// Rule-based responder.
pub mod bot;
/// Consultation booking.
pub mod booking;
/// Course and FAQ catalog.
pub mod catalog;
/// Command-line interface.
pub mod cli;
/// libsql storage.
pub mod db;
/// Router-wide HTTP middleware.
pub mod middleware;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;
/// WebSocket chat.
pub mod ws;

pub use bot::{BotReply, Responder};
pub use catalog::Catalog;
pub use db::TursoClient;
pub use types::{AppError, Result};
pub use utils::toml_config::{ChatbotxConfig, ConfigManager};
pub use ws::ConnectionManager;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::warn;
use uuid::Uuid;

use crate::analytics::Analytics;
use crate::auth::jwt::AuthService;
use crate::booking::BookingService;
use crate::middleware::{rate_limit_middleware, timing_middleware, RateLimiter};
use crate::types::HistoryEntry;
use crate::utils::toml_config::CorsConfig;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<ConfigManager>,
    /// Database client
    pub db: Arc<TursoClient>,
    pub catalog: Arc<Catalog>,
    pub responder: Arc<Responder>,
    /// Live WebSocket clients
    pub connections: Arc<ConnectionManager>,
    pub analytics: Arc<Analytics>,
    pub bookings: Arc<BookingService>,
    /// Authentication service
    pub auth_service: Arc<AuthService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wire up every service around an open database.
    ///
    /// The responder, analytics, bookings and rate limiter read the live
    /// configuration, so a reload applies without rebuilding the state.
    /// Token lifetimes are fixed at start-up.
    pub fn new(config_manager: Arc<ConfigManager>, db: TursoClient, jwt_secret: String) -> Self {
        let config = config_manager.config();
        let db = Arc::new(db);
        let catalog = Arc::new(Catalog::seeded());

        Self {
            responder: Arc::new(Responder::new(catalog.clone(), config_manager.clone())),
            catalog,
            connections: Arc::new(ConnectionManager::new()),
            analytics: Arc::new(Analytics::new(config_manager.clone())),
            bookings: Arc::new(BookingService::new(db.clone(), config_manager.clone())),
            auth_service: Arc::new(AuthService::from_config(&config.auth, jwt_secret)),
            rate_limiter: Arc::new(RateLimiter::new()),
            started_at: Utc::now(),
            db,
            config_manager,
        }
    }

    /// Open the configured database and build the state.
    pub async fn build(config_manager: Arc<ConfigManager>) -> Result<Self> {
        let config = config_manager.config();
        let jwt_secret = config
            .jwt_secret()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let db = TursoClient::new_local(&config.database.url).await?;
        Ok(Self::new(config_manager, db, jwt_secret))
    }

    /// Run the responder for one message and record the exchange.
    ///
    /// Error replies are returned as-is and not recorded. A failure to store
    /// history is logged and does not affect the reply.
    pub async fn respond(
        &self,
        sender_id: &str,
        message: &str,
        metadata: &Map<String, Value>,
    ) -> BotReply {
        let reply = self.responder.process_message(message, sender_id, metadata);
        if reply.error {
            return reply;
        }

        let message = message.trim();
        self.analytics.log_conversation(sender_id, message, &reply);

        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            sender_id: sender_id.to_string(),
            user_message: message.to_string(),
            bot_response: reply.text.clone(),
            intent: reply.intent.as_str().to_string(),
            confidence: reply.confidence,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.db.add_chat_message(&entry).await {
            warn!(sender_id = %sender_id, "Failed to store chat message: {}", e);
        }

        reply
    }

    /// Time since start-up, e.g. `1 days, 2 hours, 5 minutes`.
    pub fn uptime(&self) -> String {
        format_uptime((Utc::now() - self.started_at).num_seconds().max(0) as u64)
    }

    /// Start the connection sweeper and the periodic analytics, rate-limit
    /// and cache housekeeping.
    pub fn spawn_background_tasks(&self) {
        let config = self.config_manager.config();
        self.connections.clone().spawn_cleanup_task(
            Duration::from_secs(config.websocket.cleanup_interval_secs),
            Duration::from_secs(config.websocket.inactivity_timeout_secs),
        );

        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(3600));
            loop {
                ticker.tick().await;
                let config = state.config_manager.config();
                let pruned = state.analytics.prune(config.analytics.retention_days);
                let purged = state.responder.purge_expired();
                state
                    .rate_limiter
                    .purge(Duration::from_secs(config.rate_limit.period_secs));
                tracing::debug!(pruned, purged, "Housekeeping finished");
            }
        });
    }
}

fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    format!("{} days, {} hours, {} minutes", days, hours, minutes)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// The full application: API, health, welcome page and WebSocket endpoint
/// behind CORS, compression, body limit, rate limiting, timing and tracing.
pub fn create_app(state: AppState) -> Router {
    let config = state.config_manager.config();

    let app = Router::new()
        .route("/", get(api::handlers::health::index))
        .route("/health", get(api::handlers::health::health_check))
        .route("/ws/{client_id}", get(ws::ws_handler))
        .nest("/api/v1", api::routes::create_router(state.auth_service.clone()));

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    app.layer(axum::middleware::from_fn_with_state(
        state.clone(),
        rate_limit_middleware,
    ))
    .layer(axum::middleware::from_fn(timing_middleware))
    .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
    .layer(CompressionLayer::new())
    .layer(cors_layer(&config.cors))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0 days, 0 hours, 0 minutes");
        assert_eq!(format_uptime(90_061), "1 days, 1 hours, 1 minutes");
    }

    async fn state() -> AppState {
        let manager = Arc::new(ConfigManager::from_config(ChatbotxConfig::default()));
        let db = TursoClient::new_memory().await.unwrap();
        AppState::new(manager, db, "test-secret".to_string())
    }

    #[tokio::test]
    async fn test_respond_records_exchange() {
        let state = state().await;
        let reply = state.respond("alice", "hello", &Map::new()).await;
        assert!(!reply.error);

        let history = state.db.get_chat_history("alice").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_message, "hello");
        assert_eq!(history[0].intent, "greeting");
        assert_eq!(state.analytics.dashboard(7).total_messages, 1);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use tower::ServiceExt;

        let app = create_app(state().await);
        let body = vec![b'a'; MAX_BODY_BYTES + 1];
        let request = Request::post("/api/v1/chat/message")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let mut config = ChatbotxConfig::default();
        config.cors.allowed_origins = vec!["http://localhost:3000".to_string()];
        let manager = Arc::new(ConfigManager::from_config(config));
        let db = TursoClient::new_memory().await.unwrap();
        let app = create_app(AppState::new(manager, db, "test-secret".to_string()));

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/courses")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://localhost:3000"))
        );
    }

    #[tokio::test]
    async fn test_reloaded_config_reaches_services() {
        std::env::set_var("CHATBOTX_RELOAD_TEST_SECRET", "reload-test-secret");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatbotx.toml");
        let base = "[auth]\njwt_secret_env = \"CHATBOTX_RELOAD_TEST_SECRET\"\n";
        std::fs::write(&path, base).unwrap();

        let manager = Arc::new(ConfigManager::new(&path).unwrap());
        let db = TursoClient::new_memory().await.unwrap();
        let state = AppState::new(manager.clone(), db, "test-secret".to_string());

        let before = state.respond("p", "I hate this, it's useless", &Map::new()).await;
        assert!(before.escalation_suggested);
        assert_eq!(before.quick_replies.len(), 4);

        std::fs::write(
            &path,
            format!(
                "{}[chat]\nmax_quick_replies = 1\nenable_sentiment_analysis = false\n\n[analytics]\nenabled = false\n",
                base
            ),
        )
        .unwrap();
        manager.reload().unwrap();

        let after = state.respond("p", "I hate this, it's useless", &Map::new()).await;
        assert!(!after.escalation_suggested);
        assert_eq!(after.quick_replies.len(), 1);
        assert!(!state.analytics.is_enabled());
        assert_eq!(state.analytics.dashboard(7).total_messages, 1);
    }

    #[tokio::test]
    async fn test_error_reply_is_not_recorded() {
        let state = state().await;
        let reply = state.respond("alice", "   ", &Map::new()).await;
        assert!(reply.error);
        assert!(state.db.get_chat_history("alice").await.unwrap().is_empty());
        assert_eq!(state.analytics.dashboard(7).total_messages, 0);
    }
}
