//! Per-client sliding-window rate limiting.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use serde_json::json;
use tracing::warn;

use crate::utils::toml_config::RateLimitConfig;
use crate::AppState;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

/// Requests allowed per client within a sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub enabled: bool,
    pub max_requests: usize,
    pub window: Duration,
}

impl From<&RateLimitConfig> for Limit {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_requests: config.requests,
            window: Duration::from_secs(config.period_secs),
        }
    }
}

/// Per-client request log. The [`Limit`] is supplied on each check so a
/// reloaded configuration applies to the next request.
#[derive(Default)]
pub struct RateLimiter {
    clients: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request from `client` and report whether it is allowed.
    ///
    /// Rejected requests are not recorded.
    pub fn check(&self, client: &str, limit: Limit) -> bool {
        if !limit.enabled {
            return true;
        }

        let now = Instant::now();
        let mut clients = self.clients.lock();
        let calls = clients.entry(client.to_string()).or_default();
        while calls
            .front()
            .is_some_and(|t| now.duration_since(*t) >= limit.window)
        {
            calls.pop_front();
        }

        if calls.len() >= limit.max_requests {
            return false;
        }
        calls.push_back(now);
        true
    }

    /// Forget clients with no requests inside `window`.
    pub fn purge(&self, window: Duration) -> usize {
        let now = Instant::now();
        let mut clients = self.clients.lock();
        let before = clients.len();
        clients.retain(|_, calls| {
            calls
                .back()
                .is_some_and(|t| now.duration_since(*t) < window)
        });
        before - clients.len()
    }
}

/// Client address: the socket peer when known, else the first
/// `X-Forwarded-For` hop, else `unknown`.
fn client_key(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_key(&req);
    let limit = Limit::from(&state.config_manager.config().rate_limit);
    if !state.rate_limiter.check(&client, limit) {
        warn!(client = %client, uri = %req.uri(), "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "detail": RATE_LIMIT_MESSAGE })),
        )
            .into_response();
    }
    next.run(req).await
}
