//! TOML-based configuration for ChatBotX
//!
//! Infrastructure and behaviour settings live in a single `chatbotx.toml`.
//! Every section is optional and falls back to the defaults below.
//!
//! # Hot Reloading
//!
//! Configuration changes are detected and applied at runtime. Use
//! `ConfigManager` for thread-safe access to the current configuration.

use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Root configuration structure loaded from chatbotx.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatbotxConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub websocket: WebSocketConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub business: BusinessConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the JWT secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    #[serde(default = "default_jwt_access_expiry")]
    pub jwt_access_expiry: i64,

    #[serde(default = "default_jwt_refresh_expiry")]
    pub jwt_refresh_expiry: i64,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_jwt_access_expiry() -> i64 {
    1800
}

fn default_jwt_refresh_expiry() -> i64 {
    2_592_000
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            jwt_access_expiry: default_jwt_access_expiry(),
            jwt_refresh_expiry: default_jwt_refresh_expiry(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database path, or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "./data/chatbotx.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

// ============= HTTP Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:8000".to_string(),
        "https://localhost:3000".to_string(),
    ]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Requests allowed per client IP inside one window
    #[serde(default = "default_rate_limit_requests")]
    pub requests: usize,

    /// Window length in seconds
    #[serde(default = "default_rate_limit_period")]
    pub period_secs: u64,
}

fn default_rate_limit_requests() -> usize {
    100
}

fn default_rate_limit_period() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests: default_rate_limit_requests(),
            period_secs: default_rate_limit_period(),
        }
    }
}

// ============= Chat Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_true")]
    pub enable_language_detection: bool,

    #[serde(default = "default_true")]
    pub enable_sentiment_analysis: bool,

    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<String>,

    #[serde(default = "default_language")]
    pub default_language: String,

    /// Lifetime of a sender's conversation context
    #[serde(default = "default_context_ttl")]
    pub context_ttl_secs: u64,

    /// Lifetime of a cached FAQ search
    #[serde(default = "default_faq_cache_ttl")]
    pub faq_cache_ttl_secs: u64,

    #[serde(default = "default_max_quick_replies")]
    pub max_quick_replies: usize,
}

fn default_true() -> bool {
    true
}

fn default_supported_languages() -> Vec<String> {
    ["en", "es", "fr", "de"].iter().map(|s| s.to_string()).collect()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_context_ttl() -> u64 {
    3600
}

fn default_faq_cache_ttl() -> u64 {
    1800
}

fn default_max_quick_replies() -> usize {
    4
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enable_language_detection: true,
            enable_sentiment_analysis: true,
            supported_languages: default_supported_languages(),
            default_language: default_language(),
            context_ttl_secs: default_context_ttl(),
            faq_cache_ttl_secs: default_faq_cache_ttl(),
            max_quick_replies: default_max_quick_replies(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketConfig {
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_secs: u64,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_inactivity_timeout() -> u64 {
    1800
}

fn default_cleanup_interval() -> u64 {
    300
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_secs: default_inactivity_timeout(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_retention_days() -> u32 {
    90
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retention_days: default_retention_days(),
        }
    }
}

/// Consultation booking hours, in UTC, `[hours_start, hours_end)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessConfig {
    #[serde(default = "default_hours_start")]
    pub hours_start: u32,

    #[serde(default = "default_hours_end")]
    pub hours_end: u32,
}

fn default_hours_start() -> u32 {
    9
}

fn default_hours_end() -> u32 {
    17
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            hours_start: default_hours_start(),
            hours_end: default_hours_end(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl ChatbotxConfig {
    /// Load, validate and check the environment for a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        config.validate_env()?;

        Ok(config)
    }

    /// Parse and validate TOML text without touching the environment
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ChatbotxConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }

        if self.rate_limit.requests == 0 || self.rate_limit.period_secs == 0 {
            return Err(ConfigError::ValidationError(
                "rate_limit.requests and rate_limit.period_secs must be positive".to_string(),
            ));
        }

        if self.business.hours_start >= self.business.hours_end || self.business.hours_end > 24 {
            return Err(ConfigError::ValidationError(format!(
                "business hours {}..{} are not a valid range",
                self.business.hours_start, self.business.hours_end
            )));
        }

        if !self
            .chat
            .supported_languages
            .iter()
            .any(|l| l == &self.chat.default_language)
        {
            return Err(ConfigError::ValidationError(format!(
                "chat.default_language '{}' is not in supported_languages",
                self.chat.default_language
            )));
        }

        if self.websocket.cleanup_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "websocket.cleanup_interval_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Check that every environment variable the config references is set
    pub fn validate_env(&self) -> Result<(), ConfigError> {
        self.jwt_secret().map(|_| ())
    }

    /// Get the JWT secret from the environment
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        std::env::var(&self.auth.jwt_secret_env)
            .map_err(|_| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Shared, hot-reloadable configuration.
///
/// Services hold an `Arc<ConfigManager>` and call [`ConfigManager::config`]
/// whenever they need a setting, so a reload takes effect on the next
/// request without restarting anything.
pub struct ConfigManager {
    current: Arc<ArcSwap<ChatbotxConfig>>,
    config_path: PathBuf,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl ConfigManager {
    /// Load the config file at `path` (relative paths resolve against the
    /// working directory).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = ChatbotxConfig::load(&path)?;
        Ok(Self::with_path(config, path))
    }

    /// Wrap an in-memory config. [`reload`](Self::reload) and watching
    /// still target `chatbotx.toml`.
    pub fn from_config(config: ChatbotxConfig) -> Self {
        Self::with_path(config, PathBuf::from("chatbotx.toml"))
    }

    fn with_path(config: ChatbotxConfig, config_path: PathBuf) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(config)),
            config_path,
            watcher: Mutex::new(None),
        }
    }

    /// Snapshot of the live configuration (lockless read)
    pub fn config(&self) -> Arc<ChatbotxConfig> {
        self.current.load_full()
    }

    /// Path the configuration was loaded from
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Re-read the file and swap it in. An invalid file leaves the current
    /// configuration untouched.
    pub fn reload(&self) -> Result<Arc<ChatbotxConfig>, ConfigError> {
        swap_from_file(&self.current, &self.config_path)
    }

    /// Validate and swap in a configuration built in code.
    pub fn replace(&self, config: ChatbotxConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.current.store(Arc::new(config));
        Ok(())
    }

    /// Reload whenever the config file changes on disk.
    ///
    /// Bursts of filesystem events (editors often write a file in several
    /// steps) collapse into a single reload.
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let file_name = self.config_path.file_name().map(|n| n.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config {
                        let _ = tx.send(());
                    }
                }
                Ok(_) => {}
                Err(e) => error!("Config watcher error: {}", e),
            }
        })?;

        let dir = match self.config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        *self.watcher.lock() = Some(watcher);

        let current = Arc::clone(&self.current);
        let path = self.config_path.clone();
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                tokio::time::sleep(RELOAD_SETTLE).await;
                while rx.try_recv().is_ok() {}

                if let Err(e) = swap_from_file(&current, &path) {
                    warn!("Keeping previous configuration: {}", e);
                }
            }
        });

        info!(path = %self.config_path.display(), "Watching configuration for changes");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        if self.watcher.lock().take().is_some() {
            info!("Configuration watcher stopped");
        }
    }
}

/// Quiet period after a change event before the file is re-read.
const RELOAD_SETTLE: Duration = Duration::from_millis(250);

fn swap_from_file(
    current: &ArcSwap<ChatbotxConfig>,
    path: &Path,
) -> Result<Arc<ChatbotxConfig>, ConfigError> {
    let config = Arc::new(ChatbotxConfig::load(path)?);
    current.store(Arc::clone(&config));
    info!(path = %path.display(), "Configuration reloaded");
    Ok(config)
}

impl Clone for ConfigManager {
    /// Clones share the live configuration but not the file watcher.
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            config_path: self.config_path.clone(),
            watcher: Mutex::new(None),
        }
    }
}
