//! Init command implementation
//!
//! Scaffolds a ChatBotX deployment: `chatbotx.toml`, `.env.example`,
//! `.gitignore` and the `data/` directory.

use super::output::Output;
use std::fs;
use std::path::Path;

/// Result of the init operation
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// chatbotx.toml already exists
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: std::path::PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing ChatBotX");

    let base_path = &config.path;

    let config_path = base_path.join("chatbotx.toml");
    if config_path.exists() && !config.force {
        output.warning("chatbotx.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.subheader("Creating directories");
    let data_dir = base_path.join("data");
    if data_dir.exists() {
        output.skipped("data", "already exists");
    } else {
        if let Err(e) = fs::create_dir_all(&data_dir) {
            output.error(&format!("Failed to create data: {}", e));
            return InitResult::Error(e.to_string());
        }
        output.created_dir("data");
    }

    output.subheader("Creating configuration files");

    if let Err(e) = write_file(&config_path, &generate_chatbotx_toml(&config), config.force) {
        output.error(&format!("Failed to create chatbotx.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "chatbotx.toml");

    let env_example_path = base_path.join(".env.example");
    if let Err(e) = write_file(&env_example_path, &generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    let gitignore_path = base_path.join(".gitignore");
    if gitignore_path.exists() {
        output.skipped(".gitignore", "already exists");
    } else if let Err(e) = write_file(&gitignore_path, &generate_gitignore(), false) {
        output.warning(&format!("Failed to create .gitignore: {}", e));
    } else {
        output.created("file", ".gitignore");
    }

    output.complete("ChatBotX initialized successfully!");

    output.header("Next Steps");
    output.newline();
    output.info("1. Set up environment variables:");
    output.command("cp .env.example .env");
    output.command("# Edit .env and set JWT_SECRET (min 32 chars)");
    output.newline();
    output.info("2. Try the assistant offline:");
    output.command("chatbotx-server ask \"What courses do you offer?\"");
    output.newline();
    output.info("3. Start the server:");
    output.command("chatbotx-server");
    output.newline();

    output.hint(&format!(
        "Server will be available at http://{}:{} (WebSocket chat at /ws/{{client_id}})",
        config.host, config.port
    ));
    output.hint("API docs available at /swagger-ui/ (requires 'swagger-ui' feature)");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_chatbotx_toml(config: &InitConfig) -> String {
    format!(
        r#"# ChatBotX configuration
# Changes are picked up at runtime without a restart.

[server]
host = "{host}"
port = {port}
log_level = "info"
# "pretty" or "json"
log_format = "pretty"

[auth]
# Name of the environment variable holding the JWT signing secret
jwt_secret_env = "JWT_SECRET"
jwt_access_expiry = 1800
jwt_refresh_expiry = 2592000

[database]
# Local file, or ":memory:"
url = "./data/chatbotx.db"

[cors]
allowed_origins = ["http://localhost:3000", "http://localhost:8000"]

[rate_limit]
enabled = true
requests = 100
period_secs = 60

[chat]
enable_language_detection = true
enable_sentiment_analysis = true
supported_languages = ["en", "es", "fr", "de"]
default_language = "en"
context_ttl_secs = 3600
faq_cache_ttl_secs = 1800
max_quick_replies = 4

[websocket]
inactivity_timeout_secs = 1800
cleanup_interval_secs = 300

[analytics]
enabled = true
retention_days = 90

# Consultation hours (UTC), start inclusive, end exclusive
[business]
hours_start = 9
hours_end = 17
"#,
        host = config.host,
        port = config.port
    )
}

fn generate_env_example() -> String {
    r#"# ChatBotX Environment Variables
# ==============================
# Copy this file to .env and fill in the values.

# REQUIRED: JWT secret for authentication (minimum 32 characters)
# Generate with: openssl rand -base64 32
JWT_SECRET=change-me-in-production-use-at-least-32-characters

# Optional: Logging filter, overrides [server].log_level
RUST_LOG=info,chatbotx=debug
"#
    .to_string()
}

fn generate_gitignore() -> String {
    r#"# ChatBotX Generated Files
/data/
*.db
*.db-journal

# Environment
.env
.env.local

# Rust
/target/

# IDE
.idea/
.vscode/
*.swp

# OS
.DS_Store
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::ChatbotxConfig;
    use tempfile::TempDir;

    fn create_test_config(temp_dir: &TempDir) -> InitConfig {
        InitConfig {
            path: temp_dir.path().to_path_buf(),
            force: false,
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }

    #[test]
    fn test_generated_toml_parses() {
        let config = InitConfig {
            path: std::path::PathBuf::from("/tmp"),
            force: false,
            host: "0.0.0.0".to_string(),
            port: 9090,
        };

        let parsed = ChatbotxConfig::parse(&generate_chatbotx_toml(&config))
            .expect("generated config should be valid");
        assert_eq!(parsed.server.host, "0.0.0.0");
        assert_eq!(parsed.server.port, 9090);
        assert_eq!(parsed.business.hours_start, 9);
        assert_eq!(parsed.chat.max_quick_replies, 4);
    }

    #[test]
    fn test_generate_env_example() {
        let content = generate_env_example();
        assert!(content.contains("JWT_SECRET="));
        assert!(content.contains("RUST_LOG="));
    }

    #[test]
    fn test_generate_gitignore() {
        let content = generate_gitignore();
        assert!(content.contains("/data/"));
        assert!(content.contains(".env"));
        assert!(content.contains("/target/"));
    }

    #[test]
    fn test_write_file_skips_existing_without_force() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "original").expect("Failed to write");

        write_file(&file_path, "new content", false).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "original");

        write_file(&file_path, "new content", true).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_run_creates_all_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = run(create_test_config(&temp_dir), &Output::no_color());

        assert!(matches!(result, InitResult::Success));
        assert!(temp_dir.path().join("chatbotx.toml").exists());
        assert!(temp_dir.path().join(".env.example").exists());
        assert!(temp_dir.path().join(".gitignore").exists());
        assert!(temp_dir.path().join("data").is_dir());
    }

    #[test]
    fn test_run_already_exists_without_force() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("chatbotx.toml"), "existing").expect("Failed to write");

        let result = run(create_test_config(&temp_dir), &Output::no_color());
        assert!(matches!(result, InitResult::AlreadyExists));
    }

    #[test]
    fn test_run_force_overwrites() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("chatbotx.toml"), "existing").expect("Failed to write");

        let mut config = create_test_config(&temp_dir);
        config.force = true;
        let result = run(config, &Output::no_color());

        assert!(matches!(result, InitResult::Success));
        let content = fs::read_to_string(temp_dir.path().join("chatbotx.toml")).unwrap();
        assert!(content.contains("[server]"));
        assert!(!content.contains("existing"));
    }
}
