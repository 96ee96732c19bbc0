//! `ask` command: run the responder once, without a server or database.

use super::output::Output;
use crate::bot::{BotReply, Responder};
use crate::catalog::Catalog;
use crate::utils::toml_config::{ChatbotxConfig, ConfigError, ConfigManager};
use serde_json::Map;
use std::path::Path;
use std::sync::Arc;

/// Read the config file when present, else use defaults. The JWT secret is
/// not needed here, so the environment is not checked.
pub fn load_config(path: &Path) -> Result<ChatbotxConfig, ConfigError> {
    if !path.exists() {
        return Ok(ChatbotxConfig::default());
    }
    ChatbotxConfig::parse(&std::fs::read_to_string(path)?)
}

pub fn run(config: &ChatbotxConfig, message: &str, sender: &str, output: &Output) -> BotReply {
    let responder = Responder::new(
        Arc::new(Catalog::seeded()),
        Arc::new(ConfigManager::from_config(config.clone())),
    );
    let reply = responder.process_message(message, sender, &Map::new());

    if reply.error {
        output.error(&reply.text);
        return reply;
    }

    output.newline();
    for line in reply.text.lines() {
        println!("  {}", line);
    }

    if !reply.quick_replies.is_empty() {
        output.subheader("Quick replies");
        for quick_reply in &reply.quick_replies {
            output.list_item(&format!("{} ({})", quick_reply.title, quick_reply.payload));
        }
    }
    if !reply.buttons.is_empty() {
        output.subheader("Buttons");
        for button in &reply.buttons {
            output.list_item(&format!("{} ({})", button.title, button.payload));
        }
    }

    output.newline();
    output.kv("intent", reply.intent.as_str());
    output.kv("confidence", &format!("{:.2}", reply.confidence));
    output.kv("source", reply.source);

    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::Intent;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chatbotx.toml");
        std::fs::write(&path, "[server]\nport = 0\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_run_answers() {
        let reply = run(
            &ChatbotxConfig::default(),
            "hello",
            "cli",
            &Output::no_color(),
        );
        assert_eq!(reply.intent, Intent::Greeting);
        assert!(!reply.quick_replies.is_empty());
    }

    #[test]
    fn test_run_empty_message() {
        let reply = run(&ChatbotxConfig::default(), "  ", "cli", &Output::no_color());
        assert!(reply.error);
    }
}
