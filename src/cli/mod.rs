//! CLI module for ChatBotX
//!
//! Provides command-line interface parsing and handling for the chatbotx-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod ask;
pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ChatBotX - Education Support Assistant
///
/// A rule-based support assistant with REST and WebSocket chat.
#[derive(Parser, Debug)]
#[command(
    name = "chatbotx-server",
    author = "ChatBotX Team <dev@chatbotx.com>",
    version,
    about = "ChatBotX - Education Support Assistant",
    long_about = "A rule-based support assistant for course, pricing, enrollment and booking questions.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a deployment.",
    after_help = "EXAMPLES:\n    \
                  chatbotx-server init                  # Scaffold chatbotx.toml and .env.example\n    \
                  chatbotx-server                       # Start the server (requires chatbotx.toml)\n    \
                  chatbotx-server ask \"How much?\"       # Ask the assistant offline\n    \
                  chatbotx-server --config my.toml      # Use a custom config file"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "chatbotx.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold chatbotx.toml, .env.example, .gitignore and data/
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "8000")]
        port: u16,
    },

    /// Show configuration information
    Config {
        /// Show the full configuration
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Ask the assistant a question without starting the server
    Ask {
        /// The message to send
        message: String,

        /// Sender id used for the conversation context
        #[arg(long, default_value = "cli")]
        sender: String,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
