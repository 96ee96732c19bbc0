use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chatbotx::cli::init::{self, InitConfig, InitResult};
use chatbotx::cli::output::Output;
use chatbotx::cli::{ask, Cli, Commands};
use chatbotx::utils::toml_config::ServerConfig;
use chatbotx::{create_app, AppState, ChatbotxConfig, ConfigManager};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(server: &ServerConfig, verbose: bool) {
    let default_filter = if verbose {
        "debug".to_string()
    } else {
        format!("{},tower_http=info", server.log_level)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    if server.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Some(Commands::Init {
            path,
            force,
            host,
            port,
        }) => match init::run(
            InitConfig {
                path,
                force,
                host,
                port,
            },
            &output,
        ) {
            InitResult::Success | InitResult::AlreadyExists => ExitCode::SUCCESS,
            InitResult::Error(_) => ExitCode::FAILURE,
        },
        Some(Commands::Config { full, validate }) => show_config(&cli.config, full, validate, &output),
        Some(Commands::Ask { message, sender }) => match ask::load_config(&cli.config) {
            Ok(config) => {
                if ask::run(&config, &message, &sender, &output).error {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(e) => {
                output.error(&format!("Invalid configuration: {}", e));
                ExitCode::FAILURE
            }
        },
        None => match serve(&cli.config, cli.verbose).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                output.error(&format!("{:#}", e));
                ExitCode::FAILURE
            }
        },
    }
}

fn show_config(path: &Path, full: bool, validate: bool, output: &Output) -> ExitCode {
    let config = match ChatbotxConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            output.error(&format!("{}: {}", path.display(), e));
            return ExitCode::FAILURE;
        }
    };

    if validate {
        output.success(&format!("{} is valid", path.display()));
        if !full {
            return ExitCode::SUCCESS;
        }
    }

    output.header("Configuration");
    output.kv("file", &path.display().to_string());
    output.kv("listen", &config.bind_addr());
    output.kv("database", &config.database.url);
    output.kv("languages", &config.chat.supported_languages.join(", "));
    output.kv(
        "business hours",
        &format!(
            "{:02}:00-{:02}:00",
            config.business.hours_start, config.business.hours_end
        ),
    );

    if full {
        match toml::to_string_pretty(&config) {
            Ok(text) => {
                output.subheader("Full configuration");
                println!("{}", text);
            }
            Err(e) => {
                output.error(&format!("Failed to render configuration: {}", e));
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

async fn serve(config_path: &Path, verbose: bool) -> anyhow::Result<()> {
    let manager = ConfigManager::new(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let config = manager.config();
    init_tracing(&config.server, verbose);

    manager
        .start_watching()
        .context("Failed to watch configuration file")?;

    let state = AppState::build(Arc::new(manager))
        .await
        .context("Failed to initialise application state")?;
    state.spawn_background_tasks();

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("ChatBotX listening on http://{}", addr);

    axum::serve(
        listener,
        create_app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("ChatBotX stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
