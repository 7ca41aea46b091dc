//! Nitro - terminal client for the Nitro AI backend
//!
#![doc = "Nitro - terminal client for the Nitro AI backend"]
#![doc = "Main entry point for the nitro binary."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nitro::cli::{Cli, Commands};
use nitro::commands;
use nitro::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        commands::print_error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { session } => {
            if let Some(s) = &session {
                tracing::debug!("Continuing session: {}", s);
            }
            commands::chat::run_chat(config, session).await
        }
        Commands::Ask { message, session } => {
            commands::chat::run_ask(config, message, session).await
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command)
        }
        Commands::Remote { command } => commands::features::handle_remote(&config, command).await,
        Commands::Health => commands::features::run_health(&config).await,
        Commands::Image {
            prompt,
            negative,
            size,
        } => commands::features::run_image(&config, prompt, negative, size).await,
        Commands::Gallery { limit } => commands::features::run_gallery(&config, limit).await,
        Commands::Search { query, no_summary } => {
            commands::features::run_search(&config, query, no_summary).await
        }
        Commands::Speak { text, language } => {
            commands::features::run_speak(&config, text, language).await
        }
        Commands::Transcribe { file, microphone } => {
            commands::features::run_transcribe(&config, file, microphone).await
        }
        Commands::Video { prompt, duration } => {
            commands::features::run_video(&config, prompt, duration).await
        }
        Commands::Prefs { command } => commands::prefs::handle_prefs(&config, command),
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "nitro=debug" } else { "nitro=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
