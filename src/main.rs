use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipmirror::cli::{commands, Cli, Commands};
use clipmirror::config::{Config, LoggingConfig};

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(&config.logging)?;

    match cli.command {
        Commands::Run { interval } => {
            commands::run(config, interval.as_deref()).await?;
        }
        Commands::Once => {
            commands::once(config).await?;
        }
        Commands::Classify { url, domain } => {
            commands::classify_link(&url, domain.as_deref())?;
        }
        Commands::Seen { id } => {
            commands::seen(&config, &id)?;
        }
        Commands::Mark { id } => {
            commands::mark(&config, &id)?;
        }
    }

    Ok(())
}
