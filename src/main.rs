//! UltraCade ITG-IO Driver CLI
//!
//! Inspect, test and drive the ITG-IO arcade I/O board from userspace.

use clap::Parser;
use tracing::debug;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

use itgio_driver::ItgioConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load config
    let config_path = cli.config.unwrap_or_else(ItgioConfig::default_path);
    debug!("Loading config from {:?}", config_path);
    let mut config = ItgioConfig::load(&config_path)?;
    if let Some(variant) = cli.variant {
        config.variant = variant.into();
    }
    debug!("Board variant: {}", config.variant);

    let driver = config.driver();

    match cli.command {
        None | Some(Commands::List { json: false }) => commands::query::list(false)?,
        Some(Commands::List { json: true }) => commands::query::list(true)?,
        Some(Commands::Descriptor { file, write }) => {
            commands::query::descriptor(&driver, file.as_deref(), write.as_deref())?;
        }
        Some(Commands::Set { index, state }) => {
            commands::lights::set(&driver, index, state.level())?;
        }
        Some(Commands::Test { delay_ms }) => commands::lights::test(&driver, delay_ms)?,
        Some(Commands::Watch) => commands::watch::watch(&driver)?,
        Some(Commands::Serve) => commands::serve::serve(&config, driver).await?,
    }

    Ok(())
}
