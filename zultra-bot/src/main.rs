//! Binary entry point: parse the CLI, load settings, run the bot until a
//! shutdown signal arrives.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use zultra_bot::{Cli, Commands, Settings, SettingsStore, ZultraBot};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => run(token).await,
    }
}

async fn run(token: Option<String>) -> Result<()> {
    let settings = Settings::load(token)?;
    zultra_core::init_tracing(settings.log_file.as_deref())?;
    info!(
        environment = settings.environment.as_str(),
        "Starting zultra"
    );

    let store = Arc::new(SettingsStore::new(settings));
    let bot = ZultraBot::new(store);
    bot.initialize().await?;
    bot.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    bot.shutdown().await;
    Ok(())
}
