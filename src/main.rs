// src/main.rs

//! Collection Watcher CLI
//!
//! Watches a Steam Workshop collection, mirrors its state locally, and
//! sends one Discord notification per detected change.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use collection_watcher::error::Result;
use collection_watcher::models::Config;
use collection_watcher::pipeline::{Reconciler, RunLock, ScrapeSequencer, run_watch};
use collection_watcher::services::{
    DiscordWebhook, Notifier, SteamCollectionSource, WorkshopPageScraper,
};
use collection_watcher::storage::JsonStateStore;

#[derive(Parser, Debug)]
#[command(
    name = "collection-watcher",
    version,
    about = "Watches a Steam Workshop collection and notifies on changes"
)]
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the watch loop (periodic checks and refreshes)
    Watch,
    /// Run a single incremental check and exit
    Check,
    /// Run a single full refresh and exit
    Refresh,
    /// Validate the configuration file
    Validate,
}

/// Wire the engine to its production collaborators.
fn build_reconciler(config: &Config) -> Result<Reconciler> {
    let lock = RunLock::new();
    let sequencer = ScrapeSequencer::new(
        Arc::new(WorkshopPageScraper::new(config)?),
        lock,
        Duration::from_secs(config.scraper.scrape_delay_secs),
    );
    let notifier = Notifier::new(Arc::new(DiscordWebhook::new(config)?), config);

    Ok(Reconciler::new(
        Arc::new(SteamCollectionSource::new(config)?),
        sequencer,
        notifier,
        Arc::new(JsonStateStore::new(&config.paths.data_dir)),
    ))
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();

    match cli.command {
        Command::Watch => {
            config.validate()?;
            let reconciler = Arc::new(build_reconciler(&config)?);
            run_watch(reconciler, &config.schedule).await?;
        }
        Command::Check => {
            config.validate()?;
            build_reconciler(&config)?.check().await?;
        }
        Command::Refresh => {
            config.validate()?;
            build_reconciler(&config)?.refresh().await?;
        }
        Command::Validate => {
            config.validate()?;
            println!("Configuration OK");
        }
    }

    Ok(())
}
