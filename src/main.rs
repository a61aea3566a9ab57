//! Shortsplit CLI
//!
//! Splits an uploaded video into fixed-length shorts.
//!
//! # Usage
//!
//! ```bash
//! shortsplit split talk.mp4 --chunk-seconds 45
//! shortsplit plan talk.mp4
//! shortsplit inspect talk.mp4
//! shortsplit sweep --max-retained 20
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use shortsplit::adapters::init_logging;
use shortsplit::app::DefaultAppContainer;
use shortsplit::cli::{commands, Cli, Commands};
use shortsplit::config_initialization::initialize_configuration_hierarchy;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let cli = Cli::parse();

    let loaded = initialize_configuration_hierarchy(&cli).context("Failed to load configuration")?;
    init_logging(&loaded.config.log_level, cli.log_json)?;

    info!("Starting Shortsplit");
    loaded.log_summary();
    let config = loaded.config;

    let container = DefaultAppContainer::new(&config);

    // Execute the requested command
    match cli.command {
        Commands::Split(args) => commands::split(&container, args).await,
        Commands::Inspect(args) => commands::inspect(&container, args).await,
        Commands::Plan(args) => commands::plan(&container, args).await,
        Commands::Sweep(args) => commands::sweep(&config, args).await,
    }
}
