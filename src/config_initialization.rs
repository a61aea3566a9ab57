//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::SplitterConfig;
use crate::error::{SplitError, SplitResult};

/// Files tried, in order, when no `--config` is given
const DEFAULT_CONFIG_PATHS: &[&str] = &["shortsplit.toml", "config/shortsplit.toml"];

/// Resolved configuration plus where its values came from
#[derive(Debug, Clone)]
pub struct LoadedConfiguration {
    pub config: SplitterConfig,
    /// Config file that was read, if any
    pub source: Option<PathBuf>,
    pub env_overrides: usize,
    pub cli_overrides: usize,
}

impl LoadedConfiguration {
    /// Report how the configuration was assembled.
    ///
    /// Loading happens before the subscriber exists, so this runs once
    /// logging is up.
    pub fn log_summary(&self) {
        match &self.source {
            Some(path) => debug!("Loaded configuration from: {}", path.display()),
            None => debug!("No configuration file found, using defaults"),
        }
        if self.env_overrides > 0 {
            debug!("Applied {} environment variable overrides", self.env_overrides);
        }
        if self.cli_overrides > 0 {
            debug!("Applied {} CLI configuration overrides", self.cli_overrides);
        }
        info!(
            output_dir = %self.config.output_dir.display(),
            chunk_seconds = self.config.chunk_seconds,
            retention = ?self.config.retention,
            "Configuration ready"
        );
    }
}

/// Build configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> SplitResult<LoadedConfiguration> {
    // Steps 1 and 2: defaults, then the config file
    let source = locate_config_file(cli.config.as_deref())?;
    let mut config = match &source {
        Some(path) => SplitterConfig::from_file(path)?,
        None => SplitterConfig::default(),
    };

    // Step 3: environment
    let env_overrides = config.apply_env(|name| std::env::var(name).ok())?;

    // Step 4: command line
    let cli_overrides = apply_cli_configuration_overrides(&mut config, cli);

    config.validate()?;
    Ok(LoadedConfiguration {
        config,
        source,
        env_overrides,
        cli_overrides,
    })
}

/// An explicit path must exist; otherwise the first default present is used
fn locate_config_file(explicit: Option<&Path>) -> SplitResult<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(SplitError::config(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    Ok(DEFAULT_CONFIG_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists()))
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_configuration_overrides(config: &mut SplitterConfig, cli: &Cli) -> usize {
    let mut cli_overrides = 0;

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
        cli_overrides += 1;
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
        cli_overrides += 1;
    }
    if let Some(dir) = &cli.upload_dir {
        config.upload_dir = dir.clone();
        cli_overrides += 1;
    }
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
        cli_overrides += 1;
    }
    if let Some(jobs) = cli.max_concurrent_jobs {
        config.max_concurrent_jobs = jobs;
        cli_overrides += 1;
    }

    cli_overrides
}
