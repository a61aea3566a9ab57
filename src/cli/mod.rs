//! CLI module for Shortsplit
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// Shortsplit
///
/// Splits a video into fixed-length shorts with one ffmpeg job per chunk and
/// prints where the clips can be fetched.
#[derive(Parser, Debug)]
#[command(name = "shortsplit")]
#[command(about = "Shortsplit - Cut a video into fixed-length shorts")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, `[shortsplit]` table)
    #[arg(long, global = true, env = "SHORTSPLIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level or filter directive
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Directory receiving the shorts
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Directory uploads are staged in
    #[arg(long, global = true)]
    pub upload_dir: Option<PathBuf>,

    /// Base URL used to build clip locations
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Maximum ffmpeg processes running at once
    #[arg(long, global = true, value_parser = args::parse_job_limit)]
    pub max_concurrent_jobs: Option<usize>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a video into shorts
    Split(args::SplitArgs),
    /// Show what the media inspector reports for a file
    Inspect(args::InspectArgs),
    /// Show the chunk plan for a file without transcoding
    Plan(args::PlanArgs),
    /// Apply the retention policy to the output directory
    Sweep(args::SweepArgs),
}
