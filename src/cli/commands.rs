//! Command implementations
//!
//! Results go to stdout as JSON; logs go to stderr.

use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::app::{AppContainer, SplitRequest};
use crate::cli::args::{InspectArgs, PlanArgs, SplitArgs, SweepArgs};
use crate::config::SplitterConfig;
use crate::intake::UploadIntake;
use crate::retention::{self, RetentionPolicy, SweepReport};

/// What `sweep` removed from each directory
#[derive(Debug, Serialize)]
struct SweepSummary {
    artifacts: SweepReport,
    uploads: SweepReport,
}

/// Execute the split command
///
/// Prints `{"clips": [...]}` and exits 0, or `{"error": "..."}` and exits 1.
pub async fn split(container: &dyn AppContainer, args: SplitArgs) -> Result<ExitCode> {
    info!("Starting split operation");

    let mut request = SplitRequest::new(args.input);
    request.chunk_seconds = args.chunk_seconds;

    let result = container.split_interactor().respond(request).await;
    print_json(&result, args.pretty)?;

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Execute the inspect command
pub async fn inspect(container: &dyn AppContainer, args: InspectArgs) -> Result<ExitCode> {
    let media = container
        .split_interactor()
        .inspect(&args.input)
        .await
        .with_context(|| format!("Failed to inspect {}", args.input.display()))?;

    print_json(&media, true)?;
    Ok(ExitCode::SUCCESS)
}

/// Execute the plan command
pub async fn plan(container: &dyn AppContainer, args: PlanArgs) -> Result<ExitCode> {
    let plan = container
        .split_interactor()
        .plan(&args.input, args.chunk_seconds.as_deref())
        .await
        .with_context(|| format!("Failed to plan {}", args.input.display()))?;

    info!(chunks = plan.len(), "Plan ready");
    print_json(&plan, true)?;
    Ok(ExitCode::SUCCESS)
}

/// Execute the sweep command
pub async fn sweep(config: &SplitterConfig, args: SweepArgs) -> Result<ExitCode> {
    let policy = if args.clear {
        RetentionPolicy::ClearBeforeBatch
    } else if let Some(max_retained) = args.max_retained {
        RetentionPolicy::Bounded { max_retained }
    } else {
        config.retention_policy()
    };

    info!(dir = %config.output_dir.display(), ?policy, "Sweeping output directory");
    let artifacts = retention::sweep(&config.output_dir, policy).await;

    let uploads = match config.stale_upload_age() {
        Some(max_age) => {
            UploadIntake::new(&config.upload_dir, config.max_upload_bytes)
                .sweep_stale(max_age)
                .await
        }
        None => SweepReport::default(),
    };

    let summary = SweepSummary { artifacts, uploads };
    print_json(&summary, true)?;
    Ok(if summary.artifacts.failed.is_empty() && summary.uploads.failed.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize result")?;
    println!("{}", rendered);
    Ok(())
}
