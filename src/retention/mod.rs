//! Retention of generated shorts
//!
//! Sweeping is best-effort housekeeping: listing and deletion failures are
//! logged and reported, never returned as errors.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domain::model::Artifact;
use crate::output::ArtifactNamer;

/// How the artifact directory is bounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionMode {
    /// Keep at most `max_retained` artifacts, evicting the oldest
    Bounded,
    /// Remove every artifact before a new batch starts
    ClearBeforeBatch,
    /// Never delete
    KeepAll,
}

/// Retention policy with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    Bounded { max_retained: usize },
    ClearBeforeBatch,
    KeepAll,
}

impl RetentionPolicy {
    pub fn from_mode(mode: RetentionMode, max_retained: usize) -> Self {
        match mode {
            RetentionMode::Bounded => RetentionPolicy::Bounded { max_retained },
            RetentionMode::ClearBeforeBatch => RetentionPolicy::ClearBeforeBatch,
            RetentionMode::KeepAll => RetentionPolicy::KeepAll,
        }
    }
}

/// Outcome of a sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Removed artifacts, oldest first
    pub deleted: Vec<PathBuf>,
    /// Artifacts that could not be removed
    pub failed: Vec<PathBuf>,
    /// Artifacts left in the directory
    pub retained: usize,
}

/// List artifacts in `dir` ordered by modification time, oldest first.
///
/// Ties are broken by path so the order is stable.
pub fn list_artifacts(dir: &Path) -> Vec<Artifact> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut artifacts: Vec<Artifact> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && ArtifactNamer::is_artifact(entry.path()))
        .map(|entry| {
            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            Artifact {
                path: entry.into_path(),
                modified,
            }
        })
        .collect();

    artifacts.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
    artifacts
}

/// Apply `policy` to the artifacts in `dir`
pub async fn sweep(dir: &Path, policy: RetentionPolicy) -> SweepReport {
    sweep_protecting(dir, policy, &HashSet::new()).await
}

/// Apply `policy` to `dir`, never deleting a path in `protected`.
///
/// Protected artifacts count towards the bound, so a directory may stay above
/// `max_retained` when the protected set alone exceeds it.
pub async fn sweep_protecting(
    dir: &Path,
    policy: RetentionPolicy,
    protected: &HashSet<PathBuf>,
) -> SweepReport {
    if policy == RetentionPolicy::KeepAll {
        return SweepReport {
            retained: count_artifacts(dir).await,
            ..SweepReport::default()
        };
    }

    let listing_dir = dir.to_path_buf();
    let artifacts = match tokio::task::spawn_blocking(move || list_artifacts(&listing_dir)).await {
        Ok(artifacts) => artifacts,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Artifact listing aborted");
            return SweepReport::default();
        }
    };

    let total = artifacts.len();
    let candidates: Vec<Artifact> = artifacts
        .into_iter()
        .filter(|artifact| !protected.contains(&artifact.path))
        .collect();

    let evict = match policy {
        RetentionPolicy::Bounded { max_retained } => total.saturating_sub(max_retained),
        RetentionPolicy::ClearBeforeBatch => total,
        RetentionPolicy::KeepAll => 0,
    }
    .min(candidates.len());

    let mut report = SweepReport {
        retained: total - evict,
        ..SweepReport::default()
    };

    for artifact in candidates.into_iter().take(evict) {
        match tokio::fs::remove_file(&artifact.path).await {
            Ok(()) => {
                debug!(path = %artifact.path.display(), "Evicted artifact");
                report.deleted.push(artifact.path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Another sweep got there first
                report.deleted.push(artifact.path);
            }
            Err(e) => {
                warn!(path = %artifact.path.display(), error = %e, "Failed to evict artifact");
                report.failed.push(artifact.path);
            }
        }
    }
    report.retained += report.failed.len();

    if !report.deleted.is_empty() {
        info!(
            dir = %dir.display(),
            deleted = report.deleted.len(),
            retained = report.retained,
            "Retention sweep finished"
        );
    }
    report
}

async fn count_artifacts(dir: &Path) -> usize {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || list_artifacts(&dir).len())
        .await
        .unwrap_or(0)
}

/// Runs the configured policy at the points of a batch where it applies
#[derive(Debug, Clone, Copy)]
pub struct RetentionSweeper {
    policy: RetentionPolicy,
}

impl RetentionSweeper {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Clear-before-batch removal; no-op for the other policies
    pub async fn before_batch(&self, dir: &Path) -> SweepReport {
        match self.policy {
            RetentionPolicy::ClearBeforeBatch => sweep(dir, self.policy).await,
            _ => SweepReport::default(),
        }
    }

    /// Bounded eviction once a batch has landed; `batch_outputs` are never
    /// evicted. No-op for the other policies.
    pub async fn after_batch(&self, dir: &Path, batch_outputs: &[PathBuf]) -> SweepReport {
        match self.policy {
            RetentionPolicy::Bounded { .. } => {
                let protected: HashSet<PathBuf> = batch_outputs.iter().cloned().collect();
                sweep_protecting(dir, self.policy, &protected).await
            }
            _ => SweepReport::default(),
        }
    }
}
