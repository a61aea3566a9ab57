// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{SplitError, SplitResult};

/// What the media inspector reports about a source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Probed file
    pub path: PathBuf,
    /// Container duration in seconds
    pub duration_seconds: f64,
    /// Container format name as reported by the inspector
    pub format_name: Option<String>,
    /// File size in bytes
    pub size_bytes: Option<u64>,
}

/// An uploaded file ready for splitting.
///
/// Read-only for the lifetime of a batch; the file is removed only after every
/// chunk has been produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMedia {
    path: PathBuf,
    total_duration_seconds: f64,
}

impl SourceMedia {
    /// Create a source from a path and its probed duration
    pub fn new(path: impl Into<PathBuf>, total_duration_seconds: f64) -> SplitResult<Self> {
        let path = path.into();
        if !total_duration_seconds.is_finite() || total_duration_seconds <= 0.0 {
            return Err(SplitError::probe(format!(
                "{} reports a non-positive duration ({})",
                path.display(),
                total_duration_seconds
            )));
        }
        Ok(Self {
            path,
            total_duration_seconds,
        })
    }

    /// Create a source from inspector output
    pub fn from_media_info(info: &MediaInfo) -> SplitResult<Self> {
        Self::new(info.path.clone(), info.duration_seconds)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn total_duration_seconds(&self) -> f64 {
        self.total_duration_seconds
    }
}

/// One time range to extract from the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkSpec {
    /// 1-based position in the plan
    pub index: usize,
    /// Offset into the source in seconds
    pub start_offset_seconds: f64,
    /// Length of the range in seconds, always > 0
    pub duration_seconds: f64,
}

impl ChunkSpec {
    /// Exclusive end of the range in seconds
    pub fn end_seconds(&self) -> f64 {
        self.start_offset_seconds + self.duration_seconds
    }
}

/// Ordered, gap-free cover of a source by chunk ranges
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkPlan {
    chunk_length_seconds: u32,
    total_duration_seconds: f64,
    specs: Vec<ChunkSpec>,
}

impl ChunkPlan {
    /// Only the planner builds plans
    pub(crate) fn from_specs(
        chunk_length_seconds: u32,
        total_duration_seconds: f64,
        specs: Vec<ChunkSpec>,
    ) -> Self {
        Self {
            chunk_length_seconds,
            total_duration_seconds,
            specs,
        }
    }

    pub fn chunk_length_seconds(&self) -> u32 {
        self.chunk_length_seconds
    }

    pub fn total_duration_seconds(&self) -> f64 {
        self.total_duration_seconds
    }

    pub fn specs(&self) -> &[ChunkSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChunkSpec> {
        self.specs.iter()
    }
}

impl<'a> IntoIterator for &'a ChunkPlan {
    type Item = &'a ChunkSpec;
    type IntoIter = std::slice::Iter<'a, ChunkSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

/// Lifecycle of an extraction job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    /// Allowed moves: pending -> running -> succeeded | failed
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Succeeded)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Extraction of one chunk into its own output file
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionJob {
    pub spec: ChunkSpec,
    pub output_path: PathBuf,
    status: JobStatus,
}

impl ExtractionJob {
    pub fn new(spec: ChunkSpec, output_path: PathBuf) -> Self {
        Self {
            spec,
            output_path,
            status: JobStatus::Pending,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Move to `next`; returns false and leaves the job untouched if the move
    /// is not allowed.
    pub fn transition(&mut self, next: JobStatus) -> bool {
        if self.status.can_transition_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }
}

/// Identifier shared by every artifact of one batch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchId(String);

impl BatchId {
    /// UTC timestamp followed by a random component
    pub fn generate() -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}{}",
            Utc::now().format("%Y%m%d%H%M%S%3f"),
            &random[..8]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The single answer produced for an upload.
///
/// Serializes as `{"clips": [...]}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchResult {
    Clips(Vec<String>),
    Error(String),
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, BatchResult::Clips(_))
    }
}

impl From<SplitResult<Vec<String>>> for BatchResult {
    fn from(result: SplitResult<Vec<String>>) -> Self {
        match result {
            Ok(clips) => BatchResult::Clips(clips),
            Err(e) => BatchResult::Error(e.to_string()),
        }
    }
}

/// A finished output file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub modified: SystemTime,
}

#[cfg(test)]
mod tests;
