//! Extraction engine module
//!
//! Fans a chunk plan out to concurrent transcode jobs and joins on them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod coordinator;

pub use coordinator::{BatchOutput, ExtractionCoordinator};

/// Extraction engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on transcode processes running at once
    pub max_concurrent_jobs: usize,
    /// Per-job limit; `None` waits forever
    pub job_timeout: Option<Duration>,
    /// Delete the partial output of a job that failed
    pub remove_failed_outputs: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: num_cpus::get().max(1),
            job_timeout: Some(Duration::from_secs(600)),
            remove_failed_outputs: true,
        }
    }
}
