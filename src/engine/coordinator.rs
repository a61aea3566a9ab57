//! Extraction coordinator
//!
//! One task per chunk, bounded by a semaphore. Tasks report over a channel to
//! a single receiver, which owns every job's status and is the only place a
//! batch result is produced. The first failure ends the batch at once; tasks
//! still running are left to finish on their own and their files are swept
//! later.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

use crate::domain::model::{BatchId, ChunkPlan, ExtractionJob, JobStatus, SourceMedia};
use crate::engine::EngineConfig;
use crate::error::{SplitError, SplitResult};
use crate::output::ArtifactNamer;
use crate::ports::{ExtractRequest, TranscodePort};
use crate::retention::{RetentionPolicy, RetentionSweeper, SweepReport};
use crate::utils::Utils;

/// What a successful batch produced
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub batch_id: BatchId,
    /// Output files in chunk index order
    pub outputs: Vec<PathBuf>,
    /// Eviction performed after the batch landed
    pub sweep: SweepReport,
}

enum JobEvent {
    Started(usize),
    Finished(usize, SplitResult<()>),
}

/// Dispatches and joins the extraction jobs of a batch
pub struct ExtractionCoordinator {
    transcoder: Arc<dyn TranscodePort>,
    namer: ArtifactNamer,
    sweeper: RetentionSweeper,
    config: EngineConfig,
    permits: Arc<Semaphore>,
}

impl ExtractionCoordinator {
    pub fn new(
        transcoder: Arc<dyn TranscodePort>,
        namer: ArtifactNamer,
        sweeper: RetentionSweeper,
        config: EngineConfig,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1)));
        Self {
            transcoder,
            namer,
            sweeper,
            config,
            permits,
        }
    }

    pub fn namer(&self) -> &ArtifactNamer {
        &self.namer
    }

    /// Extract every chunk of `plan` from `source`.
    ///
    /// On success the source file is deleted, retention runs and the outputs
    /// come back in plan order. On the first failed job the error is returned
    /// immediately and the source is left in place.
    pub async fn extract(&self, source: &SourceMedia, plan: &ChunkPlan) -> SplitResult<BatchOutput> {
        if plan.is_empty() {
            return Err(SplitError::validation("chunk plan is empty"));
        }

        let started_at = Instant::now();
        let batch = BatchId::generate();
        let out_dir = self.namer.dir().to_path_buf();

        tokio::fs::create_dir_all(&out_dir)
            .await
            .map_err(|source| SplitError::OutputDir {
                path: out_dir.clone(),
                source,
            })?;

        self.sweeper.before_batch(&out_dir).await;

        if let RetentionPolicy::Bounded { max_retained } = self.sweeper.policy() {
            if plan.len() > max_retained {
                warn!(
                    batch = %batch,
                    chunks = plan.len(),
                    max_retained,
                    "Batch is larger than the retention bound; keeping all of its clips"
                );
            }
        }

        let mut jobs: Vec<ExtractionJob> = plan
            .iter()
            .map(|spec| ExtractionJob::new(spec.clone(), self.namer.path_for(&batch, spec.index)))
            .collect();

        info!(
            batch = %batch,
            source = %source.path().display(),
            chunks = jobs.len(),
            chunk_seconds = plan.chunk_length_seconds(),
            "Dispatching extraction jobs"
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        for (slot, job) in jobs.iter().enumerate() {
            let request = ExtractRequest {
                index: job.spec.index,
                input: source.path().to_path_buf(),
                start_seconds: job.spec.start_offset_seconds,
                duration_seconds: job.spec.duration_seconds,
                output: job.output_path.clone(),
            };
            self.spawn_job(slot, request, tx.clone());
        }
        drop(tx);

        let mut succeeded = 0;
        while let Some(event) = rx.recv().await {
            match event {
                JobEvent::Started(slot) => {
                    if !jobs[slot].transition(JobStatus::Running) {
                        warn!(index = jobs[slot].spec.index, status = %jobs[slot].status(), "Ignoring late start");
                    }
                }
                JobEvent::Finished(slot, Ok(())) => {
                    if jobs[slot].transition(JobStatus::Succeeded) {
                        succeeded += 1;
                    }
                    debug!(batch = %batch, index = jobs[slot].spec.index, succeeded, total = jobs.len(), "Chunk done");
                    if succeeded == jobs.len() {
                        break;
                    }
                }
                JobEvent::Finished(slot, Err(e)) => {
                    jobs[slot].transition(JobStatus::Failed);
                    let pending = jobs.iter().filter(|j| !j.status().is_terminal()).count();
                    error!(
                        batch = %batch,
                        index = jobs[slot].spec.index,
                        pending,
                        error = %e,
                        "Extraction failed; abandoning batch"
                    );
                    return Err(e);
                }
            }
        }

        if succeeded != jobs.len() {
            // Every sender is gone but some job never reported: its task died
            let index = jobs
                .iter()
                .find(|j| j.status() != JobStatus::Succeeded)
                .map(|j| j.spec.index)
                .unwrap_or_default();
            return Err(SplitError::transcode(index, "worker stopped without reporting"));
        }

        // Join barrier passed: nothing reads the source any more
        if let Err(e) = tokio::fs::remove_file(source.path()).await {
            warn!(path = %source.path().display(), error = %e, "Failed to delete uploaded file");
        }

        let outputs: Vec<PathBuf> = jobs.into_iter().map(|job| job.output_path).collect();
        let sweep = self.sweeper.after_batch(&out_dir, &outputs).await;

        info!(
            batch = %batch,
            chunks = outputs.len(),
            elapsed = %Utils::format_duration(started_at.elapsed()),
            "Batch complete"
        );

        Ok(BatchOutput {
            batch_id: batch,
            outputs,
            sweep,
        })
    }

    fn spawn_job(&self, slot: usize, request: ExtractRequest, tx: mpsc::UnboundedSender<JobEvent>) {
        let transcoder = Arc::clone(&self.transcoder);
        let permits = Arc::clone(&self.permits);
        let timeout = self.config.job_timeout;
        let remove_failed = self.config.remove_failed_outputs;

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let _ = tx.send(JobEvent::Finished(
                        slot,
                        Err(SplitError::transcode(request.index, "worker pool closed")),
                    ));
                    return;
                }
            };
            // The receiver may be gone after an earlier failure; keep going
            let _ = tx.send(JobEvent::Started(slot));

            let result = run_job(transcoder.as_ref(), &request, timeout).await;

            if result.is_err() && remove_failed {
                match tokio::fs::remove_file(&request.output).await {
                    Ok(()) => debug!(path = %request.output.display(), "Removed partial output"),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => warn!(path = %request.output.display(), error = %e, "Failed to remove partial output"),
                }
            }

            let _ = tx.send(JobEvent::Finished(slot, result));
        });
    }
}

async fn run_job(
    transcoder: &dyn TranscodePort,
    request: &ExtractRequest,
    timeout: Option<Duration>,
) -> SplitResult<()> {
    debug!(
        index = request.index,
        start = request.start_seconds,
        duration = request.duration_seconds,
        "Extracting chunk"
    );
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, transcoder.extract_range(request)).await {
            Ok(result) => result,
            Err(_) => Err(SplitError::transcode(
                request.index,
                format!("timed out after {}s", limit.as_secs_f64()),
            )),
        },
        None => transcoder.extract_range(request).await,
    }
}
