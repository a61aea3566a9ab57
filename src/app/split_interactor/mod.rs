// Split interactor - Orchestrates the upload-to-shorts use case

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::model::{BatchResult, ChunkPlan, MediaInfo, SourceMedia};
use crate::engine::ExtractionCoordinator;
use crate::error::{SplitError, SplitResult};
use crate::intake::UploadIntake;
use crate::output::ClipLocator;
use crate::planner::{ChunkLengthPolicy, ChunkPlanner};
use crate::ports::ProbePort;

/// One inbound split request
#[derive(Debug, Clone)]
pub struct SplitRequest {
    /// File as handed over by the caller
    pub input: PathBuf,
    /// Raw chunk length as supplied, if any
    pub chunk_seconds: Option<String>,
}

impl SplitRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            chunk_seconds: None,
        }
    }

    pub fn with_chunk_seconds(mut self, chunk_seconds: impl Into<String>) -> Self {
        self.chunk_seconds = Some(chunk_seconds.into());
        self
    }
}

/// Interactor for the split use case
pub struct SplitInteractor {
    intake: UploadIntake,
    probe_port: Arc<dyn ProbePort>,
    planner: ChunkPlanner,
    chunk_policy: ChunkLengthPolicy,
    coordinator: ExtractionCoordinator,
    locator: ClipLocator,
}

impl SplitInteractor {
    /// Create new split interactor with injected collaborators
    pub fn new(
        intake: UploadIntake,
        probe_port: Arc<dyn ProbePort>,
        chunk_policy: ChunkLengthPolicy,
        coordinator: ExtractionCoordinator,
        locator: ClipLocator,
    ) -> Self {
        Self {
            intake,
            probe_port,
            planner: ChunkPlanner::new(),
            chunk_policy,
            coordinator,
            locator,
        }
    }

    /// Run a request and fold the outcome into the single batch result
    pub async fn respond(&self, request: SplitRequest) -> BatchResult {
        let result = self.execute(request).await;
        if let Err(e) = &result {
            warn!(kind = e.kind(), error = %e, "Split request failed");
        }
        BatchResult::from(result)
    }

    /// Stage, probe, plan and extract; returns clip locations in chunk order
    pub async fn execute(&self, request: SplitRequest) -> SplitResult<Vec<String>> {
        info!(input = %request.input.display(), "Starting split request");

        let staged = self.intake.stage(&request.input).await?;
        let media = self.probe_port.probe_media(&staged).await?;
        let source = SourceMedia::from_media_info(&media)?;

        let chunk_seconds = self.chunk_policy.resolve(request.chunk_seconds.as_deref());
        let plan = self
            .planner
            .plan(source.total_duration_seconds(), chunk_seconds)?;
        info!(
            duration = source.total_duration_seconds(),
            chunk_seconds,
            chunks = plan.len(),
            "Planned split"
        );

        let batch = self.coordinator.extract(&source, &plan).await?;

        batch
            .outputs
            .iter()
            .map(|path| {
                self.locator.locate(path).ok_or_else(|| {
                    SplitError::transcode(0, format!("output {} has no file name", path.display()))
                })
            })
            .collect()
    }

    /// Probe a file without staging it
    pub async fn inspect(&self, input: &Path) -> SplitResult<MediaInfo> {
        self.probe_port.probe_media(input).await
    }

    /// Plan a file without staging or transcoding it
    pub async fn plan(&self, input: &Path, chunk_seconds: Option<&str>) -> SplitResult<ChunkPlan> {
        let media = self.probe_port.probe_media(input).await?;
        let source = SourceMedia::from_media_info(&media)?;
        self.planner.plan(
            source.total_duration_seconds(),
            self.chunk_policy.resolve(chunk_seconds),
        )
    }

    pub fn output_dir(&self) -> &Path {
        self.coordinator.namer().dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::output::ArtifactNamer;
    use crate::ports::{ExtractRequest, TranscodePort};
    use crate::retention::{RetentionPolicy, RetentionSweeper};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct FixedProbe(f64);

    #[async_trait]
    impl ProbePort for FixedProbe {
        async fn probe_media(&self, path: &Path) -> SplitResult<MediaInfo> {
            Ok(MediaInfo {
                path: path.to_path_buf(),
                duration_seconds: self.0,
                format_name: Some("mov,mp4".to_string()),
                size_bytes: None,
            })
        }
    }

    struct TouchingTranscoder;

    #[async_trait]
    impl TranscodePort for TouchingTranscoder {
        async fn extract_range(&self, request: &ExtractRequest) -> SplitResult<()> {
            tokio::fs::write(&request.output, b"clip").await?;
            Ok(())
        }
    }

    fn interactor(temp: &TempDir, duration: f64) -> SplitInteractor {
        let coordinator = ExtractionCoordinator::new(
            Arc::new(TouchingTranscoder),
            ArtifactNamer::new(temp.path().join("out")),
            RetentionSweeper::new(RetentionPolicy::Bounded { max_retained: 50 }),
            EngineConfig {
                max_concurrent_jobs: 2,
                ..EngineConfig::default()
            },
        );
        SplitInteractor::new(
            UploadIntake::new(temp.path().join("uploads"), 1024 * 1024),
            Arc::new(FixedProbe(duration)),
            ChunkLengthPolicy::default(),
            coordinator,
            ClipLocator::new("http://localhost:5000", "shorts"),
        )
    }

    fn upload(temp: &TempDir) -> PathBuf {
        let path = temp.path().join("talk.mp4");
        std::fs::write(&path, b"video bytes").unwrap();
        path
    }

    #[tokio::test]
    async fn test_execute_returns_urls_in_order() {
        let temp = TempDir::new().unwrap();
        let input = upload(&temp);

        let urls = interactor(&temp, 150.0)
            .execute(SplitRequest::new(&input))
            .await
            .unwrap();

        assert_eq!(urls.len(), 3);
        for (i, url) in urls.iter().enumerate() {
            assert!(url.starts_with(&format!("http://localhost:5000/shorts/short-{}-", i + 1)));
        }
        // Staged copy is consumed, the caller's file is not
        assert!(input.exists());
        assert_eq!(std::fs::read_dir(temp.path().join("uploads")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_chunk_override_is_clamped() {
        let temp = TempDir::new().unwrap();
        let input = upload(&temp);
        let interactor = interactor(&temp, 150.0);

        let plan = interactor.plan(&input, Some("30")).await.unwrap();
        assert_eq!(plan.len(), 5);

        let plan = interactor.plan(&input, Some("900")).await.unwrap();
        assert_eq!(plan.chunk_length_seconds(), 60);

        let plan = interactor.plan(&input, Some("abc")).await.unwrap();
        assert_eq!(plan.chunk_length_seconds(), 60);
    }

    #[tokio::test]
    async fn test_respond_reports_missing_upload() {
        let temp = TempDir::new().unwrap();
        let result = interactor(&temp, 10.0)
            .respond(SplitRequest::new(temp.path().join("nope.mp4")))
            .await;

        match result {
            BatchResult::Error(message) => assert!(message.contains("No file uploaded")),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_duration_is_probe_error() {
        let temp = TempDir::new().unwrap();
        let input = upload(&temp);

        let err = interactor(&temp, 0.0)
            .execute(SplitRequest::new(&input))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "probe");
        // Staged copy kept for inspection
        assert_eq!(std::fs::read_dir(temp.path().join("uploads")).unwrap().count(), 1);
    }
}
