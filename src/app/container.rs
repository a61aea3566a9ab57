use std::sync::Arc;

use crate::adapters::{FFmpegAdapter, FFprobeAdapter};
use crate::app::split_interactor::SplitInteractor;
use crate::config::SplitterConfig;
use crate::engine::ExtractionCoordinator;
use crate::intake::UploadIntake;
use crate::output::{ArtifactNamer, ClipLocator};
use crate::ports::{ProbePort, TranscodePort};
use crate::retention::RetentionSweeper;

pub trait AppContainer: Send + Sync {
    fn split_interactor(&self) -> Arc<SplitInteractor>;
}

pub struct DefaultAppContainer {
    split_interactor: Arc<SplitInteractor>,
}

impl DefaultAppContainer {
    /// Wire the ffprobe/ffmpeg adapters named in the configuration
    pub fn new(config: &SplitterConfig) -> Self {
        let probe_port = Arc::new(FFprobeAdapter::new(&config.ffprobe_path));
        let transcode_port = Arc::new(FFmpegAdapter::new(&config.ffmpeg_path));

        Self::with_ports(
            config,
            probe_port as Arc<dyn ProbePort>,
            transcode_port as Arc<dyn TranscodePort>,
        )
    }

    /// Wire the interactor around caller-supplied ports
    pub fn with_ports(
        config: &SplitterConfig,
        probe_port: Arc<dyn ProbePort>,
        transcode_port: Arc<dyn TranscodePort>,
    ) -> Self {
        let coordinator = ExtractionCoordinator::new(
            transcode_port,
            ArtifactNamer::new(&config.output_dir),
            RetentionSweeper::new(config.retention_policy()),
            config.engine_config(),
        );

        let split_interactor = Arc::new(SplitInteractor::new(
            UploadIntake::new(&config.upload_dir, config.max_upload_bytes),
            probe_port,
            config.chunk_policy(),
            coordinator,
            ClipLocator::new(config.base_url.clone(), config.public_path.clone()),
        ));

        Self { split_interactor }
    }
}

impl AppContainer for DefaultAppContainer {
    fn split_interactor(&self) -> Arc<SplitInteractor> {
        Arc::clone(&self.split_interactor)
    }
}
