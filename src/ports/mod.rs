// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::model::MediaInfo;
use crate::error::SplitResult;

/// Port for media file inspection
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Read container metadata, failing with `SplitError::Probe` when the file
    /// is unreadable or not media
    async fn probe_media(&self, file_path: &Path) -> SplitResult<MediaInfo>;
}

/// Parameters of one range extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRequest {
    /// 1-based chunk index, used for error reporting
    pub index: usize,
    pub input: PathBuf,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub output: PathBuf,
}

/// Port for the external transcoding engine
#[async_trait]
pub trait TranscodePort: Send + Sync {
    /// Write `[start, start + duration)` of the input to the output file.
    ///
    /// Dropping the returned future must stop the underlying work.
    async fn extract_range(&self, request: &ExtractRequest) -> SplitResult<()>;
}
