//! Output file naming

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::domain::model::BatchId;

/// File name prefix shared by every generated short
pub const ARTIFACT_PREFIX: &str = "short-";
/// Container extension of generated shorts
pub const ARTIFACT_EXTENSION: &str = "mp4";

/// Names chunk outputs inside the artifact directory.
///
/// Names combine the chunk index, the batch id and a random suffix, so two
/// batches running at once never write or delete each other's files.
#[derive(Debug, Clone)]
pub struct ArtifactNamer {
    dir: PathBuf,
}

impl ArtifactNamer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(&self, batch: &BatchId, index: usize) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!(
            "{ARTIFACT_PREFIX}{index}-{batch}-{}.{ARTIFACT_EXTENSION}",
            &suffix[..8]
        )
    }

    pub fn path_for(&self, batch: &BatchId, index: usize) -> PathBuf {
        self.dir.join(self.file_name(batch, index))
    }

    /// Whether a directory entry was produced by this naming scheme
    pub fn is_artifact(path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        name.starts_with(ARTIFACT_PREFIX)
            && path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case(ARTIFACT_EXTENSION))
                .unwrap_or(false)
    }
}
