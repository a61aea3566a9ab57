//! Artifact naming and public addressing module

use std::path::Path;

pub mod naming;

pub use naming::ArtifactNamer;

/// Builds the retrieval location of an artifact: `<base>/<public_path>/<file>`
#[derive(Debug, Clone, PartialEq)]
pub struct ClipLocator {
    base_url: String,
    public_path: String,
}

impl ClipLocator {
    pub fn new(base_url: impl Into<String>, public_path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            public_path: public_path.into().trim_matches('/').to_string(),
        }
    }

    /// Location of the artifact at `path`, or None if the path has no file name
    pub fn locate(&self, path: &Path) -> Option<String> {
        let file_name = path.file_name()?.to_string_lossy();
        let mut url = self.base_url.clone();
        if !self.public_path.is_empty() {
            url.push('/');
            url.push_str(&self.public_path);
        }
        url.push('/');
        url.push_str(&file_name);
        Some(url)
    }
}
