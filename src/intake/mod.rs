//! Upload intake
//!
//! Places an incoming file into the upload directory under a unique name. The
//! staged copy is what a batch consumes and deletes; the caller's original is
//! never touched.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::{SplitError, SplitResult};
use crate::retention::SweepReport;
use crate::utils::path::sanitize_file_name;
use crate::utils::Utils;

/// Stages uploads into a directory, enforcing a size limit
#[derive(Debug, Clone)]
pub struct UploadIntake {
    upload_dir: PathBuf,
    max_upload_bytes: u64,
}

impl UploadIntake {
    pub fn new(upload_dir: impl Into<PathBuf>, max_upload_bytes: u64) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_upload_bytes,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Copy `source` into the upload directory and return the staged path
    pub async fn stage(&self, source: &Path) -> SplitResult<PathBuf> {
        let metadata = match tokio::fs::metadata(source).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => {
                return Err(SplitError::validation(format!(
                    "{} is not a regular file",
                    source.display()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SplitError::validation(format!(
                    "No file uploaded: {} does not exist",
                    source.display()
                )))
            }
            Err(e) => return Err(SplitError::Io(e)),
        };

        let size = metadata.len();
        if size == 0 {
            return Err(SplitError::validation(format!(
                "{} is empty",
                source.display()
            )));
        }
        if size > self.max_upload_bytes {
            return Err(SplitError::validation(format!(
                "{} is {}, above the {} upload limit",
                source.display(),
                Utils::format_file_size(size),
                Utils::format_file_size(self.max_upload_bytes)
            )));
        }

        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let original = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let staged = self.upload_dir.join(staged_name(&original));

        tokio::fs::copy(source, &staged).await?;
        info!(
            source = %source.display(),
            staged = %staged.display(),
            size = %Utils::format_file_size(size),
            "Upload staged"
        );
        Ok(staged)
    }
}

impl UploadIntake {
    /// Remove staged uploads last modified more than `max_age` ago.
    ///
    /// Failed batches leave their staged copy behind; this is what reclaims
    /// it. Only names produced by [`UploadIntake::stage`] are considered.
    pub async fn sweep_stale(&self, max_age: Duration) -> SweepReport {
        let dir = self.upload_dir.clone();
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let listing = tokio::task::spawn_blocking(move || stale_uploads(&dir, cutoff)).await;
        let (stale, fresh) = match listing {
            Ok(found) => found,
            Err(e) => {
                warn!(dir = %self.upload_dir.display(), error = %e, "Upload listing aborted");
                return SweepReport::default();
            }
        };

        let mut report = SweepReport {
            retained: fresh,
            ..SweepReport::default()
        };
        for path in stale {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    debug!(path = %path.display(), "Removed stale upload");
                    report.deleted.push(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => report.deleted.push(path),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove stale upload");
                    report.failed.push(path);
                }
            }
        }
        report.retained += report.failed.len();

        if !report.deleted.is_empty() {
            info!(
                dir = %self.upload_dir.display(),
                deleted = report.deleted.len(),
                "Stale uploads removed"
            );
        }
        report
    }
}

/// Staged uploads in `dir` split into those older than `cutoff` (oldest
/// first) and a count of the rest
fn stale_uploads(dir: &Path, cutoff: SystemTime) -> (Vec<PathBuf>, usize) {
    if !dir.is_dir() {
        return (Vec::new(), 0);
    }

    let mut stale = Vec::new();
    let mut fresh = 0;
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).into_iter().flatten() {
        if !entry.file_type().is_file() || !is_staged_name(&entry.file_name().to_string_lossy()) {
            continue;
        }
        let modified = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if modified < cutoff {
            stale.push((modified, entry.into_path()));
        } else {
            fresh += 1;
        }
    }

    stale.sort();
    (stale.into_iter().map(|(_, path)| path).collect(), fresh)
}

/// Whether `name` has the `<millis>-<6 hex>-<name>` shape of a staged upload
fn is_staged_name(name: &str) -> bool {
    let mut parts = name.splitn(3, '-');
    let (Some(millis), Some(random), Some(rest)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && random.len() == 6
        && random.bytes().all(|b| b.is_ascii_hexdigit())
        && !rest.is_empty()
}

/// `<millis>-<random>-<sanitised original name>`
fn staged_name(original: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        &random[..6],
        sanitize_file_name(original)
    )
}
