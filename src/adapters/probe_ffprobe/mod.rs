//! FFprobe adapter for media file probing
//!
//! Runs the external `ffprobe` binary and reads the container section of its
//! JSON report.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::model::MediaInfo;
use crate::error::{SplitError, SplitResult};
use crate::ports::ProbePort;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    binary: PathBuf,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter using the given executable
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeReport {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    format_name: Option<String>,
    size: Option<String>,
}

/// Turn `ffprobe -of json -show_entries format=...` output into media info
pub fn parse_probe_output(path: &Path, stdout: &[u8]) -> SplitResult<MediaInfo> {
    let report: ProbeReport = serde_json::from_slice(stdout).map_err(|e| {
        SplitError::probe(format!("{}: unreadable ffprobe report: {}", path.display(), e))
    })?;

    let format = report.format.ok_or_else(|| {
        SplitError::probe(format!("{}: not a media container", path.display()))
    })?;

    let duration_seconds = format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            SplitError::probe(format!("{}: no usable duration in container", path.display()))
        })?;

    Ok(MediaInfo {
        path: path.to_path_buf(),
        duration_seconds,
        format_name: format.format_name,
        size_bytes: format.size.and_then(|s| s.trim().parse().ok()),
    })
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_media(&self, file_path: &Path) -> SplitResult<MediaInfo> {
        debug!(path = %file_path.display(), "Probing media");

        let output = Command::new(&self.binary)
            .args(["-v", "error"])
            .args(["-show_entries", "format=duration,format_name,size"])
            .args(["-of", "json"])
            .arg(file_path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                SplitError::probe(format!(
                    "failed to run {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SplitError::probe(format!(
                "{}: {}",
                file_path.display(),
                stderr.trim()
            )));
        }

        parse_probe_output(file_path, &output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_report() {
        let stdout = br#"{
            "format": {
                "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
                "duration": "61.045000",
                "size": "1048576"
            }
        }"#;
        let info = parse_probe_output(Path::new("in.mp4"), stdout).unwrap();
        assert_eq!(info.duration_seconds, 61.045);
        assert_eq!(info.format_name.as_deref(), Some("mov,mp4,m4a,3gp,3g2,mj2"));
        assert_eq!(info.size_bytes, Some(1_048_576));
        assert_eq!(info.path, PathBuf::from("in.mp4"));
    }

    #[test]
    fn test_parse_rejects_missing_duration() {
        let stdout = br#"{"format": {"format_name": "image2"}}"#;
        let err = parse_probe_output(Path::new("x.png"), stdout).unwrap_err();
        assert_eq!(err.kind(), "probe");
    }

    #[test]
    fn test_parse_rejects_na_and_zero_duration() {
        for duration in ["N/A", "0.000000", "-1"] {
            let stdout = format!(r#"{{"format": {{"duration": "{duration}"}}}}"#);
            let err = parse_probe_output(Path::new("x"), stdout.as_bytes()).unwrap_err();
            assert_eq!(err.kind(), "probe");
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_probe_output(Path::new("x"), b"").is_err());
        assert!(parse_probe_output(Path::new("x"), b"{}").is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_is_probe_error() {
        let adapter = FFprobeAdapter::new("/nonexistent/ffprobe-binary");
        let err = adapter.probe_media(Path::new("in.mp4")).await.unwrap_err();
        assert_eq!(err.kind(), "probe");
    }
}
