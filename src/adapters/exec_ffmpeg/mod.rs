//! FFmpeg execution adapter
//!
//! Each extraction is one `ffmpeg` child process. The child is killed if the
//! awaiting future is dropped, which is how the engine's per-job timeout stops
//! a stuck process.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{SplitError, SplitResult};
use crate::ports::{ExtractRequest, TranscodePort};
use crate::utils::time::format_seconds_arg;

/// Lines of ffmpeg stderr kept in an error message
const STDERR_TAIL_LINES: usize = 5;

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    binary: PathBuf,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter using the given executable
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Command line for one range: input seek, fixed duration, overwrite
    pub fn build_args(request: &ExtractRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-nostdin", "-y"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push("-ss".into());
        args.push(format_seconds_arg(request.start_seconds).into());
        args.push("-i".into());
        args.push(request.input.clone().into_os_string());
        args.push("-t".into());
        args.push(format_seconds_arg(request.duration_seconds).into());
        args.push(request.output.clone().into_os_string());
        args
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join(" | ")
}

#[async_trait]
impl TranscodePort for FFmpegAdapter {
    async fn extract_range(&self, request: &ExtractRequest) -> SplitResult<()> {
        debug!(
            index = request.index,
            start = request.start_seconds,
            duration = request.duration_seconds,
            output = %request.output.display(),
            "Spawning ffmpeg"
        );

        let output = Command::new(&self.binary)
            .args(Self::build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                SplitError::transcode(
                    request.index,
                    format!("failed to run {}: {}", self.binary.display(), e),
                )
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SplitError::transcode(
                request.index,
                format!("ffmpeg exited with {}: {}", output.status, stderr_tail(&output.stderr)),
            ))
        }
    }
}
