//! Error handling module for Shortsplit

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for split operations
#[derive(Error, Debug)]
pub enum SplitError {
    /// Rejected input: bad chunk length, oversized or empty upload
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Source unreadable or not a media container
    #[error("Failed to probe media file: {message}")]
    Probe { message: String },

    /// A single extraction job exited non-zero, timed out or could not start
    #[error("Transcode of chunk {index} failed: {message}")]
    Transcode { index: usize, message: String },

    /// The output directory could not be created
    #[error("Cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SplitError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn probe(message: impl Into<String>) -> Self {
        Self::Probe {
            message: message.into(),
        }
    }

    pub fn transcode(index: usize, message: impl Into<String>) -> Self {
        Self::Transcode {
            index,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Stable machine-readable tag for the error class
    pub fn kind(&self) -> &'static str {
        match self {
            SplitError::Validation { .. } => "validation",
            SplitError::Probe { .. } => "probe",
            SplitError::Transcode { .. } => "transcode",
            SplitError::OutputDir { .. } => "output_dir",
            SplitError::Config { .. } => "config",
            SplitError::Io(_) => "io",
        }
    }
}

/// Result type alias for split operations
pub type SplitResult<T> = std::result::Result<T, SplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(SplitError::validation("x").kind(), "validation");
        assert_eq!(SplitError::probe("x").kind(), "probe");
        assert_eq!(SplitError::transcode(2, "x").kind(), "transcode");
        assert_eq!(SplitError::config("x").kind(), "config");
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(SplitError::from(io).kind(), "io");
    }

    #[test]
    fn test_transcode_message_names_chunk() {
        let err = SplitError::transcode(3, "ffmpeg exited with status 1");
        assert_eq!(
            err.to_string(),
            "Transcode of chunk 3 failed: ffmpeg exited with status 1"
        );
    }

    #[test]
    fn test_output_dir_message_names_path() {
        let err = SplitError::OutputDir {
            path: PathBuf::from("/nope/shorts"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/nope/shorts"));
        assert_eq!(err.kind(), "output_dir");
    }
}
