//! Configuration for the splitter
//!
//! Values come from defaults, an optional TOML file (`[shortsplit]` table) and
//! `SHORTSPLIT_*` environment variables. CLI overrides are applied on top in
//! `config_initialization`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::EngineConfig;
use crate::error::{SplitError, SplitResult};
use crate::planner::ChunkLengthPolicy;
use crate::retention::{RetentionMode, RetentionPolicy};
use crate::utils::path::has_parent_components;

/// Splitter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitterConfig {
    /// Chunk length used when a request gives none (or an invalid one)
    pub chunk_seconds: u32,
    /// Requested chunk lengths above this are clamped
    pub max_chunk_seconds: u32,
    /// Where uploads are staged
    pub upload_dir: PathBuf,
    /// Flat directory receiving the shorts
    pub output_dir: PathBuf,
    /// Scheme and host clips are served from
    pub base_url: String,
    /// URL path segment mapped onto `output_dir`
    pub public_path: String,
    pub retention: RetentionMode,
    /// Bound for `retention = "bounded"`
    pub max_retained: usize,
    pub max_upload_bytes: u64,
    /// Staged uploads older than this are removed by `sweep`; 0 keeps them
    pub stale_upload_seconds: u64,
    pub max_concurrent_jobs: usize,
    /// 0 disables the per-job timeout
    pub job_timeout_seconds: u64,
    pub remove_failed_outputs: bool,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub log_level: String,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_seconds: 60,
            max_chunk_seconds: 60,
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("shorts"),
            base_url: "http://localhost:5000".to_string(),
            public_path: "shorts".to_string(),
            retention: RetentionMode::Bounded,
            max_retained: 50,
            max_upload_bytes: 2 * 1024 * 1024 * 1024,
            stale_upload_seconds: 24 * 60 * 60,
            max_concurrent_jobs: num_cpus::get().max(1),
            job_timeout_seconds: 600,
            remove_failed_outputs: true,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    shortsplit: Option<SplitterConfig>,
}

impl FromStr for RetentionMode {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bounded" => Ok(RetentionMode::Bounded),
            "clear" | "clear_before_batch" => Ok(RetentionMode::ClearBeforeBatch),
            "keep" | "keep_all" | "none" => Ok(RetentionMode::KeepAll),
            other => Err(SplitError::config(format!(
                "Unknown retention mode '{}'. Valid modes: bounded, clear_before_batch, keep_all",
                other
            ))),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> SplitResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| SplitError::config(format!("{}={:?}: {}", name, value, e)))
}

fn parse_bool(name: &str, value: &str) -> SplitResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SplitError::config(format!("{}={:?}: expected a boolean", name, value))),
    }
}

impl SplitterConfig {
    /// Parse a TOML document; a missing `[shortsplit]` table yields defaults
    pub fn from_toml_str(content: &str) -> SplitResult<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| SplitError::config(format!("Failed to parse TOML config: {}", e)))?;
        Ok(file.shortsplit.unwrap_or_default())
    }

    pub fn from_file(path: &Path) -> SplitResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SplitError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply environment overrides read through `lookup`; returns how many
    /// variables were applied
    pub fn apply_env<F>(&mut self, lookup: F) -> SplitResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        let mut take = |name: &str| {
            let value = lookup(name);
            if value.is_some() {
                applied += 1;
            }
            value
        };

        // Bare CHUNK_SECONDS is kept for older deployments; like there, a value
        // that is not a positive integer leaves the default in place
        if let Some(v) = take("CHUNK_SECONDS") {
            match v.trim().parse::<u32>() {
                Ok(seconds) if seconds > 0 => self.chunk_seconds = seconds,
                _ => warn!(value = %v, default = self.chunk_seconds, "Ignoring invalid CHUNK_SECONDS"),
            }
        }
        if let Some(v) = take("SHORTSPLIT_CHUNK_SECONDS") {
            self.chunk_seconds = parse_var("SHORTSPLIT_CHUNK_SECONDS", &v)?;
        }
        if let Some(v) = take("SHORTSPLIT_MAX_CHUNK_SECONDS") {
            self.max_chunk_seconds = parse_var("SHORTSPLIT_MAX_CHUNK_SECONDS", &v)?;
        }
        if let Some(v) = take("SHORTSPLIT_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(v);
        }
        if let Some(v) = take("SHORTSPLIT_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = take("SHORTSPLIT_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = take("SHORTSPLIT_PUBLIC_PATH") {
            self.public_path = v;
        }
        if let Some(v) = take("SHORTSPLIT_RETENTION") {
            self.retention = v.parse()?;
        }
        if let Some(v) = take("SHORTSPLIT_MAX_RETAINED") {
            self.max_retained = parse_var("SHORTSPLIT_MAX_RETAINED", &v)?;
        }
        if let Some(v) = take("SHORTSPLIT_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse_var("SHORTSPLIT_MAX_UPLOAD_BYTES", &v)?;
        }
        if let Some(v) = take("SHORTSPLIT_STALE_UPLOAD_SECONDS") {
            self.stale_upload_seconds = parse_var("SHORTSPLIT_STALE_UPLOAD_SECONDS", &v)?;
        }
        if let Some(v) = take("SHORTSPLIT_MAX_CONCURRENT_JOBS") {
            self.max_concurrent_jobs = parse_var("SHORTSPLIT_MAX_CONCURRENT_JOBS", &v)?;
        }
        if let Some(v) = take("SHORTSPLIT_JOB_TIMEOUT_SECONDS") {
            self.job_timeout_seconds = parse_var("SHORTSPLIT_JOB_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = take("SHORTSPLIT_REMOVE_FAILED_OUTPUTS") {
            self.remove_failed_outputs = parse_bool("SHORTSPLIT_REMOVE_FAILED_OUTPUTS", &v)?;
        }
        if let Some(v) = take("SHORTSPLIT_FFMPEG_PATH") {
            self.ffmpeg_path = PathBuf::from(v);
        }
        if let Some(v) = take("SHORTSPLIT_FFPROBE_PATH") {
            self.ffprobe_path = PathBuf::from(v);
        }
        if let Some(v) = take("SHORTSPLIT_LOG_LEVEL") {
            self.log_level = v;
        }

        Ok(applied)
    }

    /// Reject settings no batch could run with
    pub fn validate(&self) -> SplitResult<()> {
        if self.chunk_seconds == 0 || self.max_chunk_seconds == 0 {
            return Err(SplitError::config("chunk lengths must be positive"));
        }
        if self.chunk_seconds > self.max_chunk_seconds {
            return Err(SplitError::config(format!(
                "default chunk length {}s exceeds the {}s bound",
                self.chunk_seconds, self.max_chunk_seconds
            )));
        }
        if self.max_concurrent_jobs == 0 {
            return Err(SplitError::config("max_concurrent_jobs must be at least 1"));
        }
        if self.max_upload_bytes == 0 {
            return Err(SplitError::config("max_upload_bytes must be positive"));
        }
        if self.retention == RetentionMode::Bounded && self.max_retained == 0 {
            return Err(SplitError::config(
                "max_retained must be at least 1 with bounded retention",
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(SplitError::config("base_url must not be empty"));
        }
        if has_parent_components(Path::new(&self.public_path)) {
            return Err(SplitError::config(format!(
                "public_path must not contain '..': {}",
                self.public_path
            )));
        }
        Ok(())
    }

    /// Age after which a staged upload is abandoned, if any
    pub fn stale_upload_age(&self) -> Option<Duration> {
        (self.stale_upload_seconds > 0).then(|| Duration::from_secs(self.stale_upload_seconds))
    }

    pub fn chunk_policy(&self) -> ChunkLengthPolicy {
        ChunkLengthPolicy::new(self.chunk_seconds, self.max_chunk_seconds)
    }

    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy::from_mode(self.retention, self.max_retained)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_concurrent_jobs: self.max_concurrent_jobs,
            job_timeout: (self.job_timeout_seconds > 0)
                .then(|| Duration::from_secs(self.job_timeout_seconds)),
            remove_failed_outputs: self.remove_failed_outputs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = SplitterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_seconds, 60);
        assert_eq!(config.retention_policy(), RetentionPolicy::Bounded { max_retained: 50 });
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SplitterConfig::from_toml_str(
            r#"
            [shortsplit]
            chunk_seconds = 45
            retention = "clear_before_batch"
            output_dir = "/srv/shorts"
            "#,
        )
        .unwrap();
        assert_eq!(config.chunk_seconds, 45);
        assert_eq!(config.max_chunk_seconds, 60);
        assert_eq!(config.retention, RetentionMode::ClearBeforeBatch);
        assert_eq!(config.output_dir, PathBuf::from("/srv/shorts"));
    }

    #[test]
    fn test_toml_without_table_is_default() {
        let config = SplitterConfig::from_toml_str("").unwrap();
        assert_eq!(config, SplitterConfig::default());
    }

    #[test]
    fn test_toml_unknown_key_is_rejected() {
        let err = SplitterConfig::from_toml_str("[shortsplit]\nchunk_secs = 10\n").unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SplitterConfig::default();
        let applied = config
            .apply_env(env(&[
                ("CHUNK_SECONDS", "50"),
                ("SHORTSPLIT_RETENTION", "keep_all"),
                ("SHORTSPLIT_JOB_TIMEOUT_SECONDS", "0"),
                ("SHORTSPLIT_REMOVE_FAILED_OUTPUTS", "no"),
            ]))
            .unwrap();
        assert_eq!(applied, 4);
        assert_eq!(config.chunk_seconds, 50);
        assert_eq!(config.retention_policy(), RetentionPolicy::KeepAll);
        assert_eq!(config.engine_config().job_timeout, None);
        assert!(!config.remove_failed_outputs);
    }

    #[test]
    fn test_prefixed_env_beats_bare_chunk_seconds() {
        let mut config = SplitterConfig::default();
        config
            .apply_env(env(&[("CHUNK_SECONDS", "50"), ("SHORTSPLIT_CHUNK_SECONDS", "30")]))
            .unwrap();
        assert_eq!(config.chunk_seconds, 30);
    }

    #[test]
    fn test_bare_chunk_seconds_falls_back_to_default() {
        for raw in ["abc", "0", "-5", ""] {
            let mut config = SplitterConfig::default();
            config.apply_env(env(&[("CHUNK_SECONDS", raw)])).unwrap();
            assert_eq!(config.chunk_seconds, 60, "CHUNK_SECONDS={raw:?}");
        }
    }

    #[test]
    fn test_bad_env_value_names_variable() {
        let mut config = SplitterConfig::default();
        let err = config
            .apply_env(env(&[("SHORTSPLIT_MAX_RETAINED", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("SHORTSPLIT_MAX_RETAINED"));
    }

    #[test]
    fn test_validate_rejects_inconsistent_bounds() {
        let config = SplitterConfig {
            chunk_seconds: 90,
            ..SplitterConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SplitterConfig {
            max_retained: 0,
            ..SplitterConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SplitterConfig {
            max_retained: 0,
            retention: RetentionMode::KeepAll,
            ..SplitterConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_climbing_public_path() {
        let config = SplitterConfig {
            public_path: "../private".to_string(),
            ..SplitterConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().kind(), "config");
    }

    #[test]
    fn test_retention_mode_parse() {
        assert_eq!("clear".parse::<RetentionMode>().unwrap(), RetentionMode::ClearBeforeBatch);
        assert_eq!("BOUNDED".parse::<RetentionMode>().unwrap(), RetentionMode::Bounded);
        assert!("sometimes".parse::<RetentionMode>().is_err());
    }
}
