//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;
use clap_num::number_range;

/// Accept 1..=256 concurrent jobs
pub fn parse_job_limit(s: &str) -> Result<usize, String> {
    number_range(s, 1, 256)
}

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Video file to split
    pub input: PathBuf,

    /// Chunk length in seconds (invalid values fall back to the default,
    /// values above the bound are clamped)
    #[arg(short, long, allow_hyphen_values = true)]
    pub chunk_seconds: Option<String>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Media file to inspect
    pub input: PathBuf,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Media file to plan
    pub input: PathBuf,

    /// Chunk length in seconds
    #[arg(short, long, allow_hyphen_values = true)]
    pub chunk_seconds: Option<String>,
}

/// Arguments for the sweep command
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Keep at most this many shorts, overriding the configured policy
    #[arg(long, conflicts_with = "clear")]
    pub max_retained: Option<usize>,

    /// Remove every short
    #[arg(long)]
    pub clear: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_limit_range() {
        assert_eq!(parse_job_limit("4"), Ok(4));
        assert!(parse_job_limit("0").is_err());
        assert!(parse_job_limit("1000").is_err());
        assert!(parse_job_limit("x").is_err());
    }
}
