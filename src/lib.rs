//! Shortsplit Library
//!
//! Cuts a video into consecutive fixed-length shorts, one ffmpeg job per
//! chunk, and reports where each short can be retrieved.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod intake;
pub mod output;
pub mod planner;
pub mod ports;
pub mod retention;
pub mod utils;

// Re-export commonly used types
pub use domain::model::{BatchResult, ChunkPlan, ChunkSpec, MediaInfo, SourceMedia};
pub use error::{SplitError, SplitResult};
