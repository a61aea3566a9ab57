//! Chunk planning module
//!
//! Turns a source duration and a chunk length into the ordered list of ranges
//! the engine extracts.

use tracing::debug;

use crate::domain::model::{ChunkPlan, ChunkSpec};
use crate::error::{SplitError, SplitResult};

pub mod policy;

pub use policy::ChunkLengthPolicy;

/// Shortest range that still reaches ffmpeg as a non-zero microsecond count
pub const MIN_CHUNK_SECONDS: f64 = 0.000_000_6;

/// Fixed-length chunk planner
#[derive(Debug, Default, Clone, Copy)]
pub struct ChunkPlanner;

impl ChunkPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Cover `[0, total_duration_seconds)` with `ceil(total / chunk)` ranges.
    ///
    /// Every range is `chunk_length_seconds` long except the last, which is
    /// clamped to the remainder. An exact multiple never produces an empty
    /// trailing range, and a remainder shorter than [`MIN_CHUNK_SECONDS`] is
    /// dropped.
    pub fn plan(
        &self,
        total_duration_seconds: f64,
        chunk_length_seconds: u32,
    ) -> SplitResult<ChunkPlan> {
        if chunk_length_seconds == 0 {
            return Err(SplitError::validation(
                "chunk length must be a positive number of seconds",
            ));
        }
        if !total_duration_seconds.is_finite() || total_duration_seconds <= 0.0 {
            return Err(SplitError::validation(format!(
                "total duration must be positive, got {}",
                total_duration_seconds
            )));
        }

        let chunk = f64::from(chunk_length_seconds);
        let mut count = (total_duration_seconds / chunk).ceil() as usize;
        // The quotient can round down onto an integer and drop a sliver
        if count as f64 * chunk < total_duration_seconds {
            count += 1;
        }

        let specs: Vec<ChunkSpec> = (0..count)
            .map(|i| {
                let start = i as f64 * chunk;
                ChunkSpec {
                    index: i + 1,
                    start_offset_seconds: start,
                    duration_seconds: chunk.min(total_duration_seconds - start),
                }
            })
            .filter(|spec| spec.duration_seconds >= MIN_CHUNK_SECONDS)
            .collect();

        if specs.is_empty() {
            return Err(SplitError::validation(format!(
                "total duration {}s is too short to extract",
                total_duration_seconds
            )));
        }

        debug!(
            total = total_duration_seconds,
            chunk = chunk_length_seconds,
            chunks = specs.len(),
            "Planned chunks"
        );

        Ok(ChunkPlan::from_specs(
            chunk_length_seconds,
            total_duration_seconds,
            specs,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(total: f64, chunk: u32) -> Vec<(f64, f64)> {
        ChunkPlanner::new()
            .plan(total, chunk)
            .unwrap()
            .iter()
            .map(|s| (s.start_offset_seconds, s.duration_seconds))
            .collect()
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_chunk() {
        assert_eq!(ranges(120.0, 60), vec![(0.0, 60.0), (60.0, 60.0)]);
    }

    #[test]
    fn test_short_final_chunk() {
        assert_eq!(ranges(61.0, 60), vec![(0.0, 60.0), (60.0, 1.0)]);
    }

    #[test]
    fn test_source_shorter_than_chunk() {
        assert_eq!(ranges(12.5, 60), vec![(0.0, 12.5)]);
    }

    #[test]
    fn test_indices_are_one_based_and_ordered() {
        let plan = ChunkPlanner::new().plan(150.0, 45).unwrap();
        let indices: Vec<usize> = plan.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert_eq!(plan.chunk_length_seconds(), 45);
        assert_eq!(plan.total_duration_seconds(), 150.0);
    }

    #[test]
    fn test_zero_chunk_length_is_rejected() {
        let err = ChunkPlanner::new().plan(100.0, 0).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_non_positive_duration_is_rejected() {
        for total in [0.0, -1.0, f64::NAN] {
            let err = ChunkPlanner::new().plan(total, 60).unwrap_err();
            assert_eq!(err.kind(), "validation");
        }
    }

    #[test]
    fn test_sub_microsecond_tail_is_dropped() {
        let plan = ranges(60.000_000_3, 60);
        assert_eq!(plan, vec![(0.0, 60.0)]);
    }

    #[test]
    fn test_microsecond_tail_is_kept() {
        let plan = ranges(60.0004, 60);
        assert_eq!(plan.len(), 2);
        assert!(plan[1].1 >= MIN_CHUNK_SECONDS);
    }

    #[test]
    fn test_vanishing_duration_is_rejected() {
        let err = ChunkPlanner::new().plan(0.000_000_1, 60).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_plan_is_deterministic() {
        let planner = ChunkPlanner::new();
        assert_eq!(
            planner.plan(3599.97, 45).unwrap(),
            planner.plan(3599.97, 45).unwrap()
        );
    }

    #[test]
    fn test_cover_properties_across_inputs() {
        let planner = ChunkPlanner::new();
        let totals = [0.01, 0.5, 1.0, 44.999, 45.0, 59.5, 60.0, 61.0, 119.99, 120.0, 3600.0, 7321.37];
        for &total in &totals {
            for chunk in [1u32, 7, 45, 59, 60] {
                let plan = planner.plan(total, chunk).unwrap();
                let expected = (total / f64::from(chunk)).ceil() as usize;
                assert_eq!(plan.len(), expected, "count for {total}/{chunk}");

                let mut cursor = 0.0;
                let mut sum = 0.0;
                for (i, spec) in plan.iter().enumerate() {
                    assert!(spec.duration_seconds > 0.0);
                    assert_eq!(spec.start_offset_seconds, cursor, "gap at {i}");
                    if i + 1 < plan.len() {
                        assert_eq!(spec.duration_seconds, f64::from(chunk));
                    }
                    cursor = spec.end_seconds();
                    sum += spec.duration_seconds;
                }
                assert_eq!(sum, total, "sum for {total}/{chunk}");
            }
        }
    }
}
