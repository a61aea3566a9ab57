// Unit tests for domain models

use super::*;

#[test]
fn test_source_media_accepts_positive_duration() {
    let source = SourceMedia::new("uploads/clip.mp4", 61.5).unwrap();
    assert_eq!(source.total_duration_seconds(), 61.5);
    assert_eq!(source.path(), Path::new("uploads/clip.mp4"));
}

#[test]
fn test_source_media_rejects_bad_duration() {
    for duration in [0.0, -3.0, f64::NAN, f64::INFINITY] {
        let err = SourceMedia::new("a.mp4", duration).unwrap_err();
        assert_eq!(err.kind(), "probe");
    }
}

#[test]
fn test_chunk_spec_end() {
    let spec = ChunkSpec {
        index: 2,
        start_offset_seconds: 60.0,
        duration_seconds: 1.0,
    };
    assert_eq!(spec.end_seconds(), 61.0);
}

#[test]
fn test_job_status_transitions() {
    let spec = ChunkSpec {
        index: 1,
        start_offset_seconds: 0.0,
        duration_seconds: 60.0,
    };
    let mut job = ExtractionJob::new(spec, PathBuf::from("shorts/short-1.mp4"));
    assert_eq!(job.status(), JobStatus::Pending);

    // Cannot skip running
    assert!(!job.transition(JobStatus::Succeeded));
    assert!(job.transition(JobStatus::Running));
    assert!(job.transition(JobStatus::Failed));
    assert!(job.status().is_terminal());

    // Never revisited
    assert!(!job.transition(JobStatus::Running));
    assert!(!job.transition(JobStatus::Succeeded));
    assert_eq!(job.status(), JobStatus::Failed);
}

#[test]
fn test_batch_ids_are_distinct() {
    let a = BatchId::generate();
    let b = BatchId::generate();
    assert_ne!(a, b);
    assert!(a.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn test_batch_result_json_shape() {
    let ok = BatchResult::Clips(vec!["http://h/shorts/a.mp4".to_string()]);
    assert_eq!(
        serde_json::to_string(&ok).unwrap(),
        r#"{"clips":["http://h/shorts/a.mp4"]}"#
    );

    let failed = BatchResult::from(Err(SplitError::probe("not a video")));
    assert!(!failed.is_success());
    assert_eq!(
        serde_json::to_value(&failed).unwrap(),
        serde_json::json!({ "error": "Failed to probe media file: not a video" })
    );
}
