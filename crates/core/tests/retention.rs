//! Retention sweeper integration tests.
//!
//! Tasks are produced by a real `VideoProcessor` run, then aged by rewriting
//! their `created_at` before sweeping.

use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use vidscribe_core::{
    testing::{MockDownloader, MockMediaTool, MockTranscriber},
    JsonTaskStore, ProcessRequest, ProcessorConfig, RetentionConfig, RetentionSweeper,
    TaskRecord, TaskStatus, TaskStore, VideoProcessor,
};

struct TestHarness {
    store: Arc<JsonTaskStore>,
    processor: VideoProcessor,
    sweeper: RetentionSweeper,
    media: Arc<MockMediaTool>,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("temp");
        let store = Arc::new(JsonTaskStore::open(temp_dir.path().join("records")).unwrap());
        let media = Arc::new(MockMediaTool::new(20.0));

        let processor = VideoProcessor::new(
            ProcessorConfig::default(),
            &root,
            Arc::new(MockDownloader::new()),
            media.clone(),
            Arc::new(MockTranscriber::new("text")),
            store.clone(),
        );
        let sweeper = RetentionSweeper::new(RetentionConfig::default(), store.clone(), &root);

        Self {
            store,
            processor,
            sweeper,
            media,
            temp_dir,
        }
    }

    async fn run_task(&self) -> String {
        let outcome = self
            .processor
            .process(ProcessRequest::new("http://example.com/v.mp4").with_frames(0, 5, 2))
            .await;
        outcome.task_id().unwrap().to_string()
    }

    fn age(&self, task_id: &str, minutes: i64) {
        let mut record: TaskRecord = self.store.get(task_id).unwrap().unwrap();
        record.created_at = Utc::now() - chrono::Duration::minutes(minutes);
        self.store.create(record).unwrap();
    }

    fn task_dir_exists(&self, task_id: &str) -> bool {
        self.temp_dir.path().join("temp").join(task_id).exists()
    }
}

#[tokio::test]
async fn test_sweep_removes_expired_artifacts_and_records() {
    let h = TestHarness::new();
    let expired = h.run_task().await;
    let recent = h.run_task().await;
    h.age(&expired, 11);

    let report = h.sweeper.sweep_once().await;

    assert_eq!(report.examined, 2);
    assert_eq!(report.removed, 1);
    assert!(report.bytes_freed > 0);

    assert!(!h.task_dir_exists(&expired));
    assert!(h.store.get(&expired).unwrap().is_none());
    assert!(!h
        .temp_dir
        .path()
        .join(format!("records/{}.json", expired))
        .exists());

    assert!(h.task_dir_exists(&recent));
    assert_eq!(
        h.store.get(&recent).unwrap().unwrap().status,
        TaskStatus::Completed
    );
}

#[tokio::test]
async fn test_sweep_keeps_failed_task_inside_window() {
    let h = TestHarness::new();
    h.media.set_audio_failure("broken").await;
    let failed = h.run_task().await;
    h.age(&failed, 9);

    let report = h.sweeper.sweep_once().await;
    assert_eq!(report.removed, 0);
    assert!(h.task_dir_exists(&failed));

    h.age(&failed, 30);
    let report = h.sweeper.sweep_once().await;
    assert_eq!(report.removed, 1);
    assert!(!h.task_dir_exists(&failed));
}

#[tokio::test]
async fn test_sweep_ignores_processing_tasks() {
    let h = TestHarness::new();
    let mut record = TaskRecord::new(
        "in-flight",
        "http://example.com/v.mp4",
        vidscribe_core::FrameParams {
            start_seconds: 0,
            interval_seconds: 5,
            max_frames: 1,
        },
    );
    record.created_at = Utc::now() - chrono::Duration::days(2);
    h.store.create(record).unwrap();

    let report = h.sweeper.sweep_once().await;
    assert_eq!(report.removed, 0);
    assert!(h.store.get("in-flight").unwrap().is_some());
}

#[tokio::test]
async fn test_repeated_sweeps_are_idempotent() {
    let h = TestHarness::new();
    for _ in 0..3 {
        let id = h.run_task().await;
        h.age(&id, 60);
    }

    assert_eq!(h.sweeper.sweep_once().await.removed, 3);

    let second = h.sweeper.sweep_once().await;
    assert_eq!(second.removed, 0);
    assert_eq!(second.errors, 0);
}
