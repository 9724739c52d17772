//! Video processor: admission gate plus the fixed four-stage pipeline.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::downloader::Downloader;
use crate::media::MediaTool;
use crate::metrics;
use crate::task::{FrameParams, TaskRecord, TaskResult, TaskStore};
use crate::transcriber::Transcriber;

use super::config::ProcessorConfig;
use super::error::ProcessError;
use super::schedule::frame_timestamps;
use super::types::{ActiveTask, PipelineStage, ProcessOutcome, ProcessRequest, ProcessorStatus};
use super::workspace::{artifact_urls, TaskWorkspace};

const COMPLETED_MESSAGE: &str = "Processing completed";
const ABORTED_MESSAGE: &str = "Processing failed: pipeline aborted unexpectedly";

/// Tracks admission statistics.
#[derive(Default)]
struct PoolStats {
    active: AtomicU64,
    queued: AtomicU64,
    total_completed: AtomicU64,
    total_failed: AtomicU64,
}

/// State of an admitted task.
#[derive(Debug, Clone)]
struct TaskProgress {
    stage: PipelineStage,
    started_at: Instant,
}

struct Inner {
    config: ProcessorConfig,
    root_dir: PathBuf,
    downloader: Arc<dyn Downloader>,
    media: Arc<dyn MediaTool>,
    transcriber: Arc<dyn Transcriber>,
    store: Arc<dyn TaskStore>,
    admission: Semaphore,
    stats: PoolStats,
    active_tasks: RwLock<HashMap<String, TaskProgress>>,
}

/// Runs video processing requests under a global concurrency limit.
///
/// Cloning is cheap and shares the admission gate.
#[derive(Clone)]
pub struct VideoProcessor {
    inner: Arc<Inner>,
}

impl VideoProcessor {
    /// Creates a processor writing task directories under `root_dir`.
    pub fn new(
        config: ProcessorConfig,
        root_dir: impl Into<PathBuf>,
        downloader: Arc<dyn Downloader>,
        media: Arc<dyn MediaTool>,
        transcriber: Arc<dyn Transcriber>,
        store: Arc<dyn TaskStore>,
    ) -> Self {
        let admission = Semaphore::new(config.max_concurrent_tasks.max(1));
        Self {
            inner: Arc::new(Inner {
                config,
                root_dir: root_dir.into(),
                downloader,
                media,
                transcriber,
                store,
                admission,
                stats: PoolStats::default(),
                active_tasks: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The store this processor records tasks in.
    pub fn store(&self) -> Arc<dyn TaskStore> {
        Arc::clone(&self.inner.store)
    }

    /// Processes one request to completion.
    ///
    /// Waits for an admission slot, then runs download, audio extraction,
    /// frame extraction and transcription in order. Never returns an error:
    /// failures are reported through [`ProcessOutcome`]. The pipeline runs
    /// on its own tokio task, so dropping the returned future does not
    /// abandon a task halfway.
    pub async fn process(&self, request: ProcessRequest) -> ProcessOutcome {
        let inner = Arc::clone(&self.inner);
        let task_id = Uuid::new_v4().to_string();
        let spawned_id = task_id.clone();

        match tokio::spawn(async move { inner.process(spawned_id, request).await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(task_id = %task_id, error = %e, "Processing task aborted");
                // The admission guard has already marked the record failed.
                let recorded = matches!(self.inner.store.get(&task_id), Ok(Some(_)));
                ProcessOutcome::Failed {
                    task_id: recorded.then_some(task_id),
                    error: ABORTED_MESSAGE.to_string(),
                }
            }
        }
    }

    /// Returns the current processor status.
    pub async fn status(&self) -> ProcessorStatus {
        let inner = &self.inner;
        let tasks = inner
            .active_tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut active: Vec<ActiveTask> = tasks
            .iter()
            .map(|(task_id, progress)| ActiveTask {
                task_id: task_id.clone(),
                stage: progress.stage,
                elapsed_secs: progress.started_at.elapsed().as_secs(),
            })
            .collect();
        active.sort_by(|a, b| b.elapsed_secs.cmp(&a.elapsed_secs));

        ProcessorStatus {
            max_concurrent_tasks: inner.config.max_concurrent_tasks.max(1),
            running_tasks: inner.stats.active.load(Ordering::Relaxed) as usize,
            waiting_tasks: inner.stats.queued.load(Ordering::Relaxed) as usize,
            total_completed: inner.stats.total_completed.load(Ordering::Relaxed),
            total_failed: inner.stats.total_failed.load(Ordering::Relaxed),
            active,
        }
    }
}

impl Inner {
    async fn process(&self, task_id: String, request: ProcessRequest) -> ProcessOutcome {
        let params = match self.resolve(&request) {
            Ok(params) => params,
            Err(e) => {
                warn!(url = %request.url, error = %e, "Rejected processing request");
                metrics::TASKS_TOTAL.with_label_values(&["rejected"]).inc();
                return ProcessOutcome::Rejected {
                    error: e.to_string(),
                };
            }
        };

        // Admission gate
        self.stats.queued.fetch_add(1, Ordering::Relaxed);
        metrics::TASKS_WAITING.inc();
        let permit = self.admission.acquire().await;
        self.stats.queued.fetch_sub(1, Ordering::Relaxed);
        metrics::TASKS_WAITING.dec();

        let _permit = match permit {
            Ok(permit) => permit,
            Err(_) => {
                return ProcessOutcome::Rejected {
                    error: "Processor is shutting down".to_string(),
                }
            }
        };

        let mut admitted = AdmittedTask::enter(self, task_id);
        let outcome = self.run_task(&admitted.task_id, &request.url, params).await;
        admitted.finished = true;

        outcome
    }

    /// Fills in defaults and checks the request.
    fn resolve(&self, request: &ProcessRequest) -> Result<FrameParams, ProcessError> {
        let url = reqwest::Url::parse(request.url.trim())
            .map_err(|e| ProcessError::InvalidRequest(format!("invalid url: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProcessError::InvalidRequest(format!(
                "unsupported url scheme: {}",
                url.scheme()
            )));
        }

        let params = FrameParams {
            start_seconds: request
                .start_seconds
                .unwrap_or(self.config.default_start_seconds),
            interval_seconds: request
                .interval_seconds
                .unwrap_or(self.config.default_interval_seconds),
            max_frames: request.max_frames.unwrap_or(self.config.default_max_frames),
        };

        if params.start_seconds < 0 {
            return Err(ProcessError::InvalidRequest(
                "start_seconds must not be negative".to_string(),
            ));
        }
        if params.interval_seconds <= 0 {
            return Err(ProcessError::InvalidRequest(
                "interval_seconds must be positive".to_string(),
            ));
        }

        Ok(params)
    }

    async fn run_task(&self, task_id: &str, url: &str, params: FrameParams) -> ProcessOutcome {
        let start = Instant::now();
        let workspace = TaskWorkspace::new(&self.root_dir, task_id);

        if let Err(e) = workspace.create().await {
            let err = ProcessError::Workspace(e);
            error!(task_id, error = %err, "Failed to create task directory");
            self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
            metrics::TASKS_TOTAL.with_label_values(&["failed"]).inc();
            return ProcessOutcome::Failed {
                task_id: None,
                error: failure_message(&err),
            };
        }

        if let Err(e) = self.store.create(TaskRecord::new(task_id, url, params)) {
            warn!(task_id, error = %e, "Task record not persisted");
        }
        info!(task_id, url, ?params, "Task created");

        match self.run_stages(task_id, url, &params, &workspace).await {
            Ok(result) => {
                if let Err(e) = self.store.complete(task_id, COMPLETED_MESSAGE, result.clone()) {
                    warn!(task_id, error = %e, "Completion not persisted");
                }
                self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                metrics::TASKS_TOTAL.with_label_values(&["completed"]).inc();
                info!(
                    task_id,
                    frames = result.frames_urls.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Task completed"
                );
                ProcessOutcome::Completed {
                    task_id: task_id.to_string(),
                    result,
                }
            }
            Err(err) => {
                let message = failure_message(&err);
                error!(task_id, stage = err.stage(), error = %err, "Task failed");
                if let Err(e) = self.store.fail(task_id, &message) {
                    warn!(task_id, error = %e, "Failure not persisted");
                }
                self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
                metrics::TASKS_TOTAL.with_label_values(&["failed"]).inc();
                ProcessOutcome::Failed {
                    task_id: Some(task_id.to_string()),
                    error: message,
                }
            }
        }
    }

    /// Runs each stage to completion before starting the next.
    async fn run_stages(
        &self,
        task_id: &str,
        url: &str,
        params: &FrameParams,
        workspace: &TaskWorkspace,
    ) -> Result<TaskResult, ProcessError> {
        // 1. Download
        self.set_stage(task_id, PipelineStage::Downloading);
        let stage_start = Instant::now();
        let bytes = self.downloader.download(url, &workspace.video).await?;
        observe_stage("download", stage_start);
        info!(task_id, bytes, "Video downloaded");

        // 2. Audio
        let stage_start = Instant::now();
        self.media
            .extract_audio(&workspace.video, &workspace.audio)
            .await?;
        observe_stage("audio", stage_start);
        self.set_stage(task_id, PipelineStage::AudioExtracted);
        info!(task_id, "Audio extracted");

        // 3. Frames
        let stage_start = Instant::now();
        let duration = self.media.probe_duration(&workspace.video).await?;
        let timestamps = frame_timestamps(duration, params);
        for (index, timestamp) in timestamps.iter().enumerate() {
            self.media
                .extract_frame(&workspace.video, *timestamp, &workspace.frame_path(index + 1))
                .await?;
        }
        observe_stage("frames", stage_start);
        self.set_stage(task_id, PipelineStage::FramesExtracted);
        info!(task_id, duration, frames = timestamps.len(), "Frames extracted");

        // 4. Transcript
        let stage_start = Instant::now();
        let text = self.transcriber.transcribe(&workspace.audio).await?;
        tokio::fs::write(&workspace.transcript, text.as_bytes())
            .await
            .map_err(ProcessError::TranscriptWrite)?;
        observe_stage("transcribe", stage_start);
        self.set_stage(task_id, PipelineStage::Transcribed);
        info!(task_id, chars = text.chars().count(), "Audio transcribed");

        Ok(artifact_urls(
            &self.config.public_base_url,
            task_id,
            timestamps.len(),
        ))
    }

    fn set_stage(&self, task_id: &str, stage: PipelineStage) {
        let mut tasks = self
            .active_tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(progress) = tasks.get_mut(task_id) {
            progress.stage = stage;
        }
    }
}

/// Bookkeeping for a task holding an admission slot.
///
/// Dropping it releases the slot's counters and the active-task entry. If
/// the pipeline unwinds before finishing, the record is marked failed so it
/// does not stay `processing` forever.
struct AdmittedTask<'a> {
    inner: &'a Inner,
    task_id: String,
    finished: bool,
}

impl<'a> AdmittedTask<'a> {
    fn enter(inner: &'a Inner, task_id: String) -> Self {
        inner.stats.active.fetch_add(1, Ordering::Relaxed);
        metrics::TASKS_IN_FLIGHT.inc();
        inner
            .active_tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                task_id.clone(),
                TaskProgress {
                    stage: PipelineStage::Admitted,
                    started_at: Instant::now(),
                },
            );

        Self {
            inner,
            task_id,
            finished: false,
        }
    }
}

impl Drop for AdmittedTask<'_> {
    fn drop(&mut self) {
        let inner = self.inner;

        if !self.finished {
            error!(task_id = %self.task_id, "Pipeline aborted before finishing");
            if let Err(e) = inner.store.fail(&self.task_id, ABORTED_MESSAGE) {
                warn!(task_id = %self.task_id, error = %e, "Failure not persisted");
            }
            inner.stats.total_failed.fetch_add(1, Ordering::Relaxed);
            metrics::TASKS_TOTAL.with_label_values(&["failed"]).inc();
        }

        inner
            .active_tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.task_id);
        inner.stats.active.fetch_sub(1, Ordering::Relaxed);
        metrics::TASKS_IN_FLIGHT.dec();
    }
}

fn failure_message(err: &ProcessError) -> String {
    format!("Processing failed: {}", err)
}

fn observe_stage(stage: &str, started: Instant) {
    metrics::STAGE_DURATION
        .with_label_values(&[stage])
        .observe(started.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{JsonTaskStore, TaskStatus};
    use crate::testing::{MockDownloader, MockMediaTool, MockTranscriber};
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        root: PathBuf,
        downloader: Arc<MockDownloader>,
        media: Arc<MockMediaTool>,
        transcriber: Arc<MockTranscriber>,
        store: Arc<JsonTaskStore>,
        processor: VideoProcessor,
    }

    fn harness(max_concurrent: usize) -> Harness {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("temp");
        let downloader = Arc::new(MockDownloader::new());
        let media = Arc::new(MockMediaTool::new(30.0));
        let transcriber = Arc::new(MockTranscriber::new("hello world"));
        let store = Arc::new(JsonTaskStore::open(dir.path().join("records")).unwrap());
        let processor = VideoProcessor::new(
            ProcessorConfig::default()
                .with_max_concurrent(max_concurrent)
                .with_public_base_url("http://host/files"),
            &root,
            downloader.clone(),
            media.clone(),
            transcriber.clone(),
            store.clone(),
        );
        Harness {
            _dir: dir,
            root,
            downloader,
            media,
            transcriber,
            store,
            processor,
        }
    }

    #[tokio::test]
    async fn test_rejects_invalid_url() {
        let h = harness(1);
        let outcome = h.processor.process(ProcessRequest::new("not a url")).await;
        assert!(matches!(outcome, ProcessOutcome::Rejected { .. }));
        assert!(h.store.list().unwrap().is_empty());
        assert_eq!(h.downloader.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_rejects_bad_frame_params() {
        let h = harness(1);
        let outcome = h
            .processor
            .process(ProcessRequest::new("http://example.com/v.mp4").with_frames(0, 0, 3))
            .await;
        assert!(matches!(outcome, ProcessOutcome::Rejected { .. }));

        let outcome = h
            .processor
            .process(ProcessRequest::new("http://example.com/v.mp4").with_frames(-1, 5, 3))
            .await;
        assert!(matches!(outcome, ProcessOutcome::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_success_writes_artifacts() {
        let h = harness(1);
        let outcome = h
            .processor
            .process(ProcessRequest::new("http://example.com/v.mp4").with_frames(10, 5, 3))
            .await;

        let task_id = outcome.task_id().unwrap().to_string();
        let result = outcome.result().unwrap();
        assert_eq!(result.frames_urls.len(), 3);
        assert_eq!(
            result.transcript_url,
            format!("http://host/files/{}/transcript.txt", task_id)
        );

        let dir = h.root.join(&task_id);
        assert_eq!(
            std::fs::read_to_string(dir.join("transcript.txt")).unwrap(),
            "hello world"
        );
        for n in 1..=3 {
            assert!(dir.join(format!("frames/frame_{}.jpg", n)).exists());
        }
        assert_eq!(h.media.frame_timestamps().await, vec![10.0, 15.0, 20.0]);

        let record = h.store.get(&task_id).unwrap().unwrap();
        assert_eq!(record.status, TaskStatus::Completed);
        assert_eq!(record.message, "Processing completed");
        assert_eq!(record.result.as_ref(), Some(result));
    }

    /// Transcriber that panics mid-pipeline.
    struct PanickingTranscriber;

    #[async_trait::async_trait]
    impl Transcriber for PanickingTranscriber {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn transcribe(
            &self,
            _audio_path: &std::path::Path,
        ) -> Result<String, crate::transcriber::TranscriptionError> {
            panic!("transcriber blew up");
        }
    }

    #[tokio::test]
    async fn test_panicking_stage_fails_record_and_releases_slot() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JsonTaskStore::open(dir.path().join("records")).unwrap());
        let processor = VideoProcessor::new(
            ProcessorConfig::default().with_max_concurrent(1),
            dir.path().join("temp"),
            Arc::new(MockDownloader::new()),
            Arc::new(MockMediaTool::new(30.0)),
            Arc::new(PanickingTranscriber),
            store.clone(),
        );

        let outcome = processor
            .process(ProcessRequest::new("http://example.com/v.mp4").with_frames(0, 10, 1))
            .await;

        let ProcessOutcome::Failed { task_id, error } = &outcome else {
            panic!("expected failure, got {:?}", outcome);
        };
        assert_eq!(error, ABORTED_MESSAGE);
        let record = store.get(task_id.as_deref().unwrap()).unwrap().unwrap();
        assert_eq!(record.status, TaskStatus::Failed);
        assert_eq!(record.message, ABORTED_MESSAGE);

        let status = processor.status().await;
        assert_eq!(status.running_tasks, 0);
        assert!(status.active.is_empty());
        assert_eq!(status.total_failed, 1);

        // The single slot is free again.
        let next = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            processor.process(ProcessRequest::new("http://example.com/w.mp4").with_frames(0, 10, 1)),
        )
        .await
        .unwrap();
        assert!(next.task_id().is_some());
        assert_eq!(processor.status().await.total_failed, 2);
    }

    #[tokio::test]
    async fn test_transcription_failure_marks_task_failed() {
        let h = harness(1);
        h.transcriber.fail_with("service unavailable").await;

        let outcome = h
            .processor
            .process(ProcessRequest::new("http://example.com/v.mp4").with_frames(0, 10, 2))
            .await;

        let error = outcome.error().unwrap();
        assert!(error.starts_with("Processing failed: Transcription failed"));

        let record = h.store.get(outcome.task_id().unwrap()).unwrap().unwrap();
        assert_eq!(record.status, TaskStatus::Failed);
        assert_eq!(record.message, error);
        assert!(record.result.is_none());

        let status = h.processor.status().await;
        assert_eq!(status.total_failed, 1);
        assert_eq!(status.running_tasks, 0);
    }
}
