//! Types for the processor module.

use serde::{Deserialize, Serialize};

use crate::task::TaskResult;

/// A request to process one source video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub url: String,
    #[serde(default)]
    pub start_seconds: Option<i64>,
    #[serde(default)]
    pub interval_seconds: Option<i64>,
    #[serde(default)]
    pub max_frames: Option<i64>,
}

impl ProcessRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            start_seconds: None,
            interval_seconds: None,
            max_frames: None,
        }
    }

    pub fn with_frames(mut self, start_seconds: i64, interval_seconds: i64, max_frames: i64) -> Self {
        self.start_seconds = Some(start_seconds);
        self.interval_seconds = Some(interval_seconds);
        self.max_frames = Some(max_frames);
        self
    }
}

/// What `process` hands back to its caller. Exactly one of a result or an
/// error message is always present.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Pipeline finished; artifacts are available.
    Completed { task_id: String, result: TaskResult },
    /// A stage failed. `task_id` is absent if no task record was created.
    Failed {
        task_id: Option<String>,
        error: String,
    },
    /// The request was invalid and no task was started.
    Rejected { error: String },
}

impl ProcessOutcome {
    pub fn task_id(&self) -> Option<&str> {
        match self {
            ProcessOutcome::Completed { task_id, .. } => Some(task_id),
            ProcessOutcome::Failed { task_id, .. } => task_id.as_deref(),
            ProcessOutcome::Rejected { .. } => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ProcessOutcome::Completed { .. })
    }

    pub fn result(&self) -> Option<&TaskResult> {
        match self {
            ProcessOutcome::Completed { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ProcessOutcome::Completed { .. } => None,
            ProcessOutcome::Failed { error, .. } | ProcessOutcome::Rejected { error } => Some(error),
        }
    }
}

/// Internal progress of an admitted task. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    Admitted,
    Downloading,
    AudioExtracted,
    FramesExtracted,
    Transcribed,
}

/// A task currently holding an admission slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveTask {
    pub task_id: String,
    pub stage: PipelineStage,
    pub elapsed_secs: u64,
}

/// Snapshot of the processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorStatus {
    /// Configured admission limit.
    pub max_concurrent_tasks: usize,
    /// Tasks past the admission gate.
    pub running_tasks: usize,
    /// Requests suspended at the admission gate.
    pub waiting_tasks: usize,
    /// Tasks completed since startup.
    pub total_completed: u64,
    /// Tasks failed since startup.
    pub total_failed: u64,
    pub active: Vec<ActiveTask>,
}
