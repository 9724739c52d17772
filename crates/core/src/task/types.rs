//! Task record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Externally visible task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Returns true if no further transitions are allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved frame extraction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameParams {
    /// Offset of the first frame in seconds.
    pub start_seconds: i64,
    /// Step between frames in seconds.
    pub interval_seconds: i64,
    /// Upper bound on frames. Zero or negative yields no frames.
    pub max_frames: i64,
}

/// Public artifact URLs produced by a successful task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub transcript_url: String,
    /// Ordered by frame number, starting at 1.
    pub frames_urls: Vec<String>,
}

/// One accepted processing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub status: TaskStatus,
    /// RFC 3339, set once at creation.
    pub created_at: DateTime<Utc>,
    pub source_url: String,
    pub frame_params: FrameParams,
    /// Latest human-readable status, overwritten on every transition.
    pub message: String,
    /// Present only once the task completed.
    #[serde(default)]
    pub result: Option<TaskResult>,
}

impl TaskRecord {
    /// A fresh record in the `processing` state.
    pub fn new(id: impl Into<String>, source_url: impl Into<String>, frame_params: FrameParams) -> Self {
        Self {
            id: id.into(),
            status: TaskStatus::Processing,
            created_at: Utc::now(),
            source_url: source_url.into(),
            frame_params,
            message: "Task created".to_string(),
            result: None,
        }
    }

    /// Age relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}
