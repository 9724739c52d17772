//! Task storage trait and errors.

use std::fmt;

use super::types::{TaskRecord, TaskResult, TaskStatus};

/// Error type for task store operations.
#[derive(Debug)]
pub enum TaskError {
    /// Task not found.
    NotFound(String),
    /// The task already reached a terminal state.
    InvalidTransition {
        task_id: String,
        current: TaskStatus,
        requested: TaskStatus,
    },
    /// Reading or writing a record file failed.
    Persistence { task_id: String, message: String },
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::NotFound(id) => write!(f, "Task not found: {}", id),
            TaskError::InvalidTransition {
                task_id,
                current,
                requested,
            } => write!(
                f,
                "Cannot move task {} to {}: current status is {}",
                task_id, requested, current
            ),
            TaskError::Persistence { task_id, message } => {
                write!(f, "Failed to persist task {}: {}", task_id, message)
            }
        }
    }
}

impl std::error::Error for TaskError {}

impl TaskError {
    pub fn persistence(task_id: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Persistence {
            task_id: task_id.into(),
            message: message.to_string(),
        }
    }
}

/// Trait for task storage backends.
///
/// Mutations always apply to the in-memory view. A `Persistence` error means
/// the change is visible in this process but may not survive a restart.
pub trait TaskStore: Send + Sync {
    /// Insert a new record and persist it.
    fn create(&self, record: TaskRecord) -> Result<(), TaskError>;

    /// Get a task by ID.
    fn get(&self, id: &str) -> Result<Option<TaskRecord>, TaskError>;

    /// All tasks currently known to this process.
    fn list(&self) -> Result<Vec<TaskRecord>, TaskError>;

    /// Move a processing task to `completed` with its result.
    fn complete(&self, id: &str, message: &str, result: TaskResult)
        -> Result<TaskRecord, TaskError>;

    /// Move a processing task to `failed`.
    fn fail(&self, id: &str, message: &str) -> Result<TaskRecord, TaskError>;

    /// Remove a task from memory and durable storage.
    /// Returns the removed record if it was known.
    fn delete(&self, id: &str) -> Result<Option<TaskRecord>, TaskError>;
}
