//! Video processing and task status handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use vidscribe_core::{
    Identity, ProcessOutcome, ProcessRequest, TaskRecord, TaskResult, TaskStatus, TaskStore,
};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Body of a successful `process-video` call.
#[derive(Debug, Serialize)]
pub struct ProcessSuccess {
    pub task_id: String,
    pub transcript_url: String,
    pub frames_urls: Vec<String>,
}

/// Body of a failed or rejected `process-video` call.
#[derive(Debug, Serialize)]
pub struct ProcessFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task_id: String,
    pub status: TaskStatus,
    pub message: String,
    pub created_at: String,
    pub result: Option<TaskResult>,
}

impl From<TaskRecord> for TaskResponse {
    fn from(record: TaskRecord) -> Self {
        Self {
            task_id: record.id,
            status: record.status,
            message: record.message,
            created_at: record.created_at.to_rfc3339(),
            result: record.result,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskNotFound {
    pub status: &'static str,
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Run the full pipeline for one video. Responds once the task is finished.
pub async fn process_video(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<ProcessRequest>,
) -> Response {
    info!(url = %request.url, requested_by = %identity.subject, "Process video request");

    match state.processor().process(request).await {
        ProcessOutcome::Completed { task_id, result } => (
            StatusCode::OK,
            Json(ProcessSuccess {
                task_id,
                transcript_url: result.transcript_url,
                frames_urls: result.frames_urls,
            }),
        )
            .into_response(),
        ProcessOutcome::Rejected { error } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ProcessFailure {
                task_id: None,
                error,
            }),
        )
            .into_response(),
        ProcessOutcome::Failed { task_id, error } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ProcessFailure { task_id, error }),
        )
            .into_response(),
    }
}

/// Look up a task by id, falling back to its record on disk.
pub async fn get_task(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.task_store().get(&id) {
        Ok(Some(record)) => Json(TaskResponse::from(record)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(TaskNotFound {
                status: "not_found",
                message: format!("Task {} not found", id),
            }),
        )
            .into_response(),
        Err(e) => {
            error!(task_id = %id, error = %e, "Failed to read task");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProcessFailure {
                    task_id: Some(id),
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
