//! Error types for the media tool adapter.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from invoking the external media tool.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Tool binary not found.
    #[error("Media tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// Duration probe failed or produced unusable output.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// Audio extraction failed. Captured stderr is appended to the message.
    #[error("Audio extraction failed: {reason}{}", stderr_suffix(.stderr))]
    TranscodeFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// A single frame extraction failed.
    #[error("Frame extraction at {timestamp}s failed: {reason}")]
    FrameExtractFailed { timestamp: f64, reason: String },

    /// Subprocess exceeded its time budget.
    #[error("Media tool timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn stderr_suffix(stderr: &Option<String>) -> String {
    match stderr {
        Some(text) if !text.is_empty() => format!(": {}", text),
        _ => String::new(),
    }
}

impl MediaError {
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    pub fn transcode_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::TranscodeFailed {
            reason: reason.into(),
            stderr,
        }
    }

    pub fn frame_failed(timestamp: f64, reason: impl Into<String>) -> Self {
        Self::FrameExtractFailed {
            timestamp,
            reason: reason.into(),
        }
    }
}
