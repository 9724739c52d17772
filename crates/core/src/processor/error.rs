use thiserror::Error;

use crate::downloader::DownloadError;
use crate::media::MediaError;
use crate::transcriber::TranscriptionError;

/// Outcome of a failed request or pipeline stage.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to prepare task directory: {0}")]
    Workspace(#[source] std::io::Error),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("Transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("Failed to write transcript: {0}")]
    TranscriptWrite(#[source] std::io::Error),
}

impl ProcessError {
    /// Stage label used in logs.
    pub fn stage(&self) -> &'static str {
        match self {
            ProcessError::InvalidRequest(_) => "validate",
            ProcessError::Workspace(_) => "workspace",
            ProcessError::Download(_) => "download",
            ProcessError::Media(MediaError::FrameExtractFailed { .. }) => "frames",
            ProcessError::Media(_) => "media",
            ProcessError::Transcription(_) | ProcessError::TranscriptWrite(_) => "transcribe",
        }
    }
}
