use std::time::Duration;

/// Error type for transcription calls.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("Failed to read audio file: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}
