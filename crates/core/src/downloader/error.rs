//! Error types for the downloader.

use thiserror::Error;

/// Errors that can occur while fetching a source video.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Server answered with a non-success status.
    #[error("Download failed with HTTP status {status}")]
    Http { status: u16 },

    /// Connection, TLS or body stream failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A single attempt exceeded its wall-clock limit.
    #[error("Download attempt timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// All attempts failed.
    #[error("Download failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<DownloadError>,
    },
}

impl DownloadError {
    /// Whether another attempt could succeed.
    ///
    /// Client errors other than 408 and 429 are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status } => *status >= 500 || *status == 408 || *status == 429,
            Self::Transport(_) | Self::Timeout { .. } | Self::Io(_) => true,
            Self::Exhausted { .. } => false,
        }
    }
}

impl From<reqwest::Error> for DownloadError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
