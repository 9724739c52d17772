//! Mock transcriber for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transcriber::{Transcriber, TranscriptionError};

/// Mock implementation of the Transcriber trait.
#[derive(Debug)]
pub struct MockTranscriber {
    text: Arc<RwLock<String>>,
    /// Audio files submitted.
    calls: Arc<RwLock<Vec<PathBuf>>>,
    /// If set, every call fails with a 503 carrying this message.
    failure: Arc<RwLock<Option<String>>>,
}

impl MockTranscriber {
    /// Create a mock returning `text` for every call.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Arc::new(RwLock::new(text.into())),
            calls: Arc::new(RwLock::new(Vec::new())),
            failure: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_text(&self, text: impl Into<String>) {
        *self.text.write().await = text.into();
    }

    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        self.calls.write().await.push(audio_path.to_path_buf());

        if let Some(message) = self.failure.read().await.clone() {
            return Err(TranscriptionError::Api {
                status: 503,
                message,
            });
        }

        // Same contract as the real client: the audio must exist.
        tokio::fs::metadata(audio_path).await?;
        Ok(self.text.read().await.clone())
    }
}
