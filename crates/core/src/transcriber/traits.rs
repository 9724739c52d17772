use async_trait::async_trait;
use std::path::Path;

use super::error::TranscriptionError;

/// Turns an audio file into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Transcribes the audio at `audio_path` and returns the plain transcript.
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError>;
}
