//! Trait definitions for the media tool adapter.

use async_trait::async_trait;
use std::path::Path;

use super::error::MediaError;

/// An external tool that can inspect and cut media files.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Returns the total duration of the media in seconds.
    async fn probe_duration(&self, path: &Path) -> Result<f64, MediaError>;

    /// Writes a single-channel 16 kHz MP3 track to `audio_path`, replacing any existing file.
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<(), MediaError>;

    /// Writes exactly one still image taken at `timestamp` seconds.
    async fn extract_frame(
        &self,
        video_path: &Path,
        timestamp: f64,
        output_path: &Path,
    ) -> Result<(), MediaError>;
}
