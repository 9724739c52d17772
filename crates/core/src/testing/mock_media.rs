//! Mock media tool for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::media::{MediaError, MediaTool};

/// Mock implementation of the MediaTool trait.
///
/// Reports a fixed duration and writes placeholder files instead of
/// running ffmpeg. Each operation can be made to fail.
#[derive(Debug)]
pub struct MockMediaTool {
    duration_secs: Arc<RwLock<f64>>,
    /// Timestamps passed to `extract_frame`, in call order.
    frames: Arc<RwLock<Vec<f64>>>,
    /// Audio outputs written.
    audio_outputs: Arc<RwLock<Vec<PathBuf>>>,
    fail_probe: Arc<RwLock<Option<String>>>,
    fail_audio: Arc<RwLock<Option<String>>>,
    /// Frame extraction fails at this timestamp.
    fail_frame_at: Arc<RwLock<Option<f64>>>,
}

impl MockMediaTool {
    /// Create a mock reporting `duration_secs` for every probe.
    pub fn new(duration_secs: f64) -> Self {
        Self {
            duration_secs: Arc::new(RwLock::new(duration_secs)),
            frames: Arc::new(RwLock::new(Vec::new())),
            audio_outputs: Arc::new(RwLock::new(Vec::new())),
            fail_probe: Arc::new(RwLock::new(None)),
            fail_audio: Arc::new(RwLock::new(None)),
            fail_frame_at: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_duration(&self, duration_secs: f64) {
        *self.duration_secs.write().await = duration_secs;
    }

    /// Make every probe fail with `reason`.
    pub async fn set_probe_failure(&self, reason: impl Into<String>) {
        *self.fail_probe.write().await = Some(reason.into());
    }

    /// Make every audio extraction fail with `reason`.
    pub async fn set_audio_failure(&self, reason: impl Into<String>) {
        *self.fail_audio.write().await = Some(reason.into());
    }

    /// Make frame extraction fail at `timestamp`.
    pub async fn set_frame_failure_at(&self, timestamp: f64) {
        *self.fail_frame_at.write().await = Some(timestamp);
    }

    /// Timestamps requested so far.
    pub async fn frame_timestamps(&self) -> Vec<f64> {
        self.frames.read().await.clone()
    }

    /// Number of audio extractions performed.
    pub async fn audio_count(&self) -> usize {
        self.audio_outputs.read().await.len()
    }
}

#[async_trait]
impl MediaTool for MockMediaTool {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64, MediaError> {
        if let Some(reason) = self.fail_probe.read().await.clone() {
            return Err(MediaError::probe_failed(reason));
        }
        if !path.exists() {
            return Err(MediaError::probe_failed(format!(
                "Input file not found: {}",
                path.display()
            )));
        }
        Ok(*self.duration_secs.read().await)
    }

    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<(), MediaError> {
        if let Some(reason) = self.fail_audio.read().await.clone() {
            return Err(MediaError::transcode_failed(reason, None));
        }
        if !video_path.exists() {
            return Err(MediaError::transcode_failed("input missing", None));
        }
        tokio::fs::write(audio_path, b"mock-mp3").await?;
        self.audio_outputs
            .write()
            .await
            .push(audio_path.to_path_buf());
        Ok(())
    }

    async fn extract_frame(
        &self,
        _video_path: &Path,
        timestamp: f64,
        output_path: &Path,
    ) -> Result<(), MediaError> {
        self.frames.write().await.push(timestamp);

        if *self.fail_frame_at.read().await == Some(timestamp) {
            return Err(MediaError::frame_failed(timestamp, "mock failure"));
        }

        tokio::fs::write(output_path, b"mock-jpeg")
            .await
            .map_err(|e| MediaError::frame_failed(timestamp, e.to_string()))
    }
}
