//! Per-task directory layout.

use std::path::{Path, PathBuf};

use crate::task::TaskResult;

pub const VIDEO_FILE: &str = "video.mp4";
pub const AUDIO_FILE: &str = "audio.mp3";
pub const FRAMES_DIR: &str = "frames";
pub const TRANSCRIPT_FILE: &str = "transcript.txt";

/// Paths for one task under the storage root.
#[derive(Debug, Clone)]
pub struct TaskWorkspace {
    pub dir: PathBuf,
    pub video: PathBuf,
    pub audio: PathBuf,
    pub frames_dir: PathBuf,
    pub transcript: PathBuf,
}

impl TaskWorkspace {
    pub fn new(root_dir: &Path, task_id: &str) -> Self {
        let dir = root_dir.join(task_id);
        Self {
            video: dir.join(VIDEO_FILE),
            audio: dir.join(AUDIO_FILE),
            frames_dir: dir.join(FRAMES_DIR),
            transcript: dir.join(TRANSCRIPT_FILE),
            dir,
        }
    }

    /// Creates the task directory and its frames sub-directory.
    pub async fn create(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.frames_dir).await
    }

    /// Path of frame `n`, numbered from 1.
    pub fn frame_path(&self, n: usize) -> PathBuf {
        self.frames_dir.join(frame_file_name(n))
    }
}

fn frame_file_name(n: usize) -> String {
    format!("frame_{}.jpg", n)
}

/// Public URLs for a finished task.
pub fn artifact_urls(base_url: &str, task_id: &str, frame_count: usize) -> TaskResult {
    let base = base_url.trim_end_matches('/');
    TaskResult {
        transcript_url: format!("{}/{}/{}", base, task_id, TRANSCRIPT_FILE),
        frames_urls: (1..=frame_count)
            .map(|n| format!("{}/{}/{}/{}", base, task_id, FRAMES_DIR, frame_file_name(n)))
            .collect(),
    }
}
