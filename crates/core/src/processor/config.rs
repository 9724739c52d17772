//! Configuration for the processor module.

use serde::{Deserialize, Serialize};

/// Configuration for the video processing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Maximum tasks running their pipeline at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_tasks: usize,

    /// Public URL under which task directories are served.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Frame offset used when a request omits `start_seconds`.
    #[serde(default = "default_start_seconds")]
    pub default_start_seconds: i64,

    /// Frame step used when a request omits `interval_seconds`.
    #[serde(default = "default_interval_seconds")]
    pub default_interval_seconds: i64,

    /// Frame cap used when a request omits `max_frames`.
    #[serde(default = "default_max_frames")]
    pub default_max_frames: i64,
}

fn default_max_concurrent() -> usize {
    3
}

fn default_public_base_url() -> String {
    "http://localhost:8000/files".to_string()
}

fn default_start_seconds() -> i64 {
    300
}

fn default_interval_seconds() -> i64 {
    300
}

fn default_max_frames() -> i64 {
    8
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: default_max_concurrent(),
            public_base_url: default_public_base_url(),
            default_start_seconds: default_start_seconds(),
            default_interval_seconds: default_interval_seconds(),
            default_max_frames: default_max_frames(),
        }
    }
}

impl ProcessorConfig {
    /// Sets the admission limit.
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_tasks = max;
        self
    }

    /// Sets the public artifact base URL.
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into();
        self
    }
}
