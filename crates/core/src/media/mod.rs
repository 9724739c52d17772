//! Media tool adapter.
//!
//! Wraps an external media binary (ffmpeg/ffprobe) behind the [`MediaTool`]
//! trait. Three operations are exposed:
//!
//! - probe the duration of a container
//! - extract a mono 16 kHz MP3 audio track
//! - extract a single still frame at a timestamp
//!
//! # Example
//!
//! ```ignore
//! use vidscribe_core::media::{FfmpegMediaTool, MediaConfig, MediaTool};
//!
//! let tool = FfmpegMediaTool::new(MediaConfig::default());
//! let duration = tool.probe_duration(Path::new("video.mp4")).await?;
//! tool.extract_audio(Path::new("video.mp4"), Path::new("audio.mp3")).await?;
//! tool.extract_frame(Path::new("video.mp4"), 10.0, Path::new("frame_1.jpg")).await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;

pub use config::MediaConfig;
pub use error::MediaError;
pub use ffmpeg::FfmpegMediaTool;
pub use traits::MediaTool;
