//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external tool traits,
//! so the processor can be exercised without network access, ffmpeg, or a
//! transcription service.
//!
//! # Example
//!
//! ```rust,ignore
//! use vidscribe_core::testing::{MockDownloader, MockMediaTool, MockTranscriber};
//!
//! let downloader = Arc::new(MockDownloader::new());
//! let media = Arc::new(MockMediaTool::new(30.0));
//! let transcriber = Arc::new(MockTranscriber::new("hello"));
//!
//! media.set_frame_failure_at(15.0).await;
//! ```

mod mock_downloader;
mod mock_media;
mod mock_transcriber;

pub use mock_downloader::MockDownloader;
pub use mock_media::MockMediaTool;
pub use mock_transcriber::MockTranscriber;
