//! Video processing pipeline.
//!
//! [`VideoProcessor::process`] admits a request through a global semaphore,
//! then runs download, audio extraction, frame extraction and transcription
//! in order, recording each task in a [`TaskStore`](crate::task::TaskStore).

mod config;
mod error;
mod pipeline;
mod schedule;
mod types;
mod workspace;

pub use config::ProcessorConfig;
pub use error::ProcessError;
pub use pipeline::VideoProcessor;
pub use schedule::frame_timestamps;
pub use types::{ActiveTask, PipelineStage, ProcessOutcome, ProcessRequest, ProcessorStatus};
pub use workspace::{artifact_urls, TaskWorkspace};
