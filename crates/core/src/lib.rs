pub mod auth;
pub mod config;
pub mod downloader;
pub mod media;
pub mod metrics;
pub mod processor;
pub mod sweeper;
pub mod task;
pub mod testing;
pub mod transcriber;

pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, Authenticator, Credentials, Identity,
    NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, Config,
    ConfigError, SanitizedConfig, ServerConfig, StorageConfig,
};
pub use downloader::{DownloadError, Downloader, DownloaderConfig, HttpDownloader, RetryConfig};
pub use media::{FfmpegMediaTool, MediaConfig, MediaError, MediaTool};
pub use processor::{
    ActiveTask, PipelineStage, ProcessError, ProcessOutcome, ProcessRequest, ProcessorConfig,
    ProcessorStatus, VideoProcessor,
};
pub use sweeper::{RetentionConfig, RetentionSweeper, SweepReport};
pub use task::{
    FrameParams, JsonTaskStore, TaskError, TaskRecord, TaskResult, TaskStatus, TaskStore,
};
pub use transcriber::{OpenAiTranscriber, TranscriberConfig, Transcriber, TranscriptionError};
