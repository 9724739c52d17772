use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::downloader::DownloaderConfig;
use crate::media::MediaConfig;
use crate::processor::ProcessorConfig;
use crate::sweeper::RetentionConfig;
use crate::transcriber::TranscriberConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub downloader: DownloaderConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub transcriber: TranscriberConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Route under which task directories are served as static files.
    #[serde(default = "default_files_route")]
    pub files_route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            files_route: default_files_route(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8000
}

fn default_files_route() -> String {
    "/files".to_string()
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Required when `method = "api_key"`.
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Where task artifacts and task records live on disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// One working directory per task id is created under this path.
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    /// One `{task_id}.json` record per task is written here.
    #[serde(default = "default_records_dir")]
    pub records_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            records_dir: default_records_dir(),
        }
    }
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("./temp")
}

fn default_records_dir() -> PathBuf {
    PathBuf::from("./task_records")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub processor: ProcessorConfig,
    pub downloader: DownloaderConfig,
    pub media: MediaConfig,
    pub transcriber: SanitizedTranscriberConfig,
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: AuthMethod,
    pub api_key_configured: bool,
}

/// Transcriber config with the service credential hidden.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTranscriberConfig {
    pub api_base: String,
    pub model: String,
    pub timeout_secs: u64,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: config.auth.method,
                api_key_configured: config
                    .auth
                    .api_key
                    .as_deref()
                    .is_some_and(|k| !k.is_empty()),
            },
            server: config.server.clone(),
            storage: config.storage.clone(),
            processor: config.processor.clone(),
            downloader: config.downloader.clone(),
            media: config.media.clone(),
            transcriber: SanitizedTranscriberConfig {
                api_base: config.transcriber.api_base.clone(),
                model: config.transcriber.model.clone(),
                timeout_secs: config.transcriber.timeout_secs,
                api_key_configured: !config.transcriber.api_key.is_empty(),
            },
            retention: config.retention.clone(),
        }
    }
}
