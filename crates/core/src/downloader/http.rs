//! Streaming HTTP downloader with retry.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::path::Path;
use std::time::Instant;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::config::DownloaderConfig;
use super::error::DownloadError;
use super::traits::Downloader;
use crate::metrics;

pub struct HttpDownloader {
    client: Client,
    config: DownloaderConfig,
}

impl HttpDownloader {
    pub fn new(config: DownloaderConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs.clamp(1, 30)))
            .build()?;
        Ok(Self { client, config })
    }

    /// One attempt: request, check status, stream the body into a fresh file.
    async fn attempt(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Http {
                status: status.as_u16(),
            });
        }

        // Truncates whatever an earlier attempt left behind.
        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            file.write_all(&bytes).await?;
            written += bytes.len() as u64;
        }

        file.flush().await?;
        Ok(written)
    }

    async fn discard_partial(dest: &Path) {
        if let Err(e) = tokio::fs::remove_file(dest).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %dest.display(), error = %e, "Failed to remove partial download");
            }
        }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    fn name(&self) -> &str {
        "http"
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let max_attempts = self.config.retry.max_attempts.max(1);
        let per_attempt = Duration::from_secs(self.config.timeout_secs);
        let start = Instant::now();

        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(url, attempt, "Starting download attempt");

            let err = match timeout(per_attempt, self.attempt(url, dest)).await {
                Ok(Ok(bytes)) => {
                    metrics::DOWNLOAD_ATTEMPTS
                        .with_label_values(&["success"])
                        .inc();
                    info!(
                        url,
                        bytes,
                        attempt,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Download completed"
                    );
                    return Ok(bytes);
                }
                Ok(Err(e)) => e,
                Err(_) => DownloadError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                },
            };

            if !err.is_retryable() {
                metrics::DOWNLOAD_ATTEMPTS.with_label_values(&["fatal"]).inc();
                warn!(url, attempt, error = %err, "Download failed, not retrying");
                Self::discard_partial(dest).await;
                return Err(err);
            }

            metrics::DOWNLOAD_ATTEMPTS
                .with_label_values(&["retryable"])
                .inc();

            if attempt >= max_attempts {
                warn!(url, attempts = attempt, error = %err, "Download attempts exhausted");
                Self::discard_partial(dest).await;
                return Err(DownloadError::Exhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.config.retry.delay_for(attempt);
            warn!(
                url,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Download attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
