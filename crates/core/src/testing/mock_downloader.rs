//! Mock downloader for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::downloader::{DownloadError, Downloader};

/// Mock implementation of the Downloader trait.
///
/// Provides controllable behavior for testing:
/// - Record requested URLs
/// - Simulate failure via a one-shot error
/// - Simulate slow downloads
/// - Report peak concurrency, for admission limit assertions
///
/// # Example
///
/// ```rust,ignore
/// use vidscribe_core::testing::MockDownloader;
///
/// let downloader = MockDownloader::new();
/// downloader.set_delay(Duration::from_millis(50)).await;
///
/// // ... run several tasks ...
///
/// assert_eq!(downloader.max_concurrent(), 2);
/// ```
#[derive(Debug)]
pub struct MockDownloader {
    /// Requested URLs in call order.
    requests: Arc<RwLock<Vec<String>>>,
    /// Bytes written to the destination.
    payload: Arc<RwLock<Vec<u8>>>,
    /// If set, the next download will fail with this error.
    next_error: Arc<RwLock<Option<DownloadError>>>,
    /// Simulated transfer time.
    delay: Arc<RwLock<Duration>>,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Default for MockDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDownloader {
    /// Create a new mock downloader.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            payload: Arc::new(RwLock::new(b"mock-video-bytes".to_vec())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// URLs requested so far.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Number of download calls.
    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Set the bytes written for every download.
    pub async fn set_payload(&self, payload: impl Into<Vec<u8>>) {
        *self.payload.write().await = payload.into();
    }

    /// Configure the next download to fail with the given error.
    pub async fn set_next_error(&self, error: DownloadError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated transfer time.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Highest number of downloads observed running at once.
    pub fn max_concurrent(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        self.requests.write().await.push(url.to_string());

        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let result = match self.next_error.write().await.take() {
            Some(err) => Err(err),
            None => {
                let payload = self.payload.read().await.clone();
                tokio::fs::write(dest, &payload)
                    .await
                    .map(|_| payload.len() as u64)
                    .map_err(DownloadError::from)
            }
        };

        self.current.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
