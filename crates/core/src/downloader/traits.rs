use async_trait::async_trait;
use std::path::Path;

use super::error::DownloadError;

/// Fetches a remote resource to a local path.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Downloads `url` to `dest`, returning the number of bytes written.
    ///
    /// Every attempt rewrites `dest` from scratch.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError>;
}
