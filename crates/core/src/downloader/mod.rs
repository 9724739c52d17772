//! Source video downloader.
//!
//! [`HttpDownloader`] streams the response body to disk chunk by chunk and
//! retries transport failures with exponential backoff.

mod config;
mod error;
mod http;
mod traits;

pub use config::{DownloaderConfig, RetryConfig};
pub use error::DownloadError;
pub use http::HttpDownloader;
pub use traits::Downloader;
