//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with mock tools injected, so requests run the real processor and task
//! store without network access or ffmpeg.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use vidscribe_core::{
    create_authenticator,
    testing::{MockDownloader, MockMediaTool, MockTranscriber},
    AuthConfig, AuthMethod, Authenticator, Config, JsonTaskStore, ProcessorConfig,
    StorageConfig, VideoProcessor,
};

pub const PUBLIC_BASE_URL: &str = "http://testserver/files";
pub const API_KEY: &str = "test-api-key";

/// Test fixture with a router over mock tools.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_process() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/process-video", json!({
///         "url": "http://example.com/v.mp4"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    pub downloader: Arc<MockDownloader>,
    pub media: Arc<MockMediaTool>,
    pub transcriber: Arc<MockTranscriber>,
    pub store: Arc<JsonTaskStore>,
    /// Holds the storage root and records directory
    pub temp_dir: TempDir,
    /// Key sent with every request when auth is enabled
    api_key: Option<String>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Fixture with authentication disabled.
    pub async fn new() -> Self {
        Self::build(AuthConfig {
            method: AuthMethod::None,
            api_key: None,
        })
    }

    /// Fixture requiring `API_KEY`; requests carry it unless cleared.
    pub async fn with_api_key() -> Self {
        Self::build(AuthConfig {
            method: AuthMethod::ApiKey,
            api_key: Some(API_KEY.to_string()),
        })
    }

    fn build(auth: AuthConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root_dir = temp_dir.path().join("temp");
        let records_dir = temp_dir.path().join("task_records");

        let mut config: Config = vidscribe_core::load_config_from_str("[auth]\nmethod = \"none\"")
            .expect("Failed to build config");
        config.auth = auth;
        config.storage = StorageConfig {
            root_dir: root_dir.clone(),
            records_dir: records_dir.clone(),
        };
        config.processor = ProcessorConfig::default()
            .with_max_concurrent(2)
            .with_public_base_url(PUBLIC_BASE_URL);

        let downloader = Arc::new(MockDownloader::new());
        let media = Arc::new(MockMediaTool::new(30.0));
        let transcriber = Arc::new(MockTranscriber::new("hello from the mock"));
        let store = Arc::new(JsonTaskStore::open(&records_dir).expect("Failed to open store"));

        let processor = VideoProcessor::new(
            config.processor.clone(),
            &root_dir,
            downloader.clone(),
            media.clone(),
            transcriber.clone(),
            store.clone(),
        );

        let authenticator: Arc<dyn Authenticator> =
            Arc::from(create_authenticator(&config.auth).expect("Failed to create authenticator"));
        let api_key = config.auth.api_key.clone();

        let state = Arc::new(vidscribe_server::state::AppState::new(
            config,
            authenticator,
            processor,
        ));
        let router = vidscribe_server::api::create_router(state);

        Self {
            router,
            downloader,
            media,
            transcriber,
            store,
            temp_dir,
            api_key,
        }
    }

    /// Stop sending the API key.
    pub fn without_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    pub fn root_dir(&self) -> PathBuf {
        self.temp_dir.path().join("temp")
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a GET request and return the raw body.
    pub async fn get_raw(&self, path: &str) -> (StatusCode, Vec<u8>) {
        let request = self
            .builder("GET", path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, bytes.to_vec())
    }

    fn builder(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        }
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = self.builder(method, path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
