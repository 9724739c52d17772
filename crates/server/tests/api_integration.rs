//! HTTP API integration tests.
//!
//! Requests go through the full router (auth, metrics, static files) while
//! the processor runs against mock tools.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestFixture, API_KEY, PUBLIC_BASE_URL};
use vidscribe_core::TaskStore;

#[tokio::test]
async fn test_root_reports_running() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["message"], "Video processing service is running");
}

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/health").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_process_video_success() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/process-video",
            json!({
                "url": "http://example.com/talk.mp4",
                "start_seconds": 10,
                "interval_seconds": 5,
                "max_frames": 3
            }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    let task_id = response.body["task_id"].as_str().unwrap().to_string();
    assert_eq!(
        response.body["transcript_url"],
        format!("{}/{}/transcript.txt", PUBLIC_BASE_URL, task_id)
    );
    let frames = response.body["frames_urls"].as_array().unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(
        frames[2],
        format!("{}/{}/frames/frame_3.jpg", PUBLIC_BASE_URL, task_id)
    );
    assert!(response.body.get("error").is_none());

    assert_eq!(
        fixture.downloader.requests().await,
        vec!["http://example.com/talk.mp4".to_string()]
    );
    assert_eq!(fixture.media.frame_timestamps().await, vec![10.0, 15.0, 20.0]);
}

#[tokio::test]
async fn test_task_status_after_completion() {
    let fixture = TestFixture::new().await;

    let created = fixture
        .post("/api/process-video", json!({ "url": "http://example.com/v.mp4" }))
        .await;
    assert_status!(created, StatusCode::OK);
    let task_id = created.body["task_id"].as_str().unwrap();

    let response = fixture.get(&format!("/api/tasks/{}", task_id)).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["task_id"], task_id);
    assert_eq!(response.body["status"], "completed");
    assert_eq!(response.body["message"], "Processing completed");
    assert_eq!(
        response.body["result"]["transcript_url"],
        created.body["transcript_url"]
    );
    assert!(response.body["created_at"].as_str().is_some());
}

#[tokio::test]
async fn test_artifacts_served_under_files_route() {
    let fixture = TestFixture::new().await;

    let created = fixture
        .post(
            "/api/process-video",
            json!({ "url": "http://example.com/v.mp4", "start_seconds": 0, "interval_seconds": 10, "max_frames": 1 }),
        )
        .await;
    let task_id = created.body["task_id"].as_str().unwrap();

    let (status, body) = fixture
        .get_raw(&format!("/files/{}/transcript.txt", task_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"hello from the mock");

    let (status, _) = fixture
        .get_raw(&format!("/files/{}/frames/frame_1.jpg", task_id))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_url_is_unprocessable() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/process-video", json!({ "url": "not a url" }))
        .await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["error"].as_str().unwrap().contains("invalid url"));
    assert!(response.body.get("task_id").is_none());
    assert!(fixture.store.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_positive_interval_is_unprocessable() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/process-video",
            json!({ "url": "http://example.com/v.mp4", "interval_seconds": 0 }),
        )
        .await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(fixture.downloader.call_count().await, 0);
}

#[tokio::test]
async fn test_missing_url_is_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/process-video", json!({ "max_frames": 2 }))
        .await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_pipeline_failure_returns_error_object() {
    let fixture = TestFixture::new().await;
    fixture.transcriber.fail_with("model not loaded").await;

    let response = fixture
        .post("/api/process-video", json!({ "url": "http://example.com/v.mp4" }))
        .await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.body["error"].as_str().unwrap();
    assert!(error.starts_with("Processing failed:"));
    assert!(error.contains("model not loaded"));
    assert!(response.body.get("transcript_url").is_none());

    let task_id = response.body["task_id"].as_str().unwrap();
    let status = fixture.get(&format!("/api/tasks/{}", task_id)).await;
    assert_eq!(status.body["status"], "failed");
    assert_eq!(status.body["message"], error);
    assert!(status.body["result"].is_null());
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/tasks/does-not-exist").await;

    assert_status!(response, StatusCode::NOT_FOUND);
    assert_eq!(response.body["status"], "not_found");
    assert!(response.body["message"]
        .as_str()
        .unwrap()
        .contains("does-not-exist"));
}

#[tokio::test]
async fn test_api_key_required_for_api_routes() {
    let fixture = TestFixture::with_api_key().await.without_key();

    let response = fixture
        .post("/api/process-video", json!({ "url": "http://example.com/v.mp4" }))
        .await;
    assert_status!(response, StatusCode::UNAUTHORIZED);
    assert_eq!(fixture.downloader.call_count().await, 0);

    let response = fixture.get("/api/health").await;
    assert_status!(response, StatusCode::UNAUTHORIZED);

    // Outside /api
    let response = fixture.get("/").await;
    assert_status!(response, StatusCode::OK);
}

#[tokio::test]
async fn test_api_key_accepted() {
    let fixture = TestFixture::with_api_key().await;

    let response = fixture
        .post("/api/process-video", json!({ "url": "http://example.com/v.mp4" }))
        .await;

    assert_status!(response, StatusCode::OK);
}

#[tokio::test]
async fn test_config_hides_secrets() {
    let fixture = TestFixture::with_api_key().await;

    let response = fixture.get("/api/config").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["auth"]["method"], "api_key");
    assert_eq!(response.body["auth"]["api_key_configured"], true);
    assert_eq!(response.body["processor"]["max_concurrent_tasks"], 2);
    assert!(!response.body.to_string().contains(API_KEY));
}

#[tokio::test]
async fn test_processor_status() {
    let fixture = TestFixture::new().await;
    fixture
        .post("/api/process-video", json!({ "url": "http://example.com/v.mp4" }))
        .await;

    let response = fixture.get("/api/status").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["max_concurrent_tasks"], 2);
    assert_eq!(response.body["running_tasks"], 0);
    assert_eq!(response.body["total_completed"], 1);
}

#[tokio::test]
async fn test_metrics_exposed() {
    let fixture = TestFixture::new().await;
    fixture
        .post("/api/process-video", json!({ "url": "http://example.com/v.mp4" }))
        .await;

    let (status, body) = fixture.get_raw("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("vidscribe_tasks_total"));
    assert!(text.contains("vidscribe_http_requests_total"));
    assert!(text.contains("vidscribe_task_records"));
}
