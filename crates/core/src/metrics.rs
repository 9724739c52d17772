//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Video processor (admission, task outcomes, stage durations)
//! - Downloader (attempts by result)
//! - Retention sweeper (removals, sweep outcomes)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Processor Metrics
// =============================================================================

/// Finished tasks by result.
pub static TASKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidscribe_tasks_total", "Total tasks finished"),
        &["result"], // "completed", "failed", "rejected"
    )
    .unwrap()
});

/// Tasks currently holding an admission slot.
pub static TASKS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "vidscribe_tasks_in_flight",
        "Tasks currently running their pipeline",
    )
    .unwrap()
});

/// Requests suspended at the admission gate.
pub static TASKS_WAITING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "vidscribe_tasks_waiting",
        "Requests waiting for an admission slot",
    )
    .unwrap()
});

/// Stage duration in seconds.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vidscribe_stage_duration_seconds",
            "Duration of each pipeline stage",
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["stage"], // "download", "audio", "frames", "transcribe"
    )
    .unwrap()
});

// =============================================================================
// Downloader Metrics
// =============================================================================

/// Download attempts by result.
pub static DOWNLOAD_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidscribe_download_attempts_total", "Total download attempts"),
        &["result"], // "success", "retryable", "fatal"
    )
    .unwrap()
});

// =============================================================================
// Retention Metrics
// =============================================================================

/// Tasks deleted by the sweeper.
pub static RETENTION_REMOVED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "vidscribe_retention_removed_total",
        "Total expired tasks removed",
    )
    .unwrap()
});

/// Sweep cycles by result.
pub static RETENTION_SWEEPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidscribe_retention_sweeps_total", "Total retention sweeps"),
        &["result"], // "ok", "partial"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Processor
        Box::new(TASKS_TOTAL.clone()),
        Box::new(TASKS_IN_FLIGHT.clone()),
        Box::new(TASKS_WAITING.clone()),
        Box::new(STAGE_DURATION.clone()),
        // Downloader
        Box::new(DOWNLOAD_ATTEMPTS.clone()),
        // Retention
        Box::new(RETENTION_REMOVED.clone()),
        Box::new(RETENTION_SWEEPS.clone()),
    ]
}
