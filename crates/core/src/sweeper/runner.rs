//! Retention sweeper implementation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::metrics;
use crate::task::{is_valid_id, TaskStore};

use super::config::RetentionConfig;
use super::types::SweepReport;

struct Shared {
    config: RetentionConfig,
    store: Arc<dyn TaskStore>,
    root_dir: PathBuf,
}

/// Deletes expired terminal tasks on a fixed timer.
pub struct RetentionSweeper {
    shared: Arc<Shared>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RetentionSweeper {
    /// Create a sweeper for task directories under `root_dir`.
    pub fn new(
        config: RetentionConfig,
        store: Arc<dyn TaskStore>,
        root_dir: impl Into<PathBuf>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            shared: Arc::new(Shared {
                config,
                store,
                root_dir: root_dir.into(),
            }),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            handle: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start the sweep loop in the background.
    ///
    /// The first sweep runs one interval after start.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Retention sweeper already running");
            return;
        }

        let shared = Arc::clone(&self.shared);
        let running = Arc::clone(&self.running);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let period = shared.config.sweep_interval();

        info!(
            retention_minutes = shared.config.retention_minutes,
            sweep_interval_minutes = shared.config.sweep_interval_minutes,
            "Starting retention sweeper"
        );

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Retention sweeper received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        shared.sweep().await;
                    }
                }
            }
        });

        *self.handle.lock().await = Some(handle);
    }

    /// Stop the loop and wait for an in-progress sweep to finish.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Retention sweeper not running");
            return;
        }

        info!("Stopping retention sweeper");
        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.handle.lock().await.take() {
            if let Err(e) = handle.await {
                error!(error = %e, "Retention sweeper task panicked");
            }
        }

        info!("Retention sweeper stopped");
    }

    /// Run a single sweep now.
    pub async fn sweep_once(&self) -> SweepReport {
        self.shared.sweep().await
    }
}

impl Shared {
    async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();

        let tasks = match self.store.list() {
            Ok(tasks) => tasks,
            Err(e) => {
                error!(error = %e, "Retention sweep could not list tasks");
                metrics::RETENTION_SWEEPS.with_label_values(&["partial"]).inc();
                report.errors += 1;
                return report;
            }
        };

        let now = Utc::now();
        let retention = self.config.retention();

        for task in tasks {
            report.examined += 1;

            if !task.status.is_terminal() || task.age(now) <= retention {
                continue;
            }
            if !is_valid_id(&task.id) {
                warn!(task_id = %task.id, "Skipping task with unusable id");
                continue;
            }

            let dir = self.root_dir.join(&task.id);
            let mut failed = false;

            let bytes = dir_size(&dir).await;
            match tokio::fs::remove_dir_all(&dir).await {
                Ok(()) => report.bytes_freed += bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(task_id = %task.id, "Task directory already gone");
                }
                Err(e) => {
                    failed = true;
                    warn!(task_id = %task.id, dir = %dir.display(), error = %e, "Failed to remove task directory");
                }
            }

            if let Err(e) = self.store.delete(&task.id) {
                failed = true;
                warn!(task_id = %task.id, error = %e, "Failed to remove task record");
            }

            if failed {
                report.errors += 1;
            } else {
                report.removed += 1;
                metrics::RETENTION_REMOVED.inc();
                info!(
                    task_id = %task.id,
                    status = %task.status,
                    age_minutes = task.age(now).num_minutes(),
                    bytes,
                    "Removed expired task"
                );
            }
        }

        let result = if report.errors == 0 { "ok" } else { "partial" };
        metrics::RETENTION_SWEEPS.with_label_values(&[result]).inc();

        info!(
            examined = report.examined,
            removed = report.removed,
            bytes_freed = report.bytes_freed,
            errors = report.errors,
            "Retention sweep finished"
        );

        report
    }
}

/// Total size of regular files under `dir`. Unreadable entries count as zero.
async fn dir_size(dir: &Path) -> u64 {
    let mut total = 0;
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            match entry.file_type().await {
                Ok(ft) if ft.is_dir() => pending.push(entry.path()),
                Ok(ft) if ft.is_file() => {
                    if let Ok(meta) = entry.metadata().await {
                        total += meta.len();
                    }
                }
                _ => {}
            }
        }
    }

    total
}
