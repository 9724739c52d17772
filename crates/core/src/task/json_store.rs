//! Task store backed by one JSON document per task.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::{TaskError, TaskRecord, TaskResult, TaskStatus, TaskStore};

/// In-memory task map mirrored to `{records_dir}/{task_id}.json`.
///
/// The file is rewritten in full on every mutation while the map lock is
/// held, so memory and disk never disagree about ordering for a task.
pub struct JsonTaskStore {
    records_dir: PathBuf,
    records: Mutex<HashMap<String, TaskRecord>>,
}

impl JsonTaskStore {
    /// Open the store, creating `records_dir` if needed and loading every
    /// record found there. Unreadable records are logged and skipped.
    pub fn open(records_dir: impl Into<PathBuf>) -> Result<Self, TaskError> {
        let records_dir = records_dir.into();
        std::fs::create_dir_all(&records_dir)
            .map_err(|e| TaskError::persistence("*", format!("{}: {}", records_dir.display(), e)))?;

        let mut records = HashMap::new();
        let mut skipped = 0usize;

        let entries = std::fs::read_dir(&records_dir)
            .map_err(|e| TaskError::persistence("*", format!("{}: {}", records_dir.display(), e)))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match read_record(&path) {
                Ok(record) if is_valid_id(&record.id) => {
                    records.insert(record.id.clone(), record);
                }
                Ok(record) => {
                    skipped += 1;
                    warn!(path = %path.display(), task_id = %record.id, "Skipping task record with invalid id");
                }
                Err(e) => {
                    skipped += 1;
                    warn!(path = %path.display(), error = %e, "Skipping unreadable task record");
                }
            }
        }

        info!(
            records_dir = %records_dir.display(),
            loaded = records.len(),
            skipped,
            "Task store opened"
        );

        Ok(Self {
            records_dir,
            records: Mutex::new(records),
        })
    }

    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, TaskRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.records_dir.join(format!("{}.json", id))
    }

    /// Serialize the full record and swap it into place.
    fn write_record(&self, record: &TaskRecord) -> Result<(), TaskError> {
        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| TaskError::persistence(&record.id, e))?;

        let path = self.record_path(&record.id);
        let tmp = self.records_dir.join(format!("{}.json.tmp", record.id));
        std::fs::write(&tmp, json).map_err(|e| TaskError::persistence(&record.id, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| TaskError::persistence(&record.id, e))?;

        debug!(task_id = %record.id, status = %record.status, "Task record persisted");
        Ok(())
    }

    /// Load a record that is on disk but not in memory.
    fn load_from_disk(&self, id: &str) -> Result<Option<TaskRecord>, TaskError> {
        let path = self.record_path(id);
        match read_record(&path) {
            Ok(record) => Ok(Some(record)),
            Err(ReadError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TaskError::persistence(id, e)),
        }
    }

    fn transition(
        &self,
        id: &str,
        to: TaskStatus,
        message: &str,
        result: Option<TaskResult>,
    ) -> Result<TaskRecord, TaskError> {
        if !is_valid_id(id) {
            return Err(TaskError::NotFound(id.to_string()));
        }

        let mut records = self.lock();

        if !records.contains_key(id) {
            if let Some(record) = self.load_from_disk(id)? {
                records.insert(id.to_string(), record);
            }
        }

        let record = records
            .get_mut(id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;

        if record.status.is_terminal() {
            return Err(TaskError::InvalidTransition {
                task_id: id.to_string(),
                current: record.status,
                requested: to,
            });
        }

        record.status = to;
        record.message = message.to_string();
        record.result = result;

        let snapshot = record.clone();
        self.write_record(&snapshot)?;
        Ok(snapshot)
    }
}

impl TaskStore for JsonTaskStore {
    fn create(&self, record: TaskRecord) -> Result<(), TaskError> {
        if !is_valid_id(&record.id) {
            return Err(TaskError::persistence(&record.id, "invalid task id"));
        }

        let mut records = self.lock();
        let snapshot = record.clone();
        records.insert(record.id.clone(), record);
        self.write_record(&snapshot)
    }

    fn get(&self, id: &str) -> Result<Option<TaskRecord>, TaskError> {
        if !is_valid_id(id) {
            return Ok(None);
        }

        let mut records = self.lock();
        if let Some(record) = records.get(id) {
            return Ok(Some(record.clone()));
        }

        let loaded = self.load_from_disk(id)?;
        if let Some(record) = &loaded {
            records.insert(id.to_string(), record.clone());
        }
        Ok(loaded)
    }

    fn list(&self) -> Result<Vec<TaskRecord>, TaskError> {
        let mut list: Vec<TaskRecord> = self.lock().values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(list)
    }

    fn complete(
        &self,
        id: &str,
        message: &str,
        result: TaskResult,
    ) -> Result<TaskRecord, TaskError> {
        self.transition(id, TaskStatus::Completed, message, Some(result))
    }

    fn fail(&self, id: &str, message: &str) -> Result<TaskRecord, TaskError> {
        self.transition(id, TaskStatus::Failed, message, None)
    }

    fn delete(&self, id: &str) -> Result<Option<TaskRecord>, TaskError> {
        if !is_valid_id(id) {
            return Ok(None);
        }

        let mut records = self.lock();
        let removed = records.remove(id);

        match std::fs::remove_file(self.record_path(id)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(TaskError::persistence(id, e)),
        }

        Ok(removed)
    }
}

/// Task ids double as file and directory names.
pub(crate) fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Debug)]
enum ReadError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::Io(e) => write!(f, "{}", e),
            ReadError::Json(e) => write!(f, "invalid record: {}", e),
        }
    }
}

fn read_record(path: &Path) -> Result<TaskRecord, ReadError> {
    let bytes = std::fs::read(path).map_err(ReadError::Io)?;
    serde_json::from_slice(&bytes).map_err(ReadError::Json)
}
