//! Types for the retention sweeper.

use serde::{Deserialize, Serialize};

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Tasks looked at.
    pub examined: usize,
    /// Tasks whose directory and record were removed.
    pub removed: usize,
    /// Bytes of task directories deleted.
    pub bytes_freed: u64,
    /// Deletions that failed and will be retried next sweep.
    pub errors: usize,
}
