//! Retention configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the retention sweeper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Minimum age of a terminal task before it is removed (minutes).
    #[serde(default = "default_retention_minutes")]
    pub retention_minutes: u64,

    /// Time between sweeps (minutes).
    #[serde(default = "default_sweep_interval_minutes")]
    pub sweep_interval_minutes: u64,
}

fn default_retention_minutes() -> u64 {
    10
}

fn default_sweep_interval_minutes() -> u64 {
    10
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            retention_minutes: default_retention_minutes(),
            sweep_interval_minutes: default_sweep_interval_minutes(),
        }
    }
}

impl RetentionConfig {
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.retention_minutes.min(i64::MAX as u64) as i64)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes.saturating_mul(60))
    }
}
