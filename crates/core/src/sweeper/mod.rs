//! Retention sweeper.
//!
//! Periodically removes terminal tasks older than the retention window:
//! the task directory under the storage root and its record in the
//! [`TaskStore`](crate::task::TaskStore). Tasks still processing are
//! never touched.

mod config;
mod runner;
mod types;

pub use config::RetentionConfig;
pub use runner::RetentionSweeper;
pub use types::SweepReport;
