//! Task records and their storage.

mod json_store;
mod store;
mod types;

pub use json_store::JsonTaskStore;
pub(crate) use json_store::is_valid_id;
pub use store::{TaskError, TaskStore};
pub use types::{FrameParams, TaskRecord, TaskResult, TaskStatus};
