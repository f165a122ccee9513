pub mod files;
pub mod json_store;

pub use files::{
    atomic_write, database_file, ensure_dir, get_tally_dir, init_local_tally, log_file,
    settings_file,
};
pub use json_store::JsonStore;

use crate::domain::{EntryId, Task, TaskId, TimeEntry};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },

    #[error("Corrupt data file: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Unknown task: {0}")]
    UnknownTask(TaskId),

    #[error("Unknown time entry: {0}")]
    UnknownEntry(EntryId),
}

/// CRUD storage for tasks and their time entries.
///
/// Every call either fully succeeds or leaves the stored data untouched.
pub trait Persistence {
    /// All tasks, each with its entries ascending by start
    fn load_all_tasks(&self) -> Result<Vec<Task>, PersistenceError>;

    /// Allocate an id and a color for a new, empty task
    fn create_task(&mut self, name: &str) -> Result<Task, PersistenceError>;

    fn rename_task(&mut self, task: TaskId, name: &str) -> Result<(), PersistenceError>;

    /// Delete a task together with all of its entries
    fn delete_task(&mut self, task: TaskId) -> Result<(), PersistenceError>;

    fn create_entry(
        &mut self,
        task: TaskId,
        start: DateTime<Local>,
        end: Option<DateTime<Local>>,
    ) -> Result<TimeEntry, PersistenceError>;

    /// Set the end of a running entry
    fn close_entry(&mut self, entry: EntryId, end: DateTime<Local>) -> Result<(), PersistenceError>;

    fn delete_entry(&mut self, entry: EntryId) -> Result<(), PersistenceError>;

    fn set_note(&mut self, entry: EntryId, note: Option<&str>) -> Result<(), PersistenceError>;
}
