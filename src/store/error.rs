use crate::domain::{format_elapsed, EntryId, TaskId, DEFAULT_TIME_FORMAT};
use crate::persistence::PersistenceError;
use chrono::{DateTime, Local};
use thiserror::Error;

/// Rejected input, detected before persistence is touched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Task name cannot be empty.")]
    EmptyName,

    #[error("The duration provided must end after it starts.")]
    EmptyInterval,

    #[error("The duration provided ends in the future.")]
    EndsInFuture,

    #[error("The duration provided intersects with the active timer.")]
    OverlapsActive { entry: EntryId, task: TaskId },

    #[error(
        "The duration provided intersects with the {} timer starting at {}.",
        elapsed_label(.elapsed),
        .start.format(DEFAULT_TIME_FORMAT)
    )]
    Overlaps {
        entry: EntryId,
        start: DateTime<Local>,
        elapsed: i64,
    },
}

fn elapsed_label(secs: &i64) -> String {
    format_elapsed(*secs)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No task at index {0}")]
    NoSuchTask(usize),

    #[error("Task {task} has no time entry at index {entry}")]
    NoSuchEntry { task: usize, entry: usize },

    #[error("An active task detail cannot be deleted.")]
    ActiveEntry,
}

impl StoreError {
    /// Dialog title for this failure
    pub fn title(&self) -> &'static str {
        match self {
            StoreError::Validation(ValidationError::EmptyName) => "Invalid task name",
            StoreError::Validation(_) => "Cannot add time to task",
            StoreError::Persistence(_) => "Could not save changes",
            _ => "Error",
        }
    }
}
