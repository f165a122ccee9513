use super::task::TaskId;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Persistent identity of a time entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One contiguous interval of time logged against a task
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub id: EntryId,
    /// Owning task
    pub task_id: TaskId,
    pub start: DateTime<Local>,
    /// None while the timer is running
    pub end: Option<DateTime<Local>>,
    pub note: Option<String>,
}

impl TimeEntry {
    pub fn new(id: EntryId, task_id: TaskId, start: DateTime<Local>, end: Option<DateTime<Local>>) -> Self {
        Self {
            id,
            task_id,
            start,
            end,
            note: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.end.is_none()
    }

    /// Whole seconds between start and end (or `now` while running)
    pub fn elapsed_at(&self, now: DateTime<Local>) -> i64 {
        (self.end.unwrap_or(now) - self.start).num_seconds().max(0)
    }

    /// Whether `[start, end)` overlaps this entry. An open end runs indefinitely.
    pub fn intersects(&self, start: DateTime<Local>, end: Option<DateTime<Local>>) -> bool {
        let (earlier_end, later_start) = if self.start <= start {
            (self.end, start)
        } else {
            (end, self.start)
        };

        match earlier_end {
            Some(earlier_end) => earlier_end > later_start,
            None => true,
        }
    }
}
