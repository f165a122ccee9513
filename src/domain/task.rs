use super::color::Color;
use super::entry::{EntryId, TimeEntry};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Persistent identity of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A named unit of time tracking
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Assigned once at creation
    pub color: Color,
    /// Ascending by start; only the last one may be running
    pub entries: Vec<TimeEntry>,
}

impl Task {
    pub fn new(id: TaskId, name: String, color: Color) -> Self {
        Self {
            id,
            name,
            color,
            entries: Vec::new(),
        }
    }

    /// Total elapsed seconds over all entries
    pub fn elapsed_at(&self, now: DateTime<Local>) -> i64 {
        self.entries.iter().map(|e| e.elapsed_at(now)).sum()
    }

    pub fn is_active(&self) -> bool {
        self.entries.last().map_or(false, TimeEntry::is_active)
    }

    /// The running entry, if any
    pub fn active_entry(&self) -> Option<&TimeEntry> {
        self.entries.last().filter(|e| e.is_active())
    }

    /// Elapsed seconds of the running entry, 0 when idle
    pub fn current_elapsed_at(&self, now: DateTime<Local>) -> i64 {
        self.active_entry().map_or(0, |e| e.elapsed_at(now))
    }

    pub fn entry_index(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Position that keeps entries ascending by start (after any equal starts)
    pub fn insertion_index(&self, start: DateTime<Local>) -> usize {
        self.entries.partition_point(|e| e.start <= start)
    }

    /// First entry of this task overlapping `[start, end)`
    pub fn find_overlap(&self, start: DateTime<Local>, end: DateTime<Local>) -> Option<&TimeEntry> {
        self.entries.iter().find(|e| e.intersects(start, Some(end)))
    }

    pub(crate) fn sort_entries(&mut self) {
        self.entries.sort_by_key(|e| e.start);
    }
}
