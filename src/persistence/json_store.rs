use super::files::atomic_write;
use super::{Persistence, PersistenceError};
use crate::domain::{Color, EntryId, Task, TaskId, TimeEntry};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaskRecord {
    id: TaskId,
    name: String,
    color: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryRecord {
    id: EntryId,
    task_id: TaskId,
    start: DateTime<Local>,
    #[serde(default)]
    end: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

/// Everything stored in tally.json
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    tasks: Vec<TaskRecord>,
    #[serde(default)]
    entries: Vec<EntryRecord>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            tasks: Vec::new(),
            entries: Vec::new(),
        }
    }
}

impl Snapshot {
    fn task_mut(&mut self, id: TaskId) -> Result<&mut TaskRecord, PersistenceError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(PersistenceError::UnknownTask(id))
    }

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut EntryRecord, PersistenceError> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(PersistenceError::UnknownEntry(id))
    }
}

/// Task storage in a single JSON document.
///
/// Mutations are applied to a copy of the snapshot, written atomically, and only then
/// become the current state, so a failed write leaves both the file and memory as they were.
pub struct JsonStore {
    /// None keeps everything in memory
    path: Option<PathBuf>,
    snapshot: Snapshot,
}

impl JsonStore {
    /// Open the store at `path`, starting empty if the file doesn't exist yet
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
            Err(source) => return Err(PersistenceError::Read { path, source }),
        };

        let snapshot = if content.trim().is_empty() {
            Snapshot::default()
        } else {
            serde_json::from_str(&content)?
        };

        tracing::debug!(
            path = %path.display(),
            tasks = snapshot.tasks.len(),
            entries = snapshot.entries.len(),
            "opened task database"
        );

        Ok(Self {
            path: Some(path),
            snapshot,
        })
    }

    /// A store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            path: None,
            snapshot: Snapshot::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Apply `change` to a copy of the data, persist it, then keep it
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut Snapshot) -> Result<T, PersistenceError>,
    ) -> Result<T, PersistenceError> {
        let mut next = self.snapshot.clone();
        let value = change(&mut next)?;

        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(&next)?;
            atomic_write(path, &json).map_err(|e| PersistenceError::Write {
                path: path.clone(),
                message: format!("{:#}", e),
            })?;
        }

        self.snapshot = next;
        Ok(value)
    }
}

impl Persistence for JsonStore {
    fn load_all_tasks(&self) -> Result<Vec<Task>, PersistenceError> {
        let mut tasks: Vec<Task> = self
            .snapshot
            .tasks
            .iter()
            .map(|t| Task::new(t.id, t.name.clone(), t.color))
            .collect();

        let positions: HashMap<TaskId, usize> =
            tasks.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

        for record in &self.snapshot.entries {
            match positions.get(&record.task_id) {
                Some(&i) => {
                    let mut entry = TimeEntry::new(record.id, record.task_id, record.start, record.end);
                    entry.note = record.note.clone();
                    tasks[i].entries.push(entry);
                }
                None => {
                    tracing::warn!(entry = %record.id, task = %record.task_id, "skipping entry of unknown task");
                }
            }
        }

        for task in &mut tasks {
            task.sort_entries();
        }

        Ok(tasks)
    }

    fn create_task(&mut self, name: &str) -> Result<Task, PersistenceError> {
        let record = TaskRecord {
            id: TaskId::new(),
            name: name.to_string(),
            color: Color::random(),
        };
        let task = Task::new(record.id, record.name.clone(), record.color);

        self.commit(|s| {
            s.tasks.push(record);
            Ok(())
        })?;

        Ok(task)
    }

    fn rename_task(&mut self, task: TaskId, name: &str) -> Result<(), PersistenceError> {
        self.commit(|s| {
            s.task_mut(task)?.name = name.to_string();
            Ok(())
        })
    }

    fn delete_task(&mut self, task: TaskId) -> Result<(), PersistenceError> {
        self.commit(|s| {
            let before = s.tasks.len();
            s.tasks.retain(|t| t.id != task);
            if s.tasks.len() == before {
                return Err(PersistenceError::UnknownTask(task));
            }
            s.entries.retain(|e| e.task_id != task);
            Ok(())
        })
    }

    fn create_entry(
        &mut self,
        task: TaskId,
        start: DateTime<Local>,
        end: Option<DateTime<Local>>,
    ) -> Result<TimeEntry, PersistenceError> {
        let entry = TimeEntry::new(EntryId::new(), task, start, end);
        let record = EntryRecord {
            id: entry.id,
            task_id: task,
            start,
            end,
            note: None,
        };

        self.commit(|s| {
            s.task_mut(task)?;
            s.entries.push(record);
            Ok(())
        })?;

        Ok(entry)
    }

    fn close_entry(&mut self, entry: EntryId, end: DateTime<Local>) -> Result<(), PersistenceError> {
        self.commit(|s| {
            let record = s.entry_mut(entry)?;
            if record.end.is_none() {
                record.end = Some(end);
            }
            Ok(())
        })
    }

    fn delete_entry(&mut self, entry: EntryId) -> Result<(), PersistenceError> {
        self.commit(|s| {
            let before = s.entries.len();
            s.entries.retain(|e| e.id != entry);
            if s.entries.len() == before {
                return Err(PersistenceError::UnknownEntry(entry));
            }
            Ok(())
        })
    }

    fn set_note(&mut self, entry: EntryId, note: Option<&str>) -> Result<(), PersistenceError> {
        self.commit(|s| {
            s.entry_mut(entry)?.note = note.map(str::to_string);
            Ok(())
        })
    }
}
