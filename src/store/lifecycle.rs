use super::{RowSink, StoreError, TaskStore, ValidationError};
use crate::persistence::Persistence;
use std::time::Instant;

fn valid_name(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        Err(ValidationError::EmptyName)
    } else {
        Ok(name)
    }
}

impl<P: Persistence, S: RowSink> TaskStore<P, S> {
    /// Create an empty task at the end of the order. Returns its index.
    pub fn create_task(&mut self, name: &str) -> Result<usize, StoreError> {
        let name = valid_name(name)?;
        let task = self.persistence.create_task(name)?;
        tracing::info!(task = %task.id, name, "created task");

        self.tasks.push(task);
        let t = self.tasks.len() - 1;
        self.sink.insert_row(self.to_list_index(t));
        Ok(t)
    }

    pub fn rename_task(&mut self, t: usize, name: &str) -> Result<(), StoreError> {
        self.check_task(t)?;
        let name = valid_name(name)?;
        self.persistence.rename_task(self.tasks[t].id, name)?;
        tracing::info!(task = %self.tasks[t].id, from = %self.tasks[t].name, to = name, "renamed task");

        self.tasks[t].name = name.to_string();
        self.sink.update_row(self.to_list_index(t));
        Ok(())
    }

    /// Delete task `t` and all of its entries
    pub fn delete_task(&mut self, t: usize) -> Result<(), StoreError> {
        self.check_task(t)?;
        self.persistence.delete_task(self.tasks[t].id)?;
        tracing::info!(task = %self.tasks[t].id, name = %self.tasks[t].name, "deleted task");

        match self.active {
            Some(a) if a == t => {
                self.active = None;
                self.ticker.deactivate();
            }
            Some(a) if a > t => self.active = Some(a - 1),
            _ => {}
        }

        if self.expanded == Some(t) {
            self.collapse();
        }

        let row = self.to_list_index(t);
        self.tasks.remove(t);
        if let Some(e) = self.expanded {
            if e > t {
                self.expanded = Some(e - 1);
            }
        }

        self.sink.remove_row(row);
        Ok(())
    }

    /// Start timing task `t`, stopping whatever runs now. Returns the task's index afterwards.
    pub fn start(&mut self, t: usize) -> Result<usize, StoreError> {
        self.check_task(t)?;
        if self.active == Some(t) {
            return Ok(t);
        }

        // Stopping reorders, so find the task again afterwards
        let id = self.tasks[t].id;
        self.stop()?;
        let t = self.index_of(id).ok_or(StoreError::NoSuchTask(t))?;

        let now = self.now();
        let entry = self.persistence.create_entry(id, now, None)?;
        tracing::info!(task = %self.tasks[t].name, entry = %entry.id, "started timer");
        self.tasks[t].entries.push(entry);

        if self.expanded == Some(t) {
            let row = self.to_list_index(t) + 1;
            if self.tasks[t].entries.len() == 1 {
                self.sink.reload_rows(&[row]);
            } else {
                self.sink.insert_rows(&[row]);
            }
        }

        self.active = Some(t);
        self.sink.update_row(self.to_list_index(t));
        self.ticker.activate(self.tick_interval, Instant::now());
        Ok(t)
    }

    /// Stop the running timer. Returns where the stopped task ended up.
    pub fn stop(&mut self) -> Result<Option<usize>, StoreError> {
        let Some(a) = self.active else {
            return Ok(None);
        };

        let Some(entry_id) = self.tasks[a].active_entry().map(|e| e.id) else {
            tracing::warn!(task = %self.tasks[a].name, "active task has no running entry");
            self.active = None;
            self.ticker.deactivate();
            return Ok(None);
        };

        let now = self.now();
        self.persistence.close_entry(entry_id, now)?;
        tracing::info!(task = %self.tasks[a].name, entry = %entry_id, "stopped timer");

        let row = self.to_list_index(a);
        self.sink.stop_row(row);
        if let Some(entry) = self.tasks[a].entries.last_mut() {
            entry.end = Some(now);
        }

        // Final pass with the closed entry
        self.sink.update_row(row);
        if self.expanded == Some(a) {
            self.sink.update_row(row + 1);
        }
        let new = self.reorder(a);

        self.active = None;
        self.ticker.deactivate();
        Ok(Some(new))
    }

    /// Refresh the running task and let it climb past tasks it now outranks
    pub fn tick(&mut self) {
        let Some(a) = self.active else {
            self.ticker.deactivate();
            return;
        };

        let row = self.to_list_index(a);
        self.sink.update_row(row);
        if self.expanded == Some(a) {
            self.sink.update_row(row + 1);
        }
        self.reorder_up(a);
    }
}
