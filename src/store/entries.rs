use super::{RowSink, StoreError, TaskStore, ValidationError};
use crate::domain::EntryId;
use crate::persistence::Persistence;
use chrono::{DateTime, Local};

impl<P: Persistence, S: RowSink> TaskStore<P, S> {
    /// Log a finished interval against task `t`
    pub fn add_entry(
        &mut self,
        t: usize,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<EntryId, StoreError> {
        self.check_task(t)?;
        self.validate_interval(t, start, end)?;

        let task_id = self.tasks[t].id;
        let entry = self.persistence.create_entry(task_id, start, Some(end))?;
        let id = entry.id;
        tracing::info!(task = %self.tasks[t].name, entry = %id, %start, %end, "added time");

        let pos = self.tasks[t].insertion_index(start);
        self.tasks[t].entries.insert(pos, entry);

        if let Some(row) = self.detail_row_index(t, pos) {
            if self.tasks[t].entries.len() == 1 {
                self.sink.reload_rows(&[row]);
            } else {
                self.sink.insert_rows(&[row]);
            }
        }

        self.sink.update_row(self.to_list_index(t));
        self.reorder(t);
        Ok(id)
    }

    fn validate_interval(
        &self,
        t: usize,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<(), ValidationError> {
        if end <= start {
            return Err(ValidationError::EmptyInterval);
        }

        let now = self.now();
        if end > now {
            return Err(ValidationError::EndsInFuture);
        }

        if let Some(a) = self.active {
            let task = &self.tasks[a];
            if let Some(running) = task.active_entry() {
                if running.intersects(start, Some(end)) {
                    return Err(ValidationError::OverlapsActive {
                        entry: running.id,
                        task: task.id,
                    });
                }
            }
        }

        // Other tasks' finished entries may overlap this one
        match self.tasks[t].find_overlap(start, end) {
            Some(hit) if hit.is_active() => Err(ValidationError::OverlapsActive {
                entry: hit.id,
                task: self.tasks[t].id,
            }),
            Some(hit) => Err(ValidationError::Overlaps {
                entry: hit.id,
                start: hit.start,
                elapsed: hit.elapsed_at(now),
            }),
            None => Ok(()),
        }
    }

    /// Delete entry `e` of task `t`; a running entry has to be stopped first
    pub fn delete_entry(&mut self, t: usize, e: usize) -> Result<(), StoreError> {
        self.check_entry(t, e)?;
        let entry = &self.tasks[t].entries[e];
        if entry.is_active() {
            return Err(StoreError::ActiveEntry);
        }

        let id = entry.id;
        self.persistence.delete_entry(id)?;
        tracing::info!(task = %self.tasks[t].name, entry = %id, "deleted time");

        let row = self.detail_row_index(t, e);
        self.tasks[t].entries.remove(e);

        if let Some(row) = row {
            if self.tasks[t].entries.is_empty() {
                self.sink.reload_rows(&[row]);
            } else {
                self.sink.remove_rows(&[row]);
            }
        }

        self.sink.update_row(self.to_list_index(t));
        self.reorder(t);
        Ok(())
    }

    /// Set or clear (empty text) the note of entry `e` of task `t`
    pub fn update_note(&mut self, t: usize, e: usize, text: &str) -> Result<(), StoreError> {
        self.check_entry(t, e)?;
        let text = text.trim();
        let note = (!text.is_empty()).then_some(text);

        let id = self.tasks[t].entries[e].id;
        self.persistence.set_note(id, note)?;
        tracing::debug!(entry = %id, cleared = note.is_none(), "updated note");

        self.tasks[t].entries[e].note = note.map(str::to_string);
        if let Some(row) = self.detail_row_index(t, e) {
            self.sink.update_row(row);
        }
        Ok(())
    }
}
