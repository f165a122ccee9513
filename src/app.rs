use crate::config::Settings;
use crate::domain::{parse_duration_input, parse_start_input, EntryId, FormKind, TaskId, UiMode};
use crate::persistence::JsonStore;
use crate::store::{RowRef, StoreError, TaskStore};
use crate::ui::list_view::ListView;
use chrono::Duration;
use std::time::Instant;

pub type Store = TaskStore<JsonStore, ListView>;

/// What a submitted form applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    NewTask,
    Task(TaskId),
    Entry { task: TaskId, entry: EntryId },
}

/// Input form state
#[derive(Debug, Clone)]
pub struct InputFormState {
    pub kind: FormKind,
    pub fields: Vec<String>,
    pub editing_field: usize,
    pub target: FormTarget,
}

impl InputFormState {
    fn new(kind: FormKind, target: FormTarget, fields: Vec<String>) -> Self {
        Self {
            kind,
            fields,
            editing_field: 0,
            target,
        }
    }
}

/// Error dialog contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorState {
    pub title: String,
    pub message: String,
}

/// Main application state
pub struct AppState {
    pub store: Store,
    pub ui_mode: UiMode,
    pub input_form: Option<InputFormState>,
    pub error: Option<ErrorState>,
    pub time_format: String,
}

impl AppState {
    pub fn new(mut store: Store, settings: &Settings) -> Self {
        let rows = store.row_count();
        store.sink_mut().reset(rows);

        Self {
            store,
            ui_mode: UiMode::Normal,
            input_form: None,
            error: None,
            time_format: settings.time_format.clone(),
        }
    }

    pub fn selected_index(&self) -> usize {
        self.store.sink().selected()
    }

    pub fn selected_row(&self) -> Option<RowRef> {
        self.store.row_at(self.selected_index())
    }

    /// Task owning the selected row
    pub fn selected_task(&self) -> Option<usize> {
        self.selected_row().map(|row| row.task())
    }

    pub fn move_selection_up(&mut self) {
        self.store.sink_mut().select_previous();
    }

    pub fn move_selection_down(&mut self) {
        self.store.sink_mut().select_next();
    }

    /// Start the selected task, or stop it when it is already running
    pub fn toggle_run(&mut self) {
        let Some(t) = self.selected_task() else {
            return;
        };

        let result = if self.store.active_index() == Some(t) {
            self.store.stop().map(|_| ())
        } else {
            self.store.start(t).map(|_| ())
        };
        self.report(result);
    }

    pub fn stop(&mut self) {
        let result = self.store.stop().map(|_| ());
        self.report(result);
    }

    /// Expand or collapse the selected task; on a detail row, collapse its task
    pub fn toggle_expand(&mut self) {
        match self.selected_row() {
            Some(RowRef::Task(t)) => {
                let result = self.store.toggle_expansion(t);
                self.report(result);
            }
            Some(_) => {
                self.store.collapse();
            }
            None => {}
        }
    }

    /// Delete the selected task or time entry
    pub fn delete_selected(&mut self) {
        let result = match self.selected_row() {
            Some(RowRef::Task(t)) => self.store.delete_task(t),
            Some(RowRef::Detail { task, entry }) => self.store.delete_entry(task, entry),
            _ => Ok(()),
        };
        self.report(result);
    }

    /// Open the form for a new task
    pub fn start_add_task(&mut self) {
        self.open_form(InputFormState::new(
            FormKind::NewTask,
            FormTarget::NewTask,
            vec![String::new()],
        ));
    }

    pub fn start_rename(&mut self) {
        let Some(RowRef::Task(t)) = self.selected_row() else {
            return;
        };
        let task = &self.store.tasks()[t];
        let form = InputFormState::new(
            FormKind::RenameTask,
            FormTarget::Task(task.id),
            vec![task.name.clone()],
        );
        self.open_form(form);
    }

    /// Open the form for logging time against the selected task
    pub fn start_add_time(&mut self) {
        let Some(t) = self.selected_task() else {
            return;
        };
        let start = self.store.now() - Duration::minutes(30);
        let form = InputFormState::new(
            FormKind::AddTime,
            FormTarget::Task(self.store.tasks()[t].id),
            vec![start.format("%Y-%m-%d %H:%M").to_string(), "30m".to_string()],
        );
        self.open_form(form);
    }

    pub fn start_edit_note(&mut self) {
        let Some(RowRef::Detail { task, entry }) = self.selected_row() else {
            return;
        };
        let owner = &self.store.tasks()[task];
        let entry = &owner.entries[entry];
        let form = InputFormState::new(
            FormKind::EditNote,
            FormTarget::Entry {
                task: owner.id,
                entry: entry.id,
            },
            vec![entry.note.clone().unwrap_or_default()],
        );
        self.open_form(form);
    }

    fn open_form(&mut self, form: InputFormState) {
        self.input_form = Some(form);
        self.ui_mode = UiMode::Editing;
    }

    /// Move to the next field of the input form
    pub fn input_form_toggle_field(&mut self) {
        if let Some(form) = &mut self.input_form {
            form.editing_field = (form.editing_field + 1) % form.fields.len();
        }
    }

    /// Add character to input form (current field)
    pub fn input_form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.input_form {
            form.fields[form.editing_field].push(c);
        }
    }

    /// Backspace in input form (current field)
    pub fn input_form_backspace(&mut self) {
        if let Some(form) = &mut self.input_form {
            form.fields[form.editing_field].pop();
        }
    }

    /// Submit input form
    pub fn submit_input_form(&mut self) {
        let Some(form) = self.input_form.take() else {
            return;
        };
        self.ui_mode = UiMode::Normal;

        let result = match (form.kind, form.target) {
            (FormKind::NewTask, _) => self.store.create_task(&form.fields[0]).map(|t| {
                let row = self.store.to_list_index(t);
                self.store.sink_mut().select(row);
            }),
            (FormKind::RenameTask, FormTarget::Task(id)) => match self.store.index_of(id) {
                Some(t) => self.store.rename_task(t, &form.fields[0]),
                None => Ok(()),
            },
            (FormKind::AddTime, FormTarget::Task(id)) => {
                self.submit_add_time(id, &form.fields[0], &form.fields[1]);
                return;
            }
            (FormKind::EditNote, FormTarget::Entry { task, entry }) => {
                match self.locate_entry(task, entry) {
                    Some((t, e)) => self.store.update_note(t, e, &form.fields[0]),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        };
        self.report(result);
    }

    fn submit_add_time(&mut self, task: TaskId, start: &str, duration: &str) {
        let Some(t) = self.store.index_of(task) else {
            return;
        };

        let today = self.store.now().date_naive();
        let Some(start) = parse_start_input(start, today) else {
            self.show_error(
                "Cannot add time to task",
                "Start must look like HH:MM or YYYY-MM-DD HH:MM.",
            );
            return;
        };
        let Some(end) = parse_duration_input(duration).and_then(|d| start.checked_add_signed(d))
        else {
            self.show_error(
                "Cannot add time to task",
                "Duration must look like 1h30m, 45m or 90s.",
            );
            return;
        };

        let result = self.store.add_entry(t, start, end).map(|_| ());
        self.report(result);
    }

    fn locate_entry(&self, task: TaskId, entry: EntryId) -> Option<(usize, usize)> {
        let t = self.store.index_of(task)?;
        let e = self.store.tasks()[t].entry_index(entry)?;
        Some((t, e))
    }

    /// Cancel input form
    pub fn cancel_input_form(&mut self) {
        self.input_form = None;
        self.ui_mode = UiMode::Normal;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
        self.ui_mode = UiMode::Normal;
    }

    /// Surface a failed store operation; the app stays usable
    fn report(&mut self, result: Result<(), StoreError>) {
        if let Err(err) = result {
            tracing::warn!(error = %err, "operation failed");
            self.show_error(err.title(), &err.to_string());
        }
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.error = Some(ErrorState {
            title: title.to_string(),
            message: message.to_string(),
        });
        self.ui_mode = UiMode::Error;
    }

    /// Drive the running timer
    pub fn tick(&mut self, now: Instant) -> bool {
        self.store.poll_tick(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Persistence;

    fn create_test_app(names: &[&str]) -> AppState {
        let mut db = JsonStore::in_memory();
        for name in names {
            db.create_task(name).unwrap();
        }
        let store = TaskStore::load(db, ListView::default()).unwrap();
        AppState::new(store, &Settings::default())
    }

    #[test]
    fn test_new_app_knows_row_count() {
        let app = create_test_app(&["One", "Two"]);
        assert_eq!(app.store.sink().rows(), 2);
        assert_eq!(app.selected_row(), Some(RowRef::Task(0)));
    }

    #[test]
    fn test_toggle_run_starts_and_stops() {
        let mut app = create_test_app(&["One", "Two"]);
        app.move_selection_down();

        app.toggle_run();
        assert_eq!(app.store.active_index(), Some(1));

        app.toggle_run();
        assert_eq!(app.store.active_index(), None);
        assert!(app.error.is_none());
    }

    #[test]
    fn test_submit_new_task_selects_it() {
        let mut app = create_test_app(&["One"]);
        app.start_add_task();
        for c in "Two".chars() {
            app.input_form_add_char(c);
        }

        app.submit_input_form();

        assert_eq!(app.store.len(), 2);
        assert_eq!(app.selected_index(), 1);
        assert_eq!(app.ui_mode, UiMode::Normal);
    }

    #[test]
    fn test_empty_task_name_shows_error() {
        let mut app = create_test_app(&[]);
        app.start_add_task();
        app.submit_input_form();

        assert_eq!(app.ui_mode, UiMode::Error);
        assert_eq!(app.error.as_ref().unwrap().title, "Invalid task name");
        assert!(app.store.is_empty());

        app.dismiss_error();
        assert_eq!(app.ui_mode, UiMode::Normal);
    }

    #[test]
    fn test_add_time_and_note() {
        let mut app = create_test_app(&["One"]);
        app.start_add_time();
        {
            let form = app.input_form.as_mut().unwrap();
            form.fields[0] = "2020-01-01 10:00".to_string();
            form.fields[1] = "45m".to_string();
        }
        app.submit_input_form();
        assert!(app.error.is_none());
        assert_eq!(app.store.tasks()[0].entries.len(), 1);

        app.toggle_expand();
        app.move_selection_down();
        assert_eq!(app.selected_row(), Some(RowRef::Detail { task: 0, entry: 0 }));

        app.start_edit_note();
        for c in "retro".chars() {
            app.input_form_add_char(c);
        }
        app.submit_input_form();
        assert_eq!(app.store.tasks()[0].entries[0].note.as_deref(), Some("retro"));
    }

    #[test]
    fn test_bad_duration_shows_error() {
        let mut app = create_test_app(&["One"]);
        app.start_add_time();
        app.input_form.as_mut().unwrap().fields[1] = "soon".to_string();

        app.submit_input_form();

        assert_eq!(app.ui_mode, UiMode::Error);
        assert!(app.store.tasks()[0].entries.is_empty());
    }

    #[test]
    fn test_huge_duration_shows_error() {
        let mut app = create_test_app(&["One"]);
        app.start_add_time();
        app.input_form.as_mut().unwrap().fields[1] = "99999999999d".to_string();

        app.submit_input_form();

        assert_eq!(app.ui_mode, UiMode::Error);
        assert_eq!(
            app.error.as_ref().unwrap().message,
            "Duration must look like 1h30m, 45m or 90s."
        );
        assert!(app.store.tasks()[0].entries.is_empty());
    }

    #[test]
    fn test_delete_running_detail_shows_error() {
        let mut app = create_test_app(&["One"]);
        app.toggle_run();
        app.toggle_expand();
        app.move_selection_down();

        app.delete_selected();

        assert_eq!(app.ui_mode, UiMode::Error);
        assert_eq!(app.store.tasks()[0].entries.len(), 1);
    }

    #[test]
    fn test_toggle_expand_on_detail_collapses() {
        let mut app = create_test_app(&["One", "Two"]);
        app.toggle_expand();
        app.move_selection_down();
        assert_eq!(app.selected_row(), Some(RowRef::Placeholder { task: 0 }));

        app.toggle_expand();

        assert_eq!(app.store.expanded_index(), None);
        assert_eq!(app.selected_index(), 0);
    }
}
