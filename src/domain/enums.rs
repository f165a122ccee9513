/// UI mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    /// An input form is open (new task, rename, add time, note)
    Editing,
    /// An error dialog is showing; any key dismisses it
    Error,
}

/// What an input form submits to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    NewTask,
    RenameTask,
    AddTime,
    EditNote,
}

impl FormKind {
    /// Title shown on the form border
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::NewTask => " Create Task ",
            FormKind::RenameTask => " Rename Task ",
            FormKind::AddTime => " Add Time ",
            FormKind::EditNote => " Note ",
        }
    }

    /// Labels of the fields, in tab order
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            FormKind::NewTask => &["Name"],
            FormKind::RenameTask => &["New name"],
            FormKind::AddTime => &["Start (HH:MM or YYYY-MM-DD HH:MM)", "Duration (e.g. 1h30m)"],
            FormKind::EditNote => &["Note (empty to clear)"],
        }
    }
}
