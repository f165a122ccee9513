use crate::app::AppState;
use crate::domain::{format_elapsed, format_time, Task, TimeEntry};
use crate::store::RowRef;
use crate::ui::styles::{
    border_style, default_style, detail_style, running_style, selected_style, swatch_style,
    title_style,
};
use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the task list, with the expanded task's entries under it
pub fn render_list_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let store = &app.store;
    let now = store.now();

    let items: Vec<ListItem> = (0..store.row_count())
        .filter_map(|row| store.row_at(row))
        .map(|row| match row {
            RowRef::Task(t) => {
                let task = &store.tasks()[t];
                ListItem::new(create_task_line(task, now)).style(default_style())
            }
            RowRef::Detail { task, entry } => {
                let entry = &store.tasks()[task].entries[entry];
                ListItem::new(create_entry_line(entry, now, &app.time_format)).style(detail_style())
            }
            RowRef::Placeholder { .. } => {
                ListItem::new(Line::raw("      No time logged yet")).style(detail_style())
            }
        })
        .collect();

    let title = format!(" All Tasks - {} ", format_elapsed(store.total_elapsed()));

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(title, title_style())),
        )
        .highlight_style(selected_style());

    let mut state = ListState::default();
    if !store.is_empty() {
        state.select(Some(app.selected_index()));
    }

    f.render_stateful_widget(list, area, &mut state);
}

/// Format: ■ Write proposal  1h30m  ▶ 12m4s
fn create_task_line(task: &Task, now: DateTime<Local>) -> Line<'static> {
    let mut spans = vec![
        Span::styled("■ ".to_string(), swatch_style(task.color)),
        Span::raw(task.name.clone()),
        Span::raw("  ".to_string()),
        Span::raw(format_elapsed(task.elapsed_at(now))),
    ];

    if task.is_active() {
        spans.push(Span::styled(
            format!("  ▶ {}", format_elapsed(task.current_elapsed_at(now))),
            running_style(),
        ));
    }

    Line::from(spans)
}

/// Format: 03/01 10:00AM → 03/01 11:30AM  1h30m  standup
fn create_entry_line(entry: &TimeEntry, now: DateTime<Local>, time_format: &str) -> Line<'static> {
    let mut spans = vec![
        Span::raw("      ".to_string()),
        Span::raw(format_time(Some(entry.start), time_format)),
        Span::raw(" → ".to_string()),
        Span::raw(format_time(entry.end, time_format)),
        Span::raw("  ".to_string()),
        Span::raw(format_elapsed(entry.elapsed_at(now))),
    ];

    if let Some(note) = &entry.note {
        spans.push(Span::raw(format!("  {}", note)));
    }

    Line::from(spans)
}
