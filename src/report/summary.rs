use crate::domain::{format_elapsed, Color, Task, TaskId};
use chrono::{DateTime, Local};

/// One entry's slice of the summary bar, as fractions of the total elapsed time
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub task_id: TaskId,
    pub color: Color,
    pub start: f64,
    pub end: f64,
}

/// Time logged against one task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskTotal {
    pub name: String,
    pub color: Color,
    pub elapsed: i64,
    /// Fraction of all logged time, 0 when nothing is logged
    pub share: f64,
    pub running: bool,
}

/// Every entry laid end to end in start order, scaled to [0, 1]
pub fn summary_segments(tasks: &[Task], now: DateTime<Local>) -> Vec<Segment> {
    let mut entries: Vec<(&Task, DateTime<Local>, i64)> = tasks
        .iter()
        .flat_map(|t| t.entries.iter().map(move |e| (t, e.start, e.elapsed_at(now))))
        .collect();
    entries.sort_by_key(|&(_, start, _)| start);

    let total: i64 = entries.iter().map(|&(_, _, elapsed)| elapsed).sum();
    if total <= 0 {
        return Vec::new();
    }

    let mut cursor = 0;
    entries
        .into_iter()
        .filter(|&(_, _, elapsed)| elapsed > 0)
        .map(|(task, _, elapsed)| {
            let start = cursor as f64 / total as f64;
            cursor += elapsed;
            Segment {
                task_id: task.id,
                color: task.color,
                start,
                end: cursor as f64 / total as f64,
            }
        })
        .collect()
}

/// Per-task totals, largest first
pub fn task_totals(tasks: &[Task], now: DateTime<Local>) -> Vec<TaskTotal> {
    let total: i64 = tasks.iter().map(|t| t.elapsed_at(now)).sum();

    let mut totals: Vec<TaskTotal> = tasks
        .iter()
        .map(|t| {
            let elapsed = t.elapsed_at(now);
            TaskTotal {
                name: t.name.clone(),
                color: t.color,
                elapsed,
                share: if total > 0 { elapsed as f64 / total as f64 } else { 0.0 },
                running: t.is_active(),
            }
        })
        .collect();

    totals.sort_by_key(|t| std::cmp::Reverse(t.elapsed));
    totals
}

/// Format percentage with 1 decimal place
fn format_percent(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

/// Plain-text report for the terminal
pub fn render_summary(tasks: &[Task], now: DateTime<Local>) -> String {
    let totals = task_totals(tasks, now);
    let total: i64 = totals.iter().map(|t| t.elapsed).sum();

    let mut report = String::new();
    report.push_str(&format!("All Tasks - {}\n", format_elapsed(total)));

    if totals.is_empty() {
        report.push_str("\nNo tasks yet.\n");
        return report;
    }

    let width = totals.iter().map(|t| t.name.chars().count()).max().unwrap_or(0);
    report.push('\n');
    for t in &totals {
        let marker = if t.running { "▶" } else { " " };
        report.push_str(&format!(
            "{} {:<width$}  {:>8}  {:>6}\n",
            marker,
            t.name,
            format_elapsed(t.elapsed),
            format_percent(t.share),
            width = width
        ));
    }

    report
}
