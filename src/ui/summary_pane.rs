use crate::app::AppState;
use crate::domain::Color;
use crate::report::{summary_segments, Segment};
use crate::ui::styles::{border_style, hint_style, swatch_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render every time entry as one colored bar, scaled to the total
pub fn render_summary_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Summary ", title_style()));

    let width = block.inner(area).width as usize;
    let segments = summary_segments(app.store.tasks(), app.store.now());

    let line = if segments.is_empty() {
        Line::from(Span::styled("No time logged yet", hint_style()))
    } else {
        bar_line(&bar_cells(&segments, width))
    };

    f.render_widget(Paragraph::new(line).block(block), area);
}

/// Color of each column: the segment covering the column's midpoint
fn bar_cells(segments: &[Segment], width: usize) -> Vec<Option<Color>> {
    (0..width)
        .map(|x| {
            let mid = (x as f64 + 0.5) / width as f64;
            segments
                .iter()
                .find(|s| s.start <= mid && mid < s.end)
                .map(|s| s.color)
        })
        .collect()
}

/// Runs of equal color become one span each
fn bar_line(cells: &[Option<Color>]) -> Line<'static> {
    let mut spans = Vec::new();
    let mut run: Option<(Option<Color>, usize)> = None;

    for &cell in cells {
        match run {
            Some((color, len)) if color == cell => run = Some((color, len + 1)),
            _ => {
                if let Some((color, len)) = run.take() {
                    spans.push(cell_span(color, len));
                }
                run = Some((cell, 1));
            }
        }
    }
    if let Some((color, len)) = run {
        spans.push(cell_span(color, len));
    }

    Line::from(spans)
}

fn cell_span(color: Option<Color>, len: usize) -> Span<'static> {
    match color {
        Some(color) => Span::styled("█".repeat(len), swatch_style(color)),
        None => Span::raw(" ".repeat(len)),
    }
}
