use crate::app::AppState;
use crate::ui::{
    layout::create_modal_area,
    styles::{error_style, hint_style, modal_bg_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the error dialog; any key dismisses it
pub fn render_error_modal(f: &mut Frame, app: &AppState, area: Rect) {
    if let Some(error) = &app.error {
        let modal_area = create_modal_area(area);

        // Clear the area behind the modal
        f.render_widget(Clear, modal_area);

        let lines = vec![
            Line::raw(""),
            Line::raw(format!("  {}", error.message)),
            Line::raw(""),
            Line::from(Span::styled("  Press any key to continue", hint_style())),
        ];

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(format!(" {} ", error.title), error_style()))
                    .style(modal_bg_style()),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, modal_area);
    }
}
