pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod list_pane;
pub mod list_view;
pub mod modal;
pub mod styles;
pub mod summary_pane;

use crate::app::AppState;
use crate::domain::UiMode;
use input_form::render_input_form;
use keybindings::render_keybindings;
use layout::create_layout;
use list_pane::render_list_pane;
use modal::render_error_modal;
use ratatui::Frame;
use summary_pane::render_summary_pane;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let size = f.size();
    let layout = create_layout(size);

    render_keybindings(f, layout.keybindings_area);
    render_list_pane(f, app, layout.list_area);
    render_summary_pane(f, app, layout.summary_area);

    match app.ui_mode {
        UiMode::Editing => render_input_form(f, app, size),
        UiMode::Error => render_error_modal(f, app, size),
        UiMode::Normal => {}
    }
}
