use crate::app::AppState;
use crate::domain::UiMode;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match app.ui_mode {
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::Editing => handle_input_form_mode(app, key),
        UiMode::Error => handle_error_mode(app, key),
    }
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Ok(true),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Ok(true),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => {
            app.move_selection_up();
            Ok(false)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.move_selection_down();
            Ok(false)
        }

        // Timer
        KeyCode::Enter => {
            app.toggle_run();
            Ok(false)
        }
        KeyCode::Char('s') => {
            app.stop();
            Ok(false)
        }

        // Show / hide time entries
        KeyCode::Char(' ') => {
            app.toggle_expand();
            Ok(false)
        }

        KeyCode::Char('a') => {
            app.start_add_task();
            Ok(false)
        }
        KeyCode::Char('r') => {
            app.start_rename();
            Ok(false)
        }
        KeyCode::Char('t') => {
            app.start_add_time();
            Ok(false)
        }
        KeyCode::Char('n') => {
            app.start_edit_note();
            Ok(false)
        }
        KeyCode::Char('x') | KeyCode::Delete => {
            app.delete_selected();
            Ok(false)
        }

        _ => Ok(false),
    }
}

/// Handle keys in input form mode
fn handle_input_form_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        // Submit form
        KeyCode::Enter => {
            app.submit_input_form();
            Ok(false)
        }

        // Cancel form
        KeyCode::Esc => {
            app.cancel_input_form();
            Ok(false)
        }

        // Switch between fields
        KeyCode::Tab => {
            app.input_form_toggle_field();
            Ok(false)
        }

        // Backspace
        KeyCode::Backspace => {
            app.input_form_backspace();
            Ok(false)
        }

        // Add character
        KeyCode::Char(c) => {
            app.input_form_add_char(c);
            Ok(false)
        }

        _ => Ok(false),
    }
}

/// Any key dismisses the error dialog
fn handle_error_mode(app: &mut AppState, _key: KeyEvent) -> Result<bool> {
    app.dismiss_error();
    Ok(false)
}
