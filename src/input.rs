use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tui_textarea::Input;

use crate::app::{AppState, InputMode};

/// Lines scrolled per mouse wheel step
const WHEEL_STEP: usize = 3;

/// Handle a mouse event
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => state.view.scroll_up(WHEEL_STEP),
        MouseEventKind::ScrollDown => state.view.scroll_down(WHEEL_STEP),
        _ => {}
    }
}

/// Handle a key event and update app state accordingly
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Help overlay takes priority
    if state.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
            state.show_help = false;
        }
        return;
    }

    match state.mode {
        InputMode::Normal => handle_normal_mode(state, key),
        _ => handle_edit_mode(state, key),
    }
}

fn handle_normal_mode(state: &mut AppState, key: KeyEvent) {
    let page_size = state.view.page_size();

    match key.code {
        // Quit
        KeyCode::Char('q') => {
            state.should_quit = true;
        }
        // Ctrl+C also quits
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.should_quit = true;
        }

        // Help
        KeyCode::Char('?') => {
            state.show_help = true;
        }

        // Stream control
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            state.toggle_pause();
        }
        KeyCode::Char('x') => {
            state.clear();
        }

        // Filtering
        KeyCode::Char('f') => {
            state.cycle_severity_filter(true);
        }
        KeyCode::Char('F') => {
            state.cycle_severity_filter(false);
        }
        KeyCode::Char('/') => {
            state.begin_edit(InputMode::Search);
        }
        KeyCode::Esc => {
            state.clear_search();
        }

        // Requests
        KeyCode::Char('e') => {
            state.begin_edit(InputMode::Path);
        }
        KeyCode::Char('a') => {
            state.begin_edit(InputMode::Query);
        }
        KeyCode::Enter => {
            state.send_request(false);
        }
        KeyCode::Char('s') => {
            state.send_request(true);
        }

        // Display and settings
        KeyCode::Char('t') => {
            state.toggle_theme();
        }
        KeyCode::Char('o') => {
            state.begin_edit(InputMode::Port);
        }

        // Navigation
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.view.scroll_down(page_size);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.view.scroll_up(page_size);
        }
        KeyCode::PageDown => {
            state.view.scroll_down(page_size);
        }
        KeyCode::PageUp => {
            state.view.scroll_up(page_size);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.view.scroll_down(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.view.scroll_up(1);
        }
        KeyCode::Char('g') => {
            state.view.go_to_top();
        }
        KeyCode::Char('G') => {
            state.view.go_to_bottom();
        }

        _ => {}
    }
}

fn handle_edit_mode(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            state.commit_edit();
        }
        KeyCode::Esc => {
            state.cancel_edit();
        }
        _ => {
            // Forward all other keys to the textarea
            let mode = state.mode;
            let changed = state
                .active_textarea()
                .is_some_and(|textarea| textarea.input(Input::from(key)));
            if changed && mode == InputMode::Search {
                // Text changed, mark for debounce
                state.search_changed();
            }
        }
    }
}
