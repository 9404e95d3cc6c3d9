use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode, LoginField, Screen};
use crate::tui::AppEvent;

/// Columns/rows moved per pan keystroke
const PAN_STEP: i32 = 4;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
        AppEvent::AnalysisFinished {
            request_id,
            outcome,
        } => app.on_analysis(request_id, outcome),
        AppEvent::ActionSaved(result) => app.on_action_saved(result),
        AppEvent::ActionsLoaded { page, result } => app.on_actions_loaded(page, result),
        AppEvent::ActionDeleted(result) => app.on_action_deleted(result),
        AppEvent::LoggedIn(result) => app.on_logged_in(result),
        AppEvent::Registered(result) => app.on_registered(result),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // The login popup takes all input while open
    if app.login.is_some() {
        handle_login(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Editing => handle_command_editing(app, key),
        InputMode::Normal => handle_normal_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Screen switching
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('1') => {
            app.screen = Screen::Command;
            return;
        }
        KeyCode::Char('2') => {
            app.screen = Screen::Patterns;
            return;
        }
        KeyCode::Char('3') => {
            app.screen = Screen::Agenda;
            if app.listing.actions().is_empty() {
                app.load_actions();
            }
            return;
        }
        KeyCode::Tab => {
            app.screen = match app.screen {
                Screen::Command => Screen::Patterns,
                Screen::Patterns => Screen::Agenda,
                Screen::Agenda => Screen::Command,
            };
            if app.screen == Screen::Agenda && app.listing.actions().is_empty() {
                app.load_actions();
            }
            return;
        }
        _ => {}
    }

    match app.screen {
        Screen::Command => handle_command_normal(app, key),
        Screen::Patterns => {
            if key.code == KeyCode::Esc {
                app.screen = Screen::Command;
            }
        }
        Screen::Agenda => handle_agenda(app, key),
    }
}

fn handle_command_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') => app.input_mode = InputMode::Editing,
        KeyCode::Enter => app.submit_analysis(),
        KeyCode::Char('s') => app.save_action(),
        KeyCode::Char('e') => app.load_next_example(),
        KeyCode::Char('x') => app.clear_command(),

        // Diagram: selection and collapse
        KeyCode::Char('j') | KeyCode::Down => {
            if let Some(ast) = app.form.analysis().ast() {
                let diagram = app.diagram.layout(ast);
                app.diagram.select_next(&diagram);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let Some(ast) = app.form.analysis().ast() {
                let diagram = app.diagram.layout(ast);
                app.diagram.select_prev(&diagram);
            }
        }
        KeyCode::Char(' ') => {
            if let Some(ast) = app.form.analysis().ast() {
                app.diagram.toggle_selected(ast);
            }
        }

        // Diagram: pan and zoom
        KeyCode::Char('H') | KeyCode::Left => app.diagram.pan(PAN_STEP, 0),
        KeyCode::Char('L') | KeyCode::Right => app.diagram.pan(-PAN_STEP, 0),
        KeyCode::Char('K') => app.diagram.pan(0, PAN_STEP),
        KeyCode::Char('J') => app.diagram.pan(0, -PAN_STEP),
        KeyCode::Char('+') | KeyCode::Char('=') => app.diagram.zoom_in(),
        KeyCode::Char('-') => app.diagram.zoom_out(),
        KeyCode::Char('0') => app.diagram.recenter(),

        KeyCode::Char('l') => app.open_login(false),
        _ => {}
    }
}

fn handle_command_editing(app: &mut App, key: KeyEvent) {
    let text = app.form.text().to_string();
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.submit_analysis();
        }
        // Tab leaves the input so screen switching keeps working
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let mut text = text;
                let byte_pos = char_to_byte_index(&text, app.cursor);
                text.remove(byte_pos);
                app.set_command_text(text);
            }
        }
        KeyCode::Delete => {
            if app.cursor < text.chars().count() {
                let mut text = text;
                let byte_pos = char_to_byte_index(&text, app.cursor);
                text.remove(byte_pos);
                app.set_command_text(text);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            app.cursor = (app.cursor + 1).min(text.chars().count());
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = text.chars().count();
        }
        KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.load_next_example();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_command();
        }
        KeyCode::Char(c) => {
            let mut text = text;
            let byte_pos = char_to_byte_index(&text, app.cursor);
            text.insert(byte_pos, c);
            app.cursor += 1;
            app.set_command_text(text);
        }
        _ => {}
    }
}

fn handle_agenda(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            let len = app.listing.actions().len();
            if len > 0 {
                let i = app.listing_state.selected().unwrap_or(0);
                app.listing_state.select(Some((i + 1).min(len - 1)));
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let i = app.listing_state.selected().unwrap_or(0);
            app.listing_state.select(Some(i.saturating_sub(1)));
        }
        KeyCode::Char('n') | KeyCode::Right => app.next_page(),
        KeyCode::Char('p') | KeyCode::Left => app.prev_page(),
        KeyCode::Char('d') => app.delete_selected(),
        KeyCode::Char('r') => app.load_actions(),
        KeyCode::Char('l') => {
            if app.credential.is_some() {
                app.logout();
            } else {
                app.open_login(false);
            }
        }
        KeyCode::Esc => app.screen = Screen::Command,
        _ => {}
    }
}

fn handle_login(app: &mut App, key: KeyEvent) {
    let Some(login) = &mut app.login else {
        return;
    };

    match key.code {
        KeyCode::Esc => {
            app.login = None;
        }
        KeyCode::Enter => app.submit_login(),
        KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
            login.focus = match login.focus {
                LoginField::User => LoginField::Password,
                LoginField::Password => LoginField::User,
            };
        }
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            login.register = !login.register;
            login.errors.clear();
        }
        KeyCode::Backspace => {
            login.focused_input().pop();
        }
        KeyCode::Char(c) => {
            login.focused_input().push(c);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_byte_index_multibyte() {
        let text = "agendá reunión";
        assert_eq!(char_to_byte_index(text, 5), 5);
        // "á" is two bytes
        assert_eq!(char_to_byte_index(text, 6), 7);
        assert_eq!(char_to_byte_index(text, 100), text.len());
    }
}
