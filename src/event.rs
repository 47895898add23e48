use crate::actions::Action;
use crate::app::{AppMode, AppState};
use anyhow::Result;
use crate::ui;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;

pub fn handle_events(app: &mut AppState) -> Result<Option<Action>> {
    if event::poll(Duration::from_millis(50))? {
        match event::read()? {
            // Windows reports releases too.
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                return Ok(handle_key_event(app, key));
            }
            Event::Mouse(mouse) => return Ok(handle_mouse_event(app, mouse)),
            _ => {}
        }
    }
    Ok(None)
}

pub fn handle_key_event(app: &AppState, key: KeyEvent) -> Option<Action> {
    match &app.mode {
        AppMode::Normal => handle_normal_mode(key),
        AppMode::Editing { .. } => handle_editing_mode(key),
        AppMode::Help => handle_help_mode(key),
    }
}

/// Left clicks on a node in Normal mode. Other mouse input is ignored.
pub fn handle_mouse_event(app: &AppState, mouse: MouseEvent) -> Option<Action> {
    if app.mode != AppMode::Normal {
        return None;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            ui::node_at(app, mouse.column, mouse.row).map(Action::ClickNode)
        }
        _ => None,
    }
}

fn handle_normal_mode(key: KeyEvent) -> Option<Action> {
    use KeyCode::*;

    if key.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        return match key.code {
            Char('c') => Some(Action::Quit),
            Char('z') if shift => Some(Action::Redo),
            Char('Z') => Some(Action::Redo),
            Char('z') => Some(Action::Undo),
            Char('y') | Char('r') => Some(Action::Redo),
            _ => None,
        };
    }

    // Shifted symbols and capitals arrive with or without SHIFT depending on
    // the terminal, so plain keys match on the code alone.
    match key.code {
        Char('q') => Some(Action::Quit),

        // Movement
        Char('h') | Left => Some(Action::GoParent),
        Char('j') | Down => Some(Action::GoNextSibling),
        Char('k') | Up => Some(Action::GoPreviousSibling),
        Char('l') | Right => Some(Action::GoFirstChild),
        Char('m') | Char('~') => Some(Action::GoToRoot),

        // Node manipulation
        Tab => Some(Action::AddChild),
        Enter => Some(Action::AddSibling),
        Backspace | Delete | Char('d') => Some(Action::DeleteNode),
        Char('K') => Some(Action::MoveNodeUp),
        Char('J') => Some(Action::MoveNodeDown),

        // Editing
        Char(' ') | Char('e') => Some(Action::EditNodeAppend),
        Char('E') => Some(Action::EditNodeReplace),

        // Undo/Redo
        Char('u') => Some(Action::Undo),

        // Projects
        Char('R') => Some(Action::Reorganize),
        Char(']') => Some(Action::NextProject),
        Char('[') => Some(Action::PreviousProject),

        Char('?') => Some(Action::ShowHelp),

        _ => None,
    }
}

fn handle_editing_mode(key: KeyEvent) -> Option<Action> {
    use KeyCode::*;

    match (key.code, key.modifiers) {
        (Esc, _) => Some(Action::CancelEdit),
        (Enter, _) => Some(Action::ConfirmEdit),
        (Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => Some(Action::TypeChar(c)),

        (Backspace, _) => Some(Action::Backspace),
        (Delete, _) => Some(Action::Delete),

        (Left, _) => Some(Action::MoveCursorLeft),
        (Right, _) => Some(Action::MoveCursorRight),
        (Home, _) => Some(Action::MoveCursorHome),
        (End, _) => Some(Action::MoveCursorEnd),
        (Char('a'), KeyModifiers::CONTROL) => Some(Action::MoveCursorHome),
        (Char('e'), KeyModifiers::CONTROL) => Some(Action::MoveCursorEnd),

        _ => None,
    }
}

fn handle_help_mode(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Some(Action::CloseHelp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::create_test_app;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_normal_mode_keys() {
        let (app, _dir) = create_test_app();
        let action = |k| handle_key_event(&app, k);

        assert_eq!(action(key(KeyCode::Tab)), Some(Action::AddChild));
        assert_eq!(action(key(KeyCode::Enter)), Some(Action::AddSibling));
        assert_eq!(action(key(KeyCode::Backspace)), Some(Action::DeleteNode));
        assert_eq!(action(key(KeyCode::Delete)), Some(Action::DeleteNode));
        assert_eq!(action(key(KeyCode::Char(' '))), Some(Action::EditNodeAppend));
        assert_eq!(action(key(KeyCode::Left)), Some(Action::GoParent));
        assert_eq!(action(key(KeyCode::Right)), Some(Action::GoFirstChild));
        assert_eq!(action(key(KeyCode::Up)), Some(Action::GoPreviousSibling));
        assert_eq!(action(key(KeyCode::Down)), Some(Action::GoNextSibling));
        assert_eq!(
            action(KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT)),
            Some(Action::MoveNodeUp)
        );
    }

    #[test]
    fn test_history_shortcuts() {
        let (app, _dir) = create_test_app();
        let action = |k| handle_key_event(&app, k);

        assert_eq!(action(ctrl('z')), Some(Action::Undo));
        assert_eq!(action(ctrl('y')), Some(Action::Redo));
        assert_eq!(action(ctrl('r')), Some(Action::Redo));
        assert_eq!(
            action(KeyEvent::new(
                KeyCode::Char('z'),
                KeyModifiers::CONTROL | KeyModifiers::SHIFT
            )),
            Some(Action::Redo)
        );
        assert_eq!(
            action(KeyEvent::new(
                KeyCode::Char('Z'),
                KeyModifiers::CONTROL | KeyModifiers::SHIFT
            )),
            Some(Action::Redo)
        );
    }

    #[test]
    fn test_editing_mode_keys() {
        let (mut app, _dir) = create_test_app();
        app.mode = AppMode::Editing {
            buffer: String::new(),
            cursor_pos: 0,
            naming_new: false,
        };
        let action = |k| handle_key_event(&app, k);

        assert_eq!(action(key(KeyCode::Char('d'))), Some(Action::TypeChar('d')));
        assert_eq!(action(key(KeyCode::Backspace)), Some(Action::Backspace));
        assert_eq!(action(key(KeyCode::Enter)), Some(Action::ConfirmEdit));
        assert_eq!(action(key(KeyCode::Esc)), Some(Action::CancelEdit));
        assert_eq!(action(key(KeyCode::Tab)), None);
    }

    #[test]
    fn test_help_mode_keys() {
        let (mut app, _dir) = create_test_app();
        app.mode = AppMode::Help;
        assert_eq!(
            handle_key_event(&app, key(KeyCode::Esc)),
            Some(Action::CloseHelp)
        );
        assert_eq!(handle_key_event(&app, key(KeyCode::Tab)), None);
    }

    #[test]
    fn test_mouse_only_clicks_in_normal_mode() {
        let (mut app, _dir) = create_test_app();
        let click = |kind| MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };

        assert_eq!(handle_mouse_event(&app, click(MouseEventKind::Moved)), None);
        assert_eq!(
            handle_mouse_event(&app, click(MouseEventKind::Down(MouseButton::Right))),
            None
        );

        app.mode = AppMode::Help;
        let left = click(MouseEventKind::Down(MouseButton::Left));
        assert_eq!(handle_mouse_event(&app, left), None);
    }
}
