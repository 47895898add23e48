use crate::app::{AppMode, AppState};
use crate::navigation::Command;

// Byte offset of the `char_pos`-th char, or the end of the buffer.
fn byte_index(buffer: &str, char_pos: usize) -> usize {
    buffer
        .char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(buffer.len())
}

pub fn start_editing(app: &mut AppState, replace: bool) {
    begin_editing(app, replace, false);
}

/// Opens an empty editor for a node that was just added. Confirming names
/// it within the same undo step as the add.
pub fn start_naming_new(app: &mut AppState) {
    begin_editing(app, true, true);
}

fn begin_editing(app: &mut AppState, replace: bool, naming_new: bool) {
    let Some(focused) = app.session.focused() else {
        return;
    };
    let map = app.session.map();
    let Some(node) = map.find_node(focused).and_then(|handle| map.get(handle)) else {
        return;
    };

    let buffer = if replace {
        String::new()
    } else {
        node.topic.clone()
    };
    let cursor_pos = buffer.chars().count();
    app.mode = AppMode::Editing {
        buffer,
        cursor_pos,
        naming_new,
    };
}

pub fn type_char(app: &mut AppState, c: char) {
    if let AppMode::Editing { buffer, cursor_pos, .. } = &mut app.mode {
        let at = byte_index(buffer, *cursor_pos);
        buffer.insert(at, c);
        *cursor_pos += 1;
    }
}

pub fn backspace(app: &mut AppState) {
    if let AppMode::Editing { buffer, cursor_pos, .. } = &mut app.mode {
        if *cursor_pos > 0 {
            *cursor_pos -= 1;
            let at = byte_index(buffer, *cursor_pos);
            buffer.remove(at);
        }
    }
}

pub fn delete_char(app: &mut AppState) {
    if let AppMode::Editing { buffer, cursor_pos, .. } = &mut app.mode {
        if *cursor_pos < buffer.chars().count() {
            let at = byte_index(buffer, *cursor_pos);
            buffer.remove(at);
        }
    }
}

pub fn move_cursor_left(app: &mut AppState) {
    if let AppMode::Editing { cursor_pos, .. } = &mut app.mode {
        *cursor_pos = cursor_pos.saturating_sub(1);
    }
}

pub fn move_cursor_right(app: &mut AppState) {
    if let AppMode::Editing { buffer, cursor_pos, .. } = &mut app.mode {
        if *cursor_pos < buffer.chars().count() {
            *cursor_pos += 1;
        }
    }
}

pub fn move_cursor_home(app: &mut AppState) {
    if let AppMode::Editing { cursor_pos, .. } = &mut app.mode {
        *cursor_pos = 0;
    }
}

pub fn move_cursor_end(app: &mut AppState) {
    if let AppMode::Editing { buffer, cursor_pos, .. } = &mut app.mode {
        *cursor_pos = buffer.chars().count();
    }
}

/// Renames the focused node to the buffer. A blank buffer leaves the label
/// as it was.
pub fn confirm_edit(app: &mut AppState) {
    let mode = std::mem::replace(&mut app.mode, AppMode::Normal);
    let AppMode::Editing { buffer, naming_new, .. } = mode else {
        return;
    };

    if naming_new {
        if let Some(focused) = app.session.focused().map(str::to_string) {
            app.session.name_new_node(&focused, &buffer);
        }
    } else {
        app.session.handle(Command::Edit(Some(buffer)));
    }
}

pub fn cancel_edit(app: &mut AppState) {
    if matches!(app.mode, AppMode::Editing { .. }) {
        app.mode = AppMode::Normal;
    }
}
