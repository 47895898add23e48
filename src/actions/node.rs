use crate::app::AppState;
use crate::navigation::Command;

use super::editing::start_naming_new;

/// New nodes open straight into the editor with an empty buffer; cancelling
/// keeps the default label. Adding and naming undo as one step.
pub fn add_child(app: &mut AppState) {
    if app.session.handle(Command::AddChild) {
        start_naming_new(app);
    }
}

pub fn add_sibling(app: &mut AppState) {
    if app.session.handle(Command::AddSibling) {
        start_naming_new(app);
    }
}

pub fn delete_node(app: &mut AppState) {
    let is_root = app.session.focused() == Some(app.session.map().root_id());
    if is_root {
        app.set_message("Cannot delete root node");
        return;
    }
    app.session.handle(Command::Delete);
}

pub fn move_node_up(app: &mut AppState) {
    app.session.handle(Command::MoveUp);
}

pub fn move_node_down(app: &mut AppState) {
    app.session.handle(Command::MoveDown);
}
