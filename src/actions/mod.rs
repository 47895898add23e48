mod editing;
mod help;
mod history;
mod movement;
mod node;
mod project;

use crate::app::AppState;

// Re-export all public functions from submodules
pub use editing::*;
pub use help::*;
pub use history::*;
pub use movement::*;
pub use node::*;
pub use project::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,

    // Movement
    GoParent,
    GoFirstChild,
    GoPreviousSibling,
    GoNextSibling,
    GoToRoot,
    ClickNode(String),

    // Node manipulation
    AddChild,
    AddSibling,
    DeleteNode,
    MoveNodeUp,
    MoveNodeDown,

    // Editing
    EditNodeAppend,
    EditNodeReplace,
    TypeChar(char),
    Backspace,
    Delete,
    MoveCursorLeft,
    MoveCursorRight,
    MoveCursorHome,
    MoveCursorEnd,
    ConfirmEdit,
    CancelEdit,

    // Undo/Redo
    Undo,
    Redo,

    // Projects
    Reorganize,
    NextProject,
    PreviousProject,

    // Help
    ShowHelp,
    CloseHelp,
}

pub fn execute_action(action: Action, app: &mut AppState) {
    // Keystrokes while editing only touch the buffer; keep the message.
    if !matches!(
        action,
        Action::TypeChar(_)
            | Action::Backspace
            | Action::Delete
            | Action::MoveCursorLeft
            | Action::MoveCursorRight
            | Action::MoveCursorHome
            | Action::MoveCursorEnd
    ) {
        app.clear_message();
    }

    match action {
        Action::Quit => app.running = false,

        // Movement actions
        Action::GoParent => movement::go_parent(app),
        Action::GoFirstChild => movement::go_first_child(app),
        Action::GoPreviousSibling => movement::go_previous_sibling(app),
        Action::GoNextSibling => movement::go_next_sibling(app),
        Action::GoToRoot => movement::go_to_root(app),
        Action::ClickNode(id) => movement::click_node(app, &id),

        // Node manipulation
        Action::AddChild => node::add_child(app),
        Action::AddSibling => node::add_sibling(app),
        Action::DeleteNode => node::delete_node(app),
        Action::MoveNodeUp => node::move_node_up(app),
        Action::MoveNodeDown => node::move_node_down(app),

        // Editing
        Action::EditNodeAppend => editing::start_editing(app, false),
        Action::EditNodeReplace => editing::start_editing(app, true),
        Action::TypeChar(c) => editing::type_char(app, c),
        Action::Backspace => editing::backspace(app),
        Action::Delete => editing::delete_char(app),
        Action::MoveCursorLeft => editing::move_cursor_left(app),
        Action::MoveCursorRight => editing::move_cursor_right(app),
        Action::MoveCursorHome => editing::move_cursor_home(app),
        Action::MoveCursorEnd => editing::move_cursor_end(app),
        Action::ConfirmEdit => editing::confirm_edit(app),
        Action::CancelEdit => editing::cancel_edit(app),

        // Undo/Redo
        Action::Undo => history::undo(app),
        Action::Redo => history::redo(app),

        // Projects
        Action::Reorganize => project::reorganize(app),
        Action::NextProject => project::next_project(app),
        Action::PreviousProject => project::previous_project(app),

        // Help
        Action::ShowHelp => help::show_help(app),
        Action::CloseHelp => help::close_help(app),
    }

    app.sync_notices();
}
