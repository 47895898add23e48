use super::editing::start_editing;
use crate::app::AppState;
use crate::navigation::Command;

pub fn go_parent(app: &mut AppState) {
    app.session.handle(Command::NavigateParent);
}

pub fn go_first_child(app: &mut AppState) {
    app.session.handle(Command::NavigateFirstChild);
}

pub fn go_previous_sibling(app: &mut AppState) {
    app.session.handle(Command::NavigatePreviousSibling);
}

pub fn go_next_sibling(app: &mut AppState) {
    app.session.handle(Command::NavigateNextSibling);
}

pub fn go_to_root(app: &mut AppState) {
    app.session.select_root();
}

/// Focuses a clicked node. Clicking the focused node edits its label.
pub fn click_node(app: &mut AppState, id: &str) {
    if app.session.selection().is_focused(id) {
        start_editing(app, false);
    } else {
        app.session.select(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{create_test_app, focused_topic};
    use crate::actions::{execute_action, Action};

    #[test]
    fn test_walk_the_tree() {
        let (mut app, _dir) = create_test_app();
        execute_action(Action::AddChild, &mut app);
        execute_action(Action::TypeChar('A'), &mut app);
        execute_action(Action::ConfirmEdit, &mut app);
        execute_action(Action::AddSibling, &mut app);
        execute_action(Action::TypeChar('B'), &mut app);
        execute_action(Action::ConfirmEdit, &mut app);

        go_previous_sibling(&mut app);
        assert_eq!(focused_topic(&app), "A");
        go_previous_sibling(&mut app);
        assert_eq!(focused_topic(&app), "A");
        go_next_sibling(&mut app);
        assert_eq!(focused_topic(&app), "B");
        go_parent(&mut app);
        assert_eq!(focused_topic(&app), "Central Topic");
        go_first_child(&mut app);
        assert_eq!(focused_topic(&app), "A");

        go_to_root(&mut app);
        assert_eq!(focused_topic(&app), "Central Topic");
        assert!(!app.session.history().can_redo());
    }

    #[test]
    fn test_click_focuses_then_edits() {
        let (mut app, _dir) = create_test_app();
        let root = app.session.map().root_id().to_string();
        let child = app.session.add_child(&root, Some("Child")).unwrap();

        execute_action(Action::ClickNode(child.clone()), &mut app);
        assert_eq!(app.session.focused(), Some(child.as_str()));
        assert_eq!(app.mode, crate::app::AppMode::Normal);

        execute_action(Action::ClickNode(child), &mut app);
        assert!(matches!(
            &app.mode,
            crate::app::AppMode::Editing { buffer, naming_new: false, .. } if buffer == "Child"
        ));
    }
}
