use crate::model::MindMap;

/// The single focused node, held by id and resolved by lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unfocused,
    Focused(String),
}

impl Selection {
    pub fn focused(&self) -> Option<&str> {
        match self {
            Selection::Focused(id) => Some(id),
            Selection::Unfocused => None,
        }
    }

    pub fn is_focused(&self, id: &str) -> bool {
        self.focused() == Some(id)
    }
}

/// Discrete input events against the focused node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddChild,
    AddSibling,
    Delete,
    /// New label obtained out-of-band; `None` when the edit was cancelled.
    Edit(Option<String>),
    MoveUp,
    MoveDown,
    NavigateParent,
    NavigateFirstChild,
    NavigatePreviousSibling,
    NavigateNextSibling,
}

impl Command {
    /// Whether the command changes the tree (and therefore goes through
    /// history).
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Command::NavigateParent
                | Command::NavigateFirstChild
                | Command::NavigatePreviousSibling
                | Command::NavigateNextSibling
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Parent,
    FirstChild,
    PreviousSibling,
    NextSibling,
}

/// Where focus moves from `id`, or `None` when the move is a no-op.
pub fn navigate(map: &MindMap, id: &str, direction: Direction) -> Option<String> {
    let handle = map.find_node(id)?;
    let target = match direction {
        Direction::Parent => handle.ancestors(&map.tree).nth(1),
        Direction::FirstChild => handle.children(&map.tree).next(),
        Direction::PreviousSibling => {
            handle.ancestors(&map.tree).nth(1)?;
            handle.preceding_siblings(&map.tree).nth(1)
        }
        Direction::NextSibling => {
            handle.ancestors(&map.tree).nth(1)?;
            handle.following_siblings(&map.tree).nth(1)
        }
    }?;
    map.get(target).map(|node| node.id.clone())
}

/// Walks up from the position `id` had in `before` and returns the first
/// ancestor that still exists in `after`.
pub fn nearest_surviving_ancestor(before: &MindMap, after: &MindMap, id: &str) -> Option<String> {
    let handle = before.find_node(id)?;
    handle
        .ancestors(&before.tree)
        .filter_map(|ancestor| before.get(ancestor))
        .map(|node| node.id.as_str())
        .find(|ancestor_id| after.contains(ancestor_id))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdGenerator;
    use crate::model::TopicNode;

    fn sample() -> MindMap {
        let doc = TopicNode::new("r", "Root").with_children(vec![TopicNode::new("a", "A")
            .with_children(vec![TopicNode::new("b", "B"), TopicNode::new("c", "C")])]);
        MindMap::from_document(&doc, &mut IdGenerator::new())
    }

    #[test]
    fn test_navigate_parent_and_child() {
        let map = sample();
        assert_eq!(navigate(&map, "b", Direction::Parent).as_deref(), Some("a"));
        assert_eq!(navigate(&map, "r", Direction::Parent), None);
        assert_eq!(navigate(&map, "a", Direction::FirstChild).as_deref(), Some("b"));
        assert_eq!(navigate(&map, "c", Direction::FirstChild), None);
    }

    #[test]
    fn test_navigate_siblings() {
        let map = sample();
        assert_eq!(navigate(&map, "b", Direction::NextSibling).as_deref(), Some("c"));
        assert_eq!(navigate(&map, "c", Direction::NextSibling), None);
        assert_eq!(navigate(&map, "c", Direction::PreviousSibling).as_deref(), Some("b"));
        assert_eq!(navigate(&map, "b", Direction::PreviousSibling), None);
        assert_eq!(navigate(&map, "r", Direction::NextSibling), None);
    }

    #[test]
    fn test_navigate_unknown_id() {
        assert_eq!(navigate(&sample(), "zzz", Direction::Parent), None);
    }

    #[test]
    fn test_nearest_surviving_ancestor() {
        let before = sample();
        let mut after = before.clone();
        crate::edit::delete_node(&mut after, "a").unwrap();

        assert_eq!(
            nearest_surviving_ancestor(&before, &after, "b").as_deref(),
            Some("r")
        );
        assert_eq!(
            nearest_surviving_ancestor(&before, &after, "r").as_deref(),
            Some("r")
        );
    }

    #[test]
    fn test_selection_accessors() {
        let selection = Selection::Focused("a".to_string());
        assert_eq!(selection.focused(), Some("a"));
        assert!(selection.is_focused("a"));
        assert!(!Selection::Unfocused.is_focused("a"));
    }
}
