use crate::model::MindMap;

/// Linear undo/redo history of full tree snapshots.
///
/// `past` holds older states (last = most recent), `future` holds states that
/// were undone away (last = most recently undone).
#[derive(Debug, Clone, Default)]
pub struct History {
    past: Vec<MindMap>,
    future: Vec<MindMap>,
    // 0 keeps every step
    max_steps: usize,
}

impl History {
    pub fn new(max_steps: usize) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            max_steps,
        }
    }

    /// Records `current` as the state to return to, and drops the redo branch.
    pub fn snapshot(&mut self, current: &MindMap) {
        self.record(current.clone());
    }

    /// Like `snapshot`, for a copy the caller already owns.
    pub fn record(&mut self, state: MindMap) {
        self.future.clear();
        self.past.push(state);

        if self.max_steps > 0 && self.past.len() > self.max_steps {
            self.past.remove(0);
        }
    }

    /// Swaps `current` with the most recent past state. Returns false when
    /// there is nothing to undo.
    pub fn undo(&mut self, current: &mut MindMap) -> bool {
        match self.past.pop() {
            Some(previous) => {
                self.future.push(std::mem::replace(current, previous));
                true
            }
            None => false,
        }
    }

    /// Swaps `current` with the most recently undone state. Returns false when
    /// there is nothing to redo.
    pub fn redo(&mut self, current: &mut MindMap) -> bool {
        match self.future.pop() {
            Some(next) => {
                self.past.push(std::mem::replace(current, next));
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    fn map_with_topic(topic: &str) -> MindMap {
        MindMap::new(Node::new("r", topic))
    }

    fn topic(map: &MindMap) -> &str {
        &map.root_node().topic
    }

    fn set_topic(map: &mut MindMap, topic: &str) {
        let root = map.root;
        map.get_mut(root).unwrap().topic = topic.to_string();
    }

    #[test]
    fn test_undo_redo() {
        let mut history = History::new(0);
        let mut current = map_with_topic("Root");

        history.snapshot(&current);
        set_topic(&mut current, "Modified");
        history.snapshot(&current);
        set_topic(&mut current, "Modified2");

        assert!(history.undo(&mut current));
        assert_eq!(topic(&current), "Modified");
        assert!(history.undo(&mut current));
        assert_eq!(topic(&current), "Root");
        assert!(!history.undo(&mut current));
        assert_eq!(topic(&current), "Root");

        assert!(history.redo(&mut current));
        assert_eq!(topic(&current), "Modified");
        assert!(history.redo(&mut current));
        assert_eq!(topic(&current), "Modified2");
        assert!(!history.redo(&mut current));
    }

    #[test]
    fn test_snapshot_clears_future() {
        let mut history = History::new(0);
        let mut current = map_with_topic("Root");

        history.snapshot(&current);
        set_topic(&mut current, "One");
        history.undo(&mut current);
        assert!(history.can_redo());

        history.snapshot(&current);
        set_topic(&mut current, "Two");
        assert!(!history.can_redo());
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_snapshots_are_deep_copies() {
        let mut history = History::new(0);
        let mut current = map_with_topic("Root");

        history.snapshot(&current);
        set_topic(&mut current, "Live edit");

        history.undo(&mut current);
        assert_eq!(topic(&current), "Root");
    }

    #[test]
    fn test_max_steps_drops_oldest() {
        let mut history = History::new(2);
        let mut current = map_with_topic("0");

        for step in 1..=3 {
            history.snapshot(&current);
            set_topic(&mut current, &step.to_string());
        }
        assert_eq!(history.undo_len(), 2);

        history.undo(&mut current);
        history.undo(&mut current);
        assert_eq!(topic(&current), "1");
        assert!(!history.can_undo());
    }

    #[test]
    fn test_clear() {
        let mut history = History::new(0);
        let mut current = map_with_topic("Root");
        history.snapshot(&current);
        history.undo(&mut current);

        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
