use crate::edit::{self, EditError, DEFAULT_LABEL};
use crate::gateway::{GatewayError, SyncGateway};
use crate::history::History;
use crate::ids::IdGenerator;
use crate::model::{MindMap, TopicNode};
use crate::navigation::{self, Command, Direction, Selection};
use crate::reorganize::{ReorganizeError, Reorganizer};
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Label for nodes created by `AddChild` / `AddSibling`.
    pub default_label: String,
    /// Oldest undo steps are dropped past this count; 0 keeps everything.
    pub max_undo_steps: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            default_label: DEFAULT_LABEL.to_string(),
            max_undo_steps: 0,
        }
    }
}

/// User-facing outcome of an external call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SaveFailed(String),
    LoadFailed(String),
    ReorganizeFailed(String),
    NothingToOrganize,
    Reorganized,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SaveFailed(e) => write!(f, "Save failed: {e}"),
            Notice::LoadFailed(e) => write!(f, "Load failed: {e}"),
            Notice::ReorganizeFailed(e) => write!(f, "Reorganize failed: {e}"),
            Notice::NothingToOrganize => write!(f, "Nothing to organize"),
            Notice::Reorganized => write!(f, "Map reorganized"),
        }
    }
}

/// A reorganization in flight: the tree and ideas handed to the reorganizer,
/// and the project they belong to.
#[derive(Debug, Clone)]
pub struct ReorganizeRequest {
    project: Option<String>,
    pub tree: TopicNode,
    pub ideas: Vec<String>,
}

/// One editing session: the live tree of the current project, its history,
/// the focused node and the gateway that persists every committed change.
///
/// Rejected edits (unknown ids, deleting the root, blank labels) leave the
/// tree and the history untouched and report nothing to the user.
pub struct Session<G: SyncGateway> {
    project: Option<String>,
    map: MindMap,
    history: History,
    selection: Selection,
    ids: IdGenerator,
    gateway: G,
    options: SessionOptions,
    notices: VecDeque<Notice>,
}

impl<G: SyncGateway> Session<G> {
    /// A session on the default tree, not bound to any project.
    pub fn new(gateway: G, options: SessionOptions) -> Self {
        let mut ids = IdGenerator::new();
        let map = MindMap::default();
        ids.reserve(map.root_id());

        Self {
            project: None,
            map,
            history: History::new(options.max_undo_steps),
            selection: Selection::Unfocused,
            ids,
            gateway,
            options,
            notices: VecDeque::new(),
        }
    }

    pub fn open(gateway: G, options: SessionOptions, project: &str) -> Result<Self, GatewayError> {
        let mut session = Self::new(gateway, options);
        session.switch_project(project)?;
        Ok(session)
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn map(&self) -> &MindMap {
        &self.map
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn focused(&self) -> Option<&str> {
        self.selection.focused()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    /// Focuses `id` if it exists in the current tree.
    pub fn select(&mut self, id: &str) -> bool {
        if self.map.contains(id) {
            self.selection = Selection::Focused(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn select_root(&mut self) {
        self.selection = Selection::Focused(self.map.root_id().to_string());
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::Unfocused;
    }

    pub fn add_child(&mut self, parent_id: &str, label: Option<&str>) -> Option<String> {
        let label = label.unwrap_or(self.options.default_label.as_str()).to_string();
        self.commit(|map, ids| edit::add_child(map, ids, parent_id, &label))
    }

    pub fn add_sibling(&mut self, node_id: &str, label: Option<&str>) -> Option<String> {
        let label = label.unwrap_or(self.options.default_label.as_str()).to_string();
        self.commit(|map, ids| edit::add_sibling(map, ids, node_id, &label))
    }

    pub fn rename(&mut self, node_id: &str, label: Option<&str>) -> bool {
        self.commit(|map, _| edit::rename(map, node_id, label)).is_some()
    }

    /// Labels a node the latest committed step just added, folding the rename
    /// into that step so a single undo removes the node outright.
    pub fn name_new_node(&mut self, node_id: &str, label: &str) -> bool {
        match edit::rename(&mut self.map, node_id, Some(label)) {
            Ok(()) => {
                self.persist();
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "naming rejected");
                false
            }
        }
    }

    /// Deletes `node_id` with its subtree. A focused node that disappears
    /// hands focus to its nearest surviving ancestor.
    pub fn delete(&mut self, node_id: &str) -> bool {
        let before = self.map.clone();
        if self.commit(|map, _| edit::delete_node(map, node_id)).is_none() {
            return false;
        }

        if let Some(focused) = self.selection.focused() {
            if !self.map.contains(focused) {
                self.selection = navigation::nearest_surviving_ancestor(&before, &self.map, focused)
                    .map(Selection::Focused)
                    .unwrap_or_default();
            }
        }
        true
    }

    pub fn move_up(&mut self, node_id: &str) -> bool {
        self.commit(|map, _| edit::move_up(map, node_id)).is_some()
    }

    pub fn move_down(&mut self, node_id: &str) -> bool {
        self.commit(|map, _| edit::move_down(map, node_id)).is_some()
    }

    /// Applies a command to the focused node. Returns whether anything
    /// changed; every command is a no-op while nothing is focused.
    pub fn handle(&mut self, command: Command) -> bool {
        let Some(focused) = self.selection.focused().map(str::to_string) else {
            tracing::debug!(?command, "ignored command without focus");
            return false;
        };

        match command {
            Command::AddChild => self.add_child(&focused, None).map(|id| self.focus(id)).is_some(),
            Command::AddSibling => self
                .add_sibling(&focused, None)
                .map(|id| self.focus(id))
                .is_some(),
            Command::Delete => self.delete(&focused),
            Command::Edit(text) => self.rename(&focused, text.as_deref()),
            Command::MoveUp => self.move_up(&focused),
            Command::MoveDown => self.move_down(&focused),
            Command::NavigateParent => self.navigate(&focused, Direction::Parent),
            Command::NavigateFirstChild => self.navigate(&focused, Direction::FirstChild),
            Command::NavigatePreviousSibling => {
                self.navigate(&focused, Direction::PreviousSibling)
            }
            Command::NavigateNextSibling => self.navigate(&focused, Direction::NextSibling),
        }
    }

    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.map) {
            return false;
        }
        self.after_restore();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.map) {
            return false;
        }
        self.after_restore();
        true
    }

    /// Loads `project` through the gateway and makes it the live tree. On
    /// failure the current project stays as it was.
    pub fn switch_project(&mut self, project: &str) -> Result<(), GatewayError> {
        let doc = match self.gateway.load(project) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(project, error = %e, "failed to load project");
                self.notices.push_back(Notice::LoadFailed(e.to_string()));
                return Err(e);
            }
        };

        self.map = MindMap::from_document(&doc, &mut self.ids);
        self.history.clear();
        self.selection = Selection::Unfocused;
        self.project = Some(project.to_string());
        tracing::info!(project, nodes = self.map.node_count(), "switched project");
        Ok(())
    }

    /// Hands the tree and the project's pending ideas to `reorganizer` and
    /// replaces the tree with its answer, as one undoable step.
    pub fn reorganize(&mut self, reorganizer: &mut dyn Reorganizer) -> bool {
        let Some(request) = self.begin_reorganize() else {
            return false;
        };
        let result = reorganizer.transform(&request.tree, &request.ideas);
        self.finish_reorganize(&request, result)
    }

    /// First half of a reorganization: snapshots the tree together with the
    /// project's inbox. `None` (with a notice) when there is nothing to file.
    pub fn begin_reorganize(&mut self) -> Option<ReorganizeRequest> {
        let ideas = match self.project.as_deref() {
            Some(project) => match self.gateway.inbox(project) {
                Ok(ideas) => ideas,
                Err(e) => {
                    tracing::warn!(project, error = %e, "failed to read inbox");
                    self.notices.push_back(Notice::ReorganizeFailed(e.to_string()));
                    return None;
                }
            },
            None => Vec::new(),
        };
        if ideas.is_empty() {
            self.notices.push_back(Notice::NothingToOrganize);
            return None;
        }

        Some(ReorganizeRequest {
            project: self.project.clone(),
            tree: self.map.to_document(),
            ideas,
        })
    }

    /// Second half: applies the reorganizer's answer to `request`. The new
    /// tree replaces whatever is live, edits made in the meantime included,
    /// and the replaced tree becomes the undo step. Answers for a project
    /// that is no longer open are dropped.
    pub fn finish_reorganize(
        &mut self,
        request: &ReorganizeRequest,
        result: Result<TopicNode, ReorganizeError>,
    ) -> bool {
        if request.project != self.project {
            tracing::info!(
                project = ?request.project,
                "dropped reorganization for closed project"
            );
            self.notices.push_back(Notice::ReorganizeFailed(
                "project changed while reorganizing".to_string(),
            ));
            return false;
        }

        let proposed = match result {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "reorganize failed");
                self.notices.push_back(Notice::ReorganizeFailed(e.to_string()));
                return false;
            }
        };

        let replacement = MindMap::from_document(&proposed, &mut self.ids);
        let previous = std::mem::replace(&mut self.map, replacement);
        self.history.record(previous);
        self.reconcile_selection();
        self.persist();

        if let Some(project) = self.project.clone() {
            if let Err(e) = self.gateway.clear_inbox(&project) {
                tracing::warn!(project, error = %e, "failed to clear inbox");
                self.notices.push_back(Notice::SaveFailed(e.to_string()));
            }
        }
        tracing::info!(
            ideas = request.ideas.len(),
            nodes = self.map.node_count(),
            "map reorganized"
        );
        self.notices.push_back(Notice::Reorganized);
        true
    }

    /// Runs an edit against the live tree. On success the pre-edit tree
    /// becomes one undo step and the new tree is saved; a rejected edit
    /// leaves no trace.
    fn commit<T>(
        &mut self,
        op: impl FnOnce(&mut MindMap, &mut IdGenerator) -> Result<T, EditError>,
    ) -> Option<T> {
        let before = self.map.clone();
        match op(&mut self.map, &mut self.ids) {
            Ok(value) => {
                self.history.record(before);
                self.persist();
                Some(value)
            }
            Err(e) => {
                tracing::debug!(error = %e, "edit rejected");
                None
            }
        }
    }

    fn focus(&mut self, id: String) {
        self.selection = Selection::Focused(id);
    }

    fn navigate(&mut self, from: &str, direction: Direction) -> bool {
        match navigation::navigate(&self.map, from, direction) {
            Some(target) => {
                self.focus(target);
                true
            }
            None => false,
        }
    }

    fn after_restore(&mut self) {
        self.reconcile_selection();
        self.persist();
    }

    /// A focused id missing from the current tree falls back to the root.
    fn reconcile_selection(&mut self) {
        if let Some(focused) = self.selection.focused() {
            if !self.map.contains(focused) {
                self.select_root();
            }
        }
    }

    fn persist(&mut self) {
        let Some(project) = self.project.as_deref() else {
            return;
        };
        if let Err(e) = self.gateway.save(project, &self.map.to_document()) {
            tracing::warn!(project, error = %e, "failed to save map");
            self.notices.push_back(Notice::SaveFailed(e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryGateway {
        maps: HashMap<String, TopicNode>,
        inbox: Vec<String>,
        saves: usize,
        fail_saves: bool,
    }

    impl SyncGateway for MemoryGateway {
        fn save(&mut self, project: &str, tree: &TopicNode) -> Result<(), GatewayError> {
            if self.fail_saves {
                return Err(GatewayError::PermissionDenied(project.to_string()));
            }
            self.saves += 1;
            self.maps.insert(project.to_string(), tree.clone());
            Ok(())
        }

        fn load(&mut self, project: &str) -> Result<TopicNode, GatewayError> {
            Ok(self.maps.get(project).cloned().unwrap_or_default())
        }

        fn inbox(&self, _project: &str) -> Result<Vec<String>, GatewayError> {
            Ok(self.inbox.clone())
        }

        fn clear_inbox(&mut self, _project: &str) -> Result<(), GatewayError> {
            self.inbox.clear();
            Ok(())
        }
    }

    struct Fixed(Result<TopicNode, String>);

    impl Reorganizer for Fixed {
        fn transform(
            &mut self,
            _tree: &TopicNode,
            _ideas: &[String],
        ) -> Result<TopicNode, ReorganizeError> {
            self.0.clone().map_err(|stderr| ReorganizeError::Failed {
                status: "exit status: 1".to_string(),
                stderr,
            })
        }
    }

    fn session_with(doc: TopicNode) -> Session<MemoryGateway> {
        let mut gateway = MemoryGateway::default();
        gateway.maps.insert("p".to_string(), doc);
        Session::open(gateway, SessionOptions::default(), "p").unwrap()
    }

    fn abc() -> TopicNode {
        TopicNode::new("root", "Root").with_children(vec![TopicNode::new("a", "A")
            .with_children(vec![TopicNode::new("b", "B"), TopicNode::new("c", "C")])])
    }

    #[test]
    fn test_add_child_then_undo_redo_keeps_id() {
        let mut session = session_with(TopicNode::new("r", "Root"));
        session.select("r");

        assert!(session.handle(Command::AddChild));
        let new_id = session.focused().unwrap().to_string();
        let root = session.map().root;
        assert_eq!(session.map().children(root).len(), 1);

        assert!(session.undo());
        assert_eq!(session.map().children(root).len(), 0);
        assert_eq!(session.focused(), Some("r"));

        assert!(session.redo());
        assert_eq!(session.map().ids(), ["r".to_string(), new_id]);
    }

    #[test]
    fn test_rejected_edits_push_no_history() {
        let mut session = session_with(abc());
        session.select("root");

        assert!(!session.handle(Command::Delete));
        assert!(!session.handle(Command::Edit(None)));
        assert!(!session.handle(Command::Edit(Some("  ".to_string()))));
        assert!(session.add_child("missing", None).is_none());

        assert!(!session.history().can_undo());
        assert_eq!(session.gateway().saves, 0);
        assert_eq!(session.focused(), Some("root"));
    }

    #[test]
    fn test_delete_focuses_parent() {
        let mut session = session_with(abc());
        session.select("b");

        assert!(session.handle(Command::Delete));
        assert_eq!(session.focused(), Some("a"));
        assert_eq!(session.map().outline(), "Root\n  A\n    C");
    }

    #[test]
    fn test_deleting_ancestor_of_focus_repairs_selection() {
        let mut session = session_with(abc());
        session.select("c");

        assert!(session.delete("a"));
        assert_eq!(session.focused(), Some("root"));
    }

    #[test]
    fn test_navigation_does_not_touch_history() {
        let mut session = session_with(abc());
        session.select("b");

        assert!(session.handle(Command::NavigateNextSibling));
        assert_eq!(session.focused(), Some("c"));
        assert!(!session.handle(Command::NavigateNextSibling));
        assert_eq!(session.focused(), Some("c"));
        assert!(session.handle(Command::NavigateParent));
        assert!(session.handle(Command::NavigateFirstChild));
        assert_eq!(session.focused(), Some("b"));

        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_unfocused_commands_are_ignored() {
        let mut session = session_with(abc());
        assert!(!session.handle(Command::AddChild));
        assert_eq!(session.map().node_count(), 4);
    }

    #[test]
    fn test_every_commit_is_saved() {
        let mut session = session_with(abc());
        session.select("a");

        session.handle(Command::AddChild);
        session.handle(Command::Edit(Some("Named".to_string())));
        session.undo();
        session.redo();

        assert_eq!(session.gateway().saves, 4);
        let stored = &session.gateway().maps["p"];
        assert_eq!(stored, &session.map().to_document());
    }

    #[test]
    fn test_save_failure_keeps_the_edit() {
        let mut session = session_with(abc());
        session.gateway_mut().fail_saves = true;
        session.select("a");

        assert!(session.handle(Command::Edit(Some("Kept".to_string()))));
        let a = session.map().find_node("a").unwrap();
        assert_eq!(session.map().get(a).unwrap().topic, "Kept");
        assert!(matches!(session.take_notice(), Some(Notice::SaveFailed(_))));
        assert!(session.history().can_undo());
    }

    #[test]
    fn test_redo_also_repairs_selection() {
        let mut session = session_with(abc());
        session.select("b");
        session.handle(Command::Delete);
        session.undo();
        session.select("b");

        session.redo();
        assert_eq!(session.focused(), Some("root"));
    }

    #[test]
    fn test_switch_project_clears_history_and_focus() {
        let mut session = session_with(abc());
        session.select("a");
        session.handle(Command::AddChild);

        session.switch_project("other").unwrap();
        assert_eq!(session.project(), Some("other"));
        assert!(!session.history().can_undo());
        assert_eq!(session.focused(), None);
        assert_eq!(session.map().root_node().topic, "Central Topic");
    }

    #[test]
    fn test_reorganize_with_empty_inbox() {
        let mut session = session_with(abc());
        let mut reorganizer = Fixed(Ok(TopicNode::new("root", "Other")));

        assert!(!session.reorganize(&mut reorganizer));
        assert_eq!(session.take_notice(), Some(Notice::NothingToOrganize));
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_reorganize_replaces_tree_undoably() {
        let mut session = session_with(abc());
        session.gateway_mut().inbox = vec!["idea".to_string()];
        session.select("c");
        let mut reorganizer = Fixed(Ok(TopicNode::new("root", "Root")
            .with_children(vec![TopicNode::new("a", "A"), TopicNode::new("i", "idea")])));

        assert!(session.reorganize(&mut reorganizer));
        assert_eq!(session.map().outline(), "Root\n  A\n  idea");
        assert_eq!(session.focused(), Some("root"));
        assert!(session.gateway().inbox.is_empty());
        assert_eq!(session.take_notice(), Some(Notice::Reorganized));

        assert!(session.undo());
        assert_eq!(session.map().outline(), "Root\n  A\n    B\n    C");
    }

    #[test]
    fn test_reorganize_failure_leaves_tree() {
        let mut session = session_with(abc());
        session.gateway_mut().inbox = vec!["idea".to_string()];
        let mut reorganizer = Fixed(Err("model offline".to_string()));

        assert!(!session.reorganize(&mut reorganizer));
        assert!(matches!(
            session.take_notice(),
            Some(Notice::ReorganizeFailed(_))
        ));
        assert_eq!(session.map().node_count(), 4);
        assert_eq!(session.gateway().inbox, ["idea"]);
    }

    #[test]
    fn test_naming_a_new_node_shares_its_undo_step() {
        let mut session = session_with(abc());
        session.select("a");

        assert!(session.handle(Command::AddChild));
        let added = session.focused().unwrap().to_string();
        assert!(session.name_new_node(&added, "Named"));
        assert_eq!(session.history().undo_len(), 1);
        assert_eq!(session.gateway().saves, 2);

        assert!(session.undo());
        assert!(!session.map().contains(&added));
        assert!(session.redo());
        assert!(session.map().outline().contains("Named"));
    }

    #[test]
    fn test_split_reorganize_replaces_later_edits_undoably() {
        let mut session = session_with(abc());
        session.gateway_mut().inbox = vec!["idea".to_string()];
        session.select("b");

        let request = session.begin_reorganize().unwrap();
        assert_eq!(request.ideas, ["idea"]);
        assert!(session.handle(Command::Edit(Some("Edited".to_string()))));

        let answer = request.tree.clone();
        assert!(session.finish_reorganize(&request, Ok(answer)));
        assert!(!session.map().outline().contains("Edited"));

        assert!(session.undo());
        assert!(session.map().outline().contains("Edited"));
    }

    #[test]
    fn test_reorganize_answer_for_closed_project_is_dropped() {
        let mut session = session_with(abc());
        session.gateway_mut().inbox = vec!["idea".to_string()];
        let request = session.begin_reorganize().unwrap();

        session.switch_project("q").unwrap();
        let answer = Ok(TopicNode::new("root", "Elsewhere"));
        assert!(!session.finish_reorganize(&request, answer));
        assert!(matches!(
            session.take_notice(),
            Some(Notice::ReorganizeFailed(_))
        ));
        assert_eq!(session.map().root_node().topic, "Central Topic");
        assert_eq!(session.gateway().inbox, ["idea"]);
    }
}
