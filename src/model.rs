use crate::ids::IdGenerator;
use indextree::{Arena, NodeId as TreeNodeId};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

pub type NodeId = TreeNodeId;

/// Topic used for a project that has never been saved.
pub const DEFAULT_ROOT_ID: &str = "root";
pub const DEFAULT_ROOT_TOPIC: &str = "Central Topic";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub topic: String,
}

impl Node {
    pub fn new(id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
        }
    }
}

/// Nested, serializable form of a tree, as stored by a gateway and exchanged
/// with a reorganizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default, deserialize_with = "nullable_children")]
    pub children: Vec<TopicNode>,
}

fn nullable_children<'de, D>(deserializer: D) -> Result<Vec<TopicNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<TopicNode>>::deserialize(deserializer)?.unwrap_or_default())
}

impl TopicNode {
    pub fn new(id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TopicNode>) -> Self {
        self.children = children;
        self
    }
}

impl Default for TopicNode {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_ID, DEFAULT_ROOT_TOPIC)
    }
}

/// The live tree: nodes live in an arena, `root` is the only parentless node
/// reachable from the map.
#[derive(Debug, Clone)]
pub struct MindMap {
    pub tree: Arena<Node>,
    pub root: NodeId,
}

impl MindMap {
    pub fn new(root: Node) -> Self {
        let mut tree = Arena::new();
        let root = tree.new_node(root);
        Self { tree, root }
    }

    /// Builds a map from its nested form, normalizing what a stored document
    /// may lack: missing topics stay empty, and missing or duplicated ids are
    /// replaced with fresh ones from `ids`.
    pub fn from_document(doc: &TopicNode, ids: &mut IdGenerator) -> Self {
        let mut seen = HashSet::new();
        collect_ids(doc, &mut seen);
        for id in &seen {
            ids.reserve(id);
        }

        let mut used = HashSet::new();
        let root_id = normalized_id(&doc.id, &mut used, ids);
        let mut map = Self::new(Node::new(root_id, doc.topic.clone()));
        let root = map.root;
        for child in &doc.children {
            map.append_document(root, child, &mut used, ids);
        }
        map
    }

    fn append_document(
        &mut self,
        parent: NodeId,
        doc: &TopicNode,
        used: &mut HashSet<String>,
        ids: &mut IdGenerator,
    ) {
        let id = normalized_id(&doc.id, used, ids);
        let node = self.tree.new_node(Node::new(id, doc.topic.clone()));
        parent.append(node, &mut self.tree);
        for child in &doc.children {
            self.append_document(node, child, used, ids);
        }
    }

    pub fn to_document(&self) -> TopicNode {
        self.document_at(self.root)
    }

    fn document_at(&self, node_id: NodeId) -> TopicNode {
        let node = self.tree[node_id].get();
        TopicNode {
            id: node.id.clone(),
            topic: node.topic.clone(),
            children: node_id
                .children(&self.tree)
                .map(|child| self.document_at(child))
                .collect(),
        }
    }

    pub fn root_node(&self) -> &Node {
        self.tree[self.root].get()
    }

    pub fn root_id(&self) -> &str {
        &self.root_node().id
    }

    pub fn get(&self, handle: NodeId) -> Option<&Node> {
        self.tree
            .get(handle)
            .filter(|n| !n.is_removed())
            .map(|n| n.get())
    }

    pub fn get_mut(&mut self, handle: NodeId) -> Option<&mut Node> {
        self.tree
            .get_mut(handle)
            .filter(|n| !n.is_removed())
            .map(|n| n.get_mut())
    }

    /// Pre-order depth-first search from the root; first match wins.
    pub fn find_node(&self, id: &str) -> Option<NodeId> {
        self.root
            .descendants(&self.tree)
            .find(|handle| self.tree[*handle].get().id == id)
    }

    /// The node whose direct children contain `id`. `None` for the root and
    /// for ids that do not resolve.
    pub fn find_parent(&self, id: &str) -> Option<NodeId> {
        self.find_node(id)?.ancestors(&self.tree).nth(1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_node(id).is_some()
    }

    pub fn children(&self, handle: NodeId) -> Vec<NodeId> {
        handle.children(&self.tree).collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.root
            .descendants(&self.tree)
            .map(|handle| self.tree[handle].get().id.clone())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.root.descendants(&self.tree).count()
    }

    pub fn depth(&self) -> usize {
        fn depth_of(map: &MindMap, node: NodeId) -> usize {
            node.children(&map.tree)
                .map(|child| 1 + depth_of(map, child))
                .max()
                .unwrap_or(0)
        }

        depth_of(self, self.root)
    }

    /// Same ids, topics and child order.
    pub fn structurally_eq(&self, other: &MindMap) -> bool {
        self.to_document() == other.to_document()
    }

    /// Tab-free outline, two spaces per level. Used for logging and tests.
    pub fn outline(&self) -> String {
        self.root
            .descendants(&self.tree)
            .map(|handle| {
                let level = handle.ancestors(&self.tree).count() - 1;
                format!("{}{}", "  ".repeat(level), self.tree[handle].get().topic)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for MindMap {
    fn default() -> Self {
        Self::new(Node::new(DEFAULT_ROOT_ID, DEFAULT_ROOT_TOPIC))
    }
}

fn collect_ids(doc: &TopicNode, seen: &mut HashSet<String>) {
    if !doc.id.is_empty() {
        seen.insert(doc.id.clone());
    }
    for child in &doc.children {
        collect_ids(child, seen);
    }
}

fn normalized_id(raw: &str, used: &mut HashSet<String>, ids: &mut IdGenerator) -> String {
    let id = if raw.is_empty() || used.contains(raw) {
        ids.generate()
    } else {
        raw.to_string()
    };
    used.insert(id.clone());
    id
}
