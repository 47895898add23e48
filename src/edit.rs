use crate::ids::IdGenerator;
use crate::model::{MindMap, Node};
use thiserror::Error;

/// Label given to nodes created without an explicit one.
pub const DEFAULT_LABEL: &str = "New";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Node with ID {0} not found")]
    NodeNotFound(String),
    #[error("Attempted to operate on root node inappropriately")]
    RootNodeOperation,
    #[error("Label is empty or the edit was cancelled")]
    EmptyLabel,
    #[error("Label of node {0} is unchanged")]
    Unchanged(String),
    #[error("Node {0} is already at the edge of its siblings")]
    AtBoundary(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    Sibling,
    Child,
}

/// Appends a new node relative to `target_id` and returns the new id.
///
/// A sibling of the root cannot exist, so `Sibling` on the root inserts a
/// child instead.
pub fn insert_node(
    map: &mut MindMap,
    ids: &mut IdGenerator,
    target_id: &str,
    mode: InsertMode,
    label: &str,
) -> Result<String, EditError> {
    let target = map
        .find_node(target_id)
        .ok_or_else(|| EditError::NodeNotFound(target_id.to_string()))?;

    let parent = match mode {
        InsertMode::Child => target,
        InsertMode::Sibling => target.ancestors(&map.tree).nth(1).unwrap_or(target),
    };

    let new_id = ids.generate();
    let new_node = map.tree.new_node(Node::new(new_id.clone(), label));
    parent.append(new_node, &mut map.tree);
    Ok(new_id)
}

pub fn add_child(
    map: &mut MindMap,
    ids: &mut IdGenerator,
    parent_id: &str,
    label: &str,
) -> Result<String, EditError> {
    insert_node(map, ids, parent_id, InsertMode::Child, label)
}

pub fn add_sibling(
    map: &mut MindMap,
    ids: &mut IdGenerator,
    node_id: &str,
    label: &str,
) -> Result<String, EditError> {
    insert_node(map, ids, node_id, InsertMode::Sibling, label)
}

/// Replaces the topic of `node_id`. `None` is a cancelled edit.
pub fn rename(map: &mut MindMap, node_id: &str, new_label: Option<&str>) -> Result<(), EditError> {
    let label = new_label
        .filter(|l| !l.trim().is_empty())
        .ok_or(EditError::EmptyLabel)?;
    let handle = map
        .find_node(node_id)
        .ok_or_else(|| EditError::NodeNotFound(node_id.to_string()))?;
    let node = map
        .get_mut(handle)
        .ok_or_else(|| EditError::NodeNotFound(node_id.to_string()))?;

    if node.topic == label {
        return Err(EditError::Unchanged(node_id.to_string()));
    }
    node.topic = label.to_string();
    Ok(())
}

/// Removes `node_id` and its subtree. Returns the id of the former parent.
pub fn delete_node(map: &mut MindMap, node_id: &str) -> Result<String, EditError> {
    let handle = map
        .find_node(node_id)
        .ok_or_else(|| EditError::NodeNotFound(node_id.to_string()))?;
    let parent = handle
        .ancestors(&map.tree)
        .nth(1)
        .ok_or(EditError::RootNodeOperation)?;
    let parent_id = map.tree[parent].get().id.clone();

    handle.remove_subtree(&mut map.tree);
    Ok(parent_id)
}

/// Swaps `node_id` with its previous sibling.
pub fn move_up(map: &mut MindMap, node_id: &str) -> Result<(), EditError> {
    let handle = map
        .find_node(node_id)
        .ok_or_else(|| EditError::NodeNotFound(node_id.to_string()))?;
    if handle == map.root {
        return Err(EditError::RootNodeOperation);
    }
    let prev = handle
        .preceding_siblings(&map.tree)
        .nth(1)
        .ok_or_else(|| EditError::AtBoundary(node_id.to_string()))?;

    prev.insert_before(handle, &mut map.tree);
    Ok(())
}

/// Swaps `node_id` with its next sibling.
pub fn move_down(map: &mut MindMap, node_id: &str) -> Result<(), EditError> {
    let handle = map
        .find_node(node_id)
        .ok_or_else(|| EditError::NodeNotFound(node_id.to_string()))?;
    if handle == map.root {
        return Err(EditError::RootNodeOperation);
    }
    let next = handle
        .following_siblings(&map.tree)
        .nth(1)
        .ok_or_else(|| EditError::AtBoundary(node_id.to_string()))?;

    next.insert_after(handle, &mut map.tree);
    Ok(())
}
