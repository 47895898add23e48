#![allow(dead_code)]

use std::collections::HashMap;
use zenmap_rs::gateway::{GatewayError, SyncGateway};
use zenmap_rs::layout::{LabelMeasurer, LabelSize};
use zenmap_rs::reorganize::{ReorganizeError, Reorganizer};
use zenmap_rs::session::{Session, SessionOptions};
use zenmap_rs::TopicNode;

/// Gateway keeping maps in memory. Records every save so tests can check
/// what was persisted and when.
#[derive(Default)]
pub struct MemoryGateway {
    pub maps: HashMap<String, TopicNode>,
    pub inboxes: HashMap<String, Vec<String>>,
    pub saved: Vec<(String, TopicNode)>,
    pub fail_saves: bool,
    pub fail_loads: bool,
}

impl MemoryGateway {
    pub fn with_map(project: &str, tree: TopicNode) -> Self {
        let mut gateway = Self::default();
        gateway.maps.insert(project.to_string(), tree);
        gateway
    }

    pub fn last_saved(&self) -> Option<&TopicNode> {
        self.saved.last().map(|(_, tree)| tree)
    }
}

impl SyncGateway for MemoryGateway {
    fn save(&mut self, project: &str, tree: &TopicNode) -> Result<(), GatewayError> {
        if self.fail_saves {
            return Err(GatewayError::PermissionDenied(format!("{project}.json")));
        }
        self.saved.push((project.to_string(), tree.clone()));
        self.maps.insert(project.to_string(), tree.clone());
        Ok(())
    }

    fn load(&mut self, project: &str) -> Result<TopicNode, GatewayError> {
        if self.fail_loads {
            return Err(GatewayError::PermissionDenied(format!("{project}.json")));
        }
        Ok(self.maps.get(project).cloned().unwrap_or_default())
    }

    fn projects(&self) -> Result<Vec<String>, GatewayError> {
        let mut projects: Vec<String> = self.maps.keys().cloned().collect();
        projects.sort();
        Ok(projects)
    }

    fn inbox(&self, project: &str) -> Result<Vec<String>, GatewayError> {
        Ok(self.inboxes.get(project).cloned().unwrap_or_default())
    }

    fn clear_inbox(&mut self, project: &str) -> Result<(), GatewayError> {
        self.inboxes.remove(project);
        Ok(())
    }
}

/// Reorganizer that files every idea as a new child of the root, or fails
/// with the given message.
pub struct StubReorganizer {
    pub fail_with: Option<String>,
    pub calls: usize,
}

impl StubReorganizer {
    pub fn appending() -> Self {
        Self {
            fail_with: None,
            calls: 0,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            calls: 0,
        }
    }
}

impl Reorganizer for StubReorganizer {
    fn transform(
        &mut self,
        tree: &TopicNode,
        ideas: &[String],
    ) -> Result<TopicNode, ReorganizeError> {
        self.calls += 1;
        if let Some(message) = &self.fail_with {
            return Err(ReorganizeError::Failed {
                status: "exit status: 1".to_string(),
                stderr: message.clone(),
            });
        }
        let mut result = tree.clone();
        for idea in ideas {
            result.children.push(TopicNode::new("", idea.clone()));
        }
        Ok(result)
    }
}

/// One unit per char and one row per label.
pub struct CharMeasurer;

impl LabelMeasurer for CharMeasurer {
    fn measure(&self, text: &str) -> LabelSize {
        LabelSize {
            width: text.chars().count() as f64,
            height: 1.0,
        }
    }
}

/// `Root -> [A -> [A1, A2], B -> [B1]]`
pub fn sample_tree() -> TopicNode {
    TopicNode::new("root", "Root").with_children(vec![
        TopicNode::new("a", "A").with_children(vec![
            TopicNode::new("a1", "A1"),
            TopicNode::new("a2", "A2"),
        ]),
        TopicNode::new("b", "B").with_children(vec![TopicNode::new("b1", "B1")]),
    ])
}

pub fn open_session(project: &str, tree: TopicNode) -> Session<MemoryGateway> {
    let gateway = MemoryGateway::with_map(project, tree);
    Session::open(gateway, SessionOptions::default(), project).unwrap()
}
