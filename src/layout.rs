use crate::model::{MindMap, NodeId};
use std::collections::BTreeMap;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSize {
    pub width: f64,
    pub height: f64,
}

/// Measures how much room a label needs in the target surface's units.
pub trait LabelMeasurer {
    fn measure(&self, text: &str) -> LabelSize;
}

/// Terminal cells: display width of the widest line, one row per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeMeasurer;

impl LabelMeasurer for UnicodeMeasurer {
    fn measure(&self, text: &str) -> LabelSize {
        let width = text.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
        let height = text.lines().count().max(1);
        LabelSize {
            width: width as f64,
            height: height as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Breadth gap between adjacent leaves sharing a parent.
    pub sibling_separation: f64,
    /// Breadth gap between adjacent leaves with different parents.
    pub cousin_separation: f64,
    pub horizontal_padding: f64,
    pub vertical_padding: f64,
    /// Viewport width kept free past the deepest level for its labels.
    pub reserved_width: f64,
    pub reserved_height: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            sibling_separation: 1.5,
            cousin_separation: 2.0,
            horizontal_padding: 2.0,
            vertical_padding: 0.0,
            reserved_width: 20.0,
            reserved_height: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A node's box. `(x, y)` is its anchor: the left edge, vertically centred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeBox {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Connector from the right edge of `parent` to the anchor of `child`.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub parent: String,
    pub child: String,
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapLayout {
    pub nodes: BTreeMap<String, NodeBox>,
    /// Parent-child pairs in pre-order.
    pub edges: Vec<Edge>,
}

impl MapLayout {
    pub fn node(&self, id: &str) -> Option<&NodeBox> {
        self.nodes.get(id)
    }
}

/// Breadth slot of every node before scaling, in pre-order.
struct Slots {
    order: Vec<(NodeId, usize, f64)>,
    first_leaf: Option<NodeId>,
    last_leaf: Option<(NodeId, f64)>,
    max_depth: usize,
}

impl Slots {
    fn compute(map: &MindMap, options: &LayoutOptions) -> Self {
        let mut slots = Slots {
            order: Vec::new(),
            first_leaf: None,
            last_leaf: None,
            max_depth: 0,
        };
        slots.place(map, options, map.root, 0);
        slots
    }

    fn place(&mut self, map: &MindMap, options: &LayoutOptions, node: NodeId, depth: usize) -> f64 {
        self.max_depth = self.max_depth.max(depth);
        let index = self.order.len();
        self.order.push((node, depth, 0.0));

        let children = map.children(node);
        let slot = if children.is_empty() {
            let slot = match self.last_leaf {
                Some((previous, previous_slot)) => {
                    previous_slot + separation(map, options, previous, node)
                }
                None => 0.0,
            };
            self.first_leaf.get_or_insert(node);
            self.last_leaf = Some((node, slot));
            slot
        } else {
            let mut first = 0.0;
            let mut last = 0.0;
            for (i, child) in children.iter().enumerate() {
                let child_slot = self.place(map, options, *child, depth + 1);
                if i == 0 {
                    first = child_slot;
                }
                last = child_slot;
            }
            (first + last) / 2.0
        };

        self.order[index].2 = slot;
        slot
    }

    /// Offset and total span used to scale slots into the viewport, the way
    /// a tidy tree leaves half a separation of margin at both ends.
    fn span(&self, map: &MindMap, options: &LayoutOptions) -> (f64, f64) {
        match (self.first_leaf, self.last_leaf) {
            (Some(left), Some((right, right_slot))) => {
                let margin = if left == right {
                    1.0
                } else {
                    separation(map, options, left, right) / 2.0
                };
                (margin, right_slot + 2.0 * margin)
            }
            _ => (1.0, 2.0),
        }
    }
}

fn separation(map: &MindMap, options: &LayoutOptions, a: NodeId, b: NodeId) -> f64 {
    let parent_a = a.ancestors(&map.tree).nth(1);
    let parent_b = b.ancestors(&map.tree).nth(1);
    if parent_a == parent_b {
        options.sibling_separation
    } else {
        options.cousin_separation
    }
}

/// Lays the tree out left to right: depth runs along x, siblings stack along
/// y. Pure and deterministic for a given tree, viewport and measurer.
pub fn layout(
    map: &MindMap,
    viewport_width: f64,
    viewport_height: f64,
    measurer: &dyn LabelMeasurer,
    options: &LayoutOptions,
) -> MapLayout {
    let slots = Slots::compute(map, options);
    let (offset, span) = slots.span(map, options);

    let breadth = (viewport_height - options.reserved_height).max(0.0);
    let depth_extent = (viewport_width - options.reserved_width).max(0.0);
    let scale = breadth / span;
    let level = if slots.max_depth == 0 {
        0.0
    } else {
        depth_extent / slots.max_depth as f64
    };

    let mut result = MapLayout::default();
    for (handle, depth, slot) in &slots.order {
        let Some(node) = map.get(*handle) else {
            continue;
        };
        let size = measurer.measure(&node.topic);
        result.nodes.insert(
            node.id.clone(),
            NodeBox {
                x: *depth as f64 * level,
                y: (slot + offset) * scale,
                width: size.width + options.horizontal_padding,
                height: size.height + options.vertical_padding,
            },
        );
    }

    for (handle, _, _) in &slots.order {
        let Some(parent) = handle.ancestors(&map.tree).nth(1) else {
            continue;
        };
        let (Some(parent), Some(child)) = (map.get(parent), map.get(*handle)) else {
            continue;
        };
        let (Some(from), Some(to)) = (result.nodes.get(&parent.id), result.nodes.get(&child.id))
        else {
            continue;
        };
        result.edges.push(Edge {
            parent: parent.id.clone(),
            child: child.id.clone(),
            from: Point {
                x: from.right(),
                y: from.y,
            },
            to: Point { x: to.x, y: to.y },
        });
    }

    result
}

/// Smallest viewport height at which adjacent leaves no longer overlap.
pub fn min_viewport_height(
    map: &MindMap,
    measurer: &dyn LabelMeasurer,
    options: &LayoutOptions,
) -> f64 {
    let slots = Slots::compute(map, options);
    let (_, span) = slots.span(map, options);
    let tallest = slots
        .order
        .iter()
        .filter_map(|(handle, _, _)| map.get(*handle))
        .map(|node| measurer.measure(&node.topic).height + options.vertical_padding)
        .fold(0.0, f64::max);

    span * tallest / options.sibling_separation + options.reserved_height
}
