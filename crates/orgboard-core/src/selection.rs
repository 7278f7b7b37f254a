//! Selection state and hit-testing.

use crate::drawing::DrawingId;
use crate::node::NodeId;
use crate::store::EntityStore;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Currently selected nodes and drawings, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub nodes: Vec<NodeId>,
    pub drawings: Vec<DrawingId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection containing only the given nodes.
    pub fn of_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let mut selection = Self::new();
        for id in nodes {
            selection.add_node(id);
        }
        selection
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.drawings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len() + self.drawings.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.drawings.clear();
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }

    pub fn contains_drawing(&self, id: &str) -> bool {
        self.drawings.iter().any(|d| d == id)
    }

    /// Add a node if it is not already selected.
    pub fn add_node(&mut self, id: impl Into<NodeId>) {
        let id = id.into();
        if !self.contains_node(&id) {
            self.nodes.push(id);
        }
    }

    pub fn add_drawing(&mut self, id: impl Into<DrawingId>) {
        let id = id.into();
        if !self.contains_drawing(&id) {
            self.drawings.push(id);
        }
    }

    /// Replace the selection with a single node.
    pub fn select_node(&mut self, id: impl Into<NodeId>) {
        self.clear();
        self.add_node(id);
    }

    /// Replace the selection with a single drawing.
    pub fn select_drawing(&mut self, id: impl Into<DrawingId>) {
        self.clear();
        self.add_drawing(id);
    }

    /// Add the node if absent, remove it otherwise. Returns whether it is now selected.
    pub fn toggle_node(&mut self, id: &str) -> bool {
        if self.contains_node(id) {
            self.nodes.retain(|n| n != id);
            false
        } else {
            self.nodes.push(id.to_string());
            true
        }
    }

    pub fn toggle_drawing(&mut self, id: &str) -> bool {
        if self.contains_drawing(id) {
            self.drawings.retain(|d| d != id);
            false
        } else {
            self.drawings.push(id.to_string());
            true
        }
    }

    /// Drop ids that no longer exist in the store.
    pub fn retain_existing(&mut self, store: &EntityStore) {
        self.nodes.retain(|id| store.contains(id));
        self.drawings.retain(|id| store.drawing(id).is_some());
    }

    /// Everything intersecting `rect` (world coordinates) with positive area.
    pub fn marquee(store: &EntityStore, rect: Rect) -> Self {
        let rect = rect.abs();
        let nodes = store
            .ids()
            .iter()
            .filter(|id| {
                store
                    .node_rect(id)
                    .is_some_and(|bounds| rect.intersect(bounds).area() > 0.0)
            })
            .cloned()
            .collect();
        let drawings = store
            .drawings()
            .iter()
            .filter(|d| {
                d.bounds()
                    .is_some_and(|bounds| intersects_inclusive(rect, bounds))
            })
            .map(|d| d.id.clone())
            .collect();
        Self { nodes, drawings }
    }
}

/// Drawings can be perfectly horizontal or vertical strokes with a zero-area bounding box.
fn intersects_inclusive(rect: Rect, bounds: Rect) -> bool {
    rect.area() > 0.0
        && bounds.x0 <= rect.x1
        && bounds.x1 >= rect.x0
        && bounds.y0 <= rect.y1
        && bounds.y1 >= rect.y0
}

/// Topmost node under a world point (last inserted wins).
pub fn node_at_point(store: &EntityStore, point: Point) -> Option<&NodeId> {
    store
        .ids()
        .iter()
        .rev()
        .find(|id| store.node_rect(id).is_some_and(|r| r.contains(point)))
}
