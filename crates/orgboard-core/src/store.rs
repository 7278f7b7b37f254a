//! Entity store: nodes, geometries and drawings.
//!
//! The store keeps the node and geometry maps in lockstep (one geometry per node id) and
//! remembers insertion order so that iteration, export and layout are deterministic.
//! It does not validate topology or geometry semantics; see [`crate::topology`],
//! [`crate::membership`] and [`crate::layout`] for that.

use crate::drawing::Drawing;
use crate::error::{ChartError, ChartResult};
use crate::geometry::{Geometry, union_rects};
use crate::node::{Node, NodeId};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A full copy of the store contents, in store order.
///
/// This is both the unit of undo/redo and the export format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<(NodeId, Node)>,
    pub positions: Vec<(NodeId, Geometry)>,
    #[serde(default)]
    pub drawings: Vec<Drawing>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.drawings.is_empty()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Owner of all chart entities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    /// All nodes, keyed by id.
    nodes: HashMap<NodeId, Node>,
    /// One geometry per node id.
    positions: HashMap<NodeId, Geometry>,
    /// Node insertion order.
    order: Vec<NodeId>,
    /// Freehand drawings (back to front).
    drawings: Vec<Drawing>,
}

impl EntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot, validating keyset parity.
    pub fn from_snapshot(snapshot: Snapshot) -> ChartResult<Self> {
        let mut store = Self::new();
        store.replace_all(snapshot.nodes, snapshot.positions, snapshot.drawings)?;
        Ok(store)
    }

    /// Replace the whole contents.
    ///
    /// Fails without mutating if a node has no geometry, a geometry has no node, an id is
    /// duplicated, or a node's key differs from its `id`.
    pub fn replace_all(
        &mut self,
        nodes: Vec<(NodeId, Node)>,
        positions: Vec<(NodeId, Geometry)>,
        drawings: Vec<Drawing>,
    ) -> ChartResult<()> {
        let mut node_map = HashMap::with_capacity(nodes.len());
        let mut order = Vec::with_capacity(nodes.len());
        for (id, node) in nodes {
            if node.id != id || node_map.contains_key(&id) {
                return Err(ChartError::KeysetMismatch(id));
            }
            order.push(id.clone());
            node_map.insert(id, node);
        }

        let mut position_map = HashMap::with_capacity(positions.len());
        for (id, geometry) in positions {
            if !node_map.contains_key(&id) || position_map.contains_key(&id) {
                return Err(ChartError::KeysetMismatch(id));
            }
            position_map.insert(id, geometry);
        }
        if let Some(missing) = order.iter().find(|id| !position_map.contains_key(*id)) {
            return Err(ChartError::KeysetMismatch(missing.clone()));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = drawings.iter().find(|d| !seen.insert(d.id.as_str())) {
            return Err(ChartError::InvalidImport(format!(
                "duplicate drawing id {}",
                dup.id
            )));
        }

        self.nodes = node_map;
        self.positions = position_map;
        self.order = order;
        self.drawings = drawings;
        Ok(())
    }

    /// Take a deep copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self
                .order
                .iter()
                .filter_map(|id| self.nodes.get(id).map(|n| (id.clone(), n.clone())))
                .collect(),
            positions: self
                .order
                .iter()
                .filter_map(|id| self.positions.get(id).map(|g| (id.clone(), *g)))
                .collect(),
            drawings: self.drawings.clone(),
        }
    }

    /// Restore a snapshot previously taken from a store.
    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.order = snapshot.nodes.iter().map(|(id, _)| id.clone()).collect();
        self.nodes = snapshot.nodes.into_iter().collect();
        self.positions = snapshot.positions.into_iter().collect();
        self.drawings = snapshot.drawings;
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.positions.clear();
        self.order.clear();
        self.drawings.clear();
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if there are no nodes and no drawings.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.drawings.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn geometry(&self, id: &str) -> Option<&Geometry> {
        self.positions.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn geometry_mut(&mut self, id: &str) -> Option<&mut Geometry> {
        self.positions.get_mut(id)
    }

    /// Node ids in insertion order.
    pub fn ids(&self) -> &[NodeId] {
        &self.order
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Group nodes in insertion order.
    pub fn groups(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|n| n.is_group())
    }

    /// Insert a node together with its geometry.
    ///
    /// An existing node with the same id is replaced in place (keeping its order).
    pub fn insert(&mut self, node: Node, geometry: Geometry) {
        let id = node.id.clone();
        if !self.nodes.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.positions.insert(id.clone(), geometry);
        self.nodes.insert(id, node);
    }

    /// Overwrite an existing node record.
    pub fn set_node(&mut self, node: Node) -> ChartResult<()> {
        match self.nodes.get_mut(&node.id) {
            Some(slot) => {
                *slot = node;
                Ok(())
            }
            None => Err(ChartError::NodeNotFound(node.id)),
        }
    }

    /// Overwrite the geometry of an existing node.
    pub fn set_geometry(&mut self, id: &str, geometry: Geometry) -> ChartResult<()> {
        match self.positions.get_mut(id) {
            Some(slot) => {
                *slot = geometry;
                Ok(())
            }
            None => Err(ChartError::NodeNotFound(id.to_string())),
        }
    }

    /// Remove a node and its geometry without touching other nodes' children.
    pub(crate) fn remove_entry(&mut self, id: &str) -> Option<(Node, Geometry)> {
        let node = self.nodes.remove(id)?;
        self.order.retain(|n| n.as_str() != id);
        let geometry = self.positions.remove(id).unwrap_or_default();
        Some((node, geometry))
    }

    /// World rectangle of a node, with type default sizes applied.
    pub fn node_rect(&self, id: &str) -> Option<Rect> {
        let node = self.nodes.get(id)?;
        let geometry = self.positions.get(id)?;
        Some(geometry.rect(node.node_type().default_size()))
    }

    pub fn drawings(&self) -> &[Drawing] {
        &self.drawings
    }

    pub fn drawing(&self, id: &str) -> Option<&Drawing> {
        self.drawings.iter().find(|d| d.id == id)
    }

    pub(crate) fn drawing_mut(&mut self, id: &str) -> Option<&mut Drawing> {
        self.drawings.iter_mut().find(|d| d.id == id)
    }

    pub fn drawing_bounds(&self, id: &str) -> Option<Rect> {
        self.drawing(id)?.bounds()
    }

    /// Add a drawing on top of the existing ones.
    pub fn append_drawing(&mut self, drawing: Drawing) {
        self.drawings.push(drawing);
    }

    /// Remove a drawing.
    pub fn remove_drawing(&mut self, id: &str) -> Option<Drawing> {
        let index = self.drawings.iter().position(|d| d.id == id)?;
        Some(self.drawings.remove(index))
    }

    /// Bounding box of all nodes and drawings.
    pub fn bounds(&self) -> Option<Rect> {
        let node_rects = self.order.iter().filter_map(|id| self.node_rect(id));
        let drawing_rects = self.drawings.iter().filter_map(|d| d.bounds());
        union_rects(node_rects.chain(drawing_rects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::SerializableColor;
    use crate::node::NodeType;

    fn node(id: &str) -> Node {
        Node::with_id(id, NodeType::Employee, id)
    }

    #[test]
    fn test_store_creation() {
        let store = EntityStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_insert_keeps_parity() {
        let mut store = EntityStore::new();
        store.insert(node("a"), Geometry::at(0.0, 0.0));
        store.insert(node("b"), Geometry::at(10.0, 0.0));

        assert_eq!(store.len(), 2);
        assert!(store.geometry("a").is_some());
        assert_eq!(store.ids(), ["a".to_string(), "b".to_string()]);

        // Re-inserting keeps order
        store.insert(node("a"), Geometry::at(5.0, 5.0));
        assert_eq!(store.ids(), ["a".to_string(), "b".to_string()]);
        assert!((store.geometry("a").unwrap().x - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_remove_entry() {
        let mut store = EntityStore::new();
        store.insert(node("a"), Geometry::at(0.0, 0.0));
        let removed = store.remove_entry("a");

        assert!(removed.is_some());
        assert!(store.geometry("a").is_none());
        assert!(store.ids().is_empty());
    }

    #[test]
    fn test_set_missing_node() {
        let mut store = EntityStore::new();
        assert!(matches!(
            store.set_node(node("x")),
            Err(ChartError::NodeNotFound(_))
        ));
        assert!(store.set_geometry("x", Geometry::default()).is_err());
    }

    #[test]
    fn test_replace_all_rejects_mismatch() {
        let mut store = EntityStore::new();
        store.insert(node("keep"), Geometry::at(0.0, 0.0));

        let result = store.replace_all(
            vec![("a".to_string(), node("a"))],
            vec![("b".to_string(), Geometry::default())],
            Vec::new(),
        );
        assert!(matches!(result, Err(ChartError::KeysetMismatch(_))));
        // Untouched
        assert!(store.contains("keep"));

        let result = store.replace_all(vec![("a".to_string(), node("a"))], Vec::new(), Vec::new());
        assert!(matches!(result, Err(ChartError::KeysetMismatch(id)) if id == "a"));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut store = EntityStore::new();
        store.insert(node("a"), Geometry::at(1.0, 2.0));
        store.insert(node("b"), Geometry::sized(3.0, 4.0, 50.0, 60.0));
        store.append_drawing(Drawing::new("M0 0 L5 5", SerializableColor::black(), 2.0));

        let snapshot = store.snapshot();
        let json = snapshot.to_json().unwrap();
        let restored = EntityStore::from_snapshot(Snapshot::from_json(&json).unwrap()).unwrap();

        assert_eq!(restored, store);
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut store = EntityStore::new();
        store.insert(node("a"), Geometry::at(0.0, 0.0));
        let snapshot = store.snapshot();

        store.set_geometry("a", Geometry::at(99.0, 99.0)).unwrap();
        assert!((snapshot.positions[0].1.x).abs() < f64::EPSILON);
    }

    #[test]
    fn test_node_rect_uses_defaults() {
        let mut store = EntityStore::new();
        store.insert(node("a"), Geometry::at(10.0, 10.0));
        let rect = store.node_rect("a").unwrap();
        let size = NodeType::Employee.default_size();
        assert_eq!(rect, Rect::new(10.0, 10.0, 10.0 + size.width, 10.0 + size.height));
    }

    #[test]
    fn test_drawings() {
        let mut store = EntityStore::new();
        let drawing = Drawing::new("M0 0 L10 20", SerializableColor::black(), 2.0);
        let id = drawing.id.clone();
        store.append_drawing(drawing);

        assert!(store.drawing(&id).is_some());
        assert_eq!(store.bounds(), Some(Rect::new(0.0, 0.0, 10.0, 20.0)));
        assert!(store.remove_drawing(&id).is_some());
        assert!(store.remove_drawing(&id).is_none());
    }
}
