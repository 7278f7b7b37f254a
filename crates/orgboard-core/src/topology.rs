//! Hierarchy edges between nodes.
//!
//! Edges live only in each node's `children` list. The adjacency is kept a single-parent,
//! acyclic tree: linking detaches the child from its previous parent and refuses to close a
//! cycle, and deleting a node strips it from every `children` list first.

use crate::error::{ChartError, ChartResult};
use crate::geometry::Geometry;
use crate::node::{Node, NodeId};
use crate::store::EntityStore;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A derived parent → child edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub parent: NodeId,
    pub child: NodeId,
}

impl EntityStore {
    /// All edges whose child still resolves, in node order then children order.
    pub fn edges(&self) -> Vec<Edge> {
        self.nodes()
            .flat_map(|node| {
                node.children
                    .iter()
                    .filter(|child| self.contains(child))
                    .map(|child| Edge {
                        parent: node.id.clone(),
                        child: child.clone(),
                    })
            })
            .collect()
    }

    /// The node listing `id` among its children, if any.
    pub fn parent_of(&self, id: &str) -> Option<&NodeId> {
        self.nodes()
            .find(|node| node.children.iter().any(|c| c == id))
            .map(|node| &node.id)
    }

    /// All nodes below `id`, depth-first in children order.
    pub fn descendants(&self, id: &str) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<&NodeId> = match self.node(id) {
            Some(node) => node.children.iter().rev().collect(),
            None => return result,
        };

        while let Some(current) = stack.pop() {
            if !visited.insert(current.as_str()) {
                continue;
            }
            let Some(node) = self.node(current) else {
                continue;
            };
            result.push(current.clone());
            stack.extend(node.children.iter().rev());
        }
        result
    }

    /// Whether `id` is somewhere below `ancestor`.
    pub fn is_descendant(&self, ancestor: &str, id: &str) -> bool {
        self.descendants(ancestor).iter().any(|d| d == id)
    }

    /// Check whether `link(source, target)` would change anything.
    ///
    /// Returns `Ok(false)` for self-links and existing edges, and an error for unknown ids
    /// or when `source` is already below `target`.
    pub fn can_link(&self, source: &str, target: &str) -> ChartResult<bool> {
        if source == target {
            return Ok(false);
        }
        let parent = self
            .node(source)
            .ok_or_else(|| ChartError::NodeNotFound(source.to_string()))?;
        if !self.contains(target) {
            return Err(ChartError::NodeNotFound(target.to_string()));
        }
        if parent.children.iter().any(|c| c == target) {
            return Ok(false);
        }
        if self.is_descendant(target, source) {
            return Err(ChartError::Cycle {
                parent: source.to_string(),
                child: target.to_string(),
            });
        }
        Ok(true)
    }

    /// Make `target` a child of `source`.
    ///
    /// The target is detached from any previous parent first. Returns `Ok(false)` when
    /// nothing changed.
    pub fn link(&mut self, source: &str, target: &str) -> ChartResult<bool> {
        if !self.can_link(source, target)? {
            return Ok(false);
        }

        self.detach(target);
        if let Some(parent) = self.node_mut(source) {
            parent.children.push(target.to_string());
        }
        log::debug!("Linked {} -> {}", source, target);
        Ok(true)
    }

    /// Remove `target` from `source`'s children. Returns whether an edge was removed.
    pub fn unlink(&mut self, source: &str, target: &str) -> bool {
        let Some(parent) = self.node_mut(source) else {
            return false;
        };
        let before = parent.children.len();
        parent.children.retain(|c| c != target);
        before != parent.children.len()
    }

    /// Remove `id` from every `children` list.
    fn detach(&mut self, id: &str) {
        let parents: Vec<NodeId> = self
            .nodes()
            .filter(|node| node.children.iter().any(|c| c == id))
            .map(|node| node.id.clone())
            .collect();
        for parent in parents {
            self.unlink(&parent, id);
        }
    }

    /// Delete a node, stripping every edge that points at it.
    ///
    /// The node's own children become roots.
    pub fn delete_node(&mut self, id: &str) -> Option<(Node, Geometry)> {
        if !self.contains(id) {
            return None;
        }
        self.detach(id);
        self.remove_entry(id)
    }

    /// Drop child ids that no longer resolve. Returns how many were removed.
    pub fn prune_dangling_children(&mut self) -> usize {
        let dangling: Vec<(NodeId, NodeId)> = self
            .nodes()
            .flat_map(|node| {
                node.children
                    .iter()
                    .filter(|child| !self.contains(child))
                    .map(|child| (node.id.clone(), child.clone()))
            })
            .collect();
        for (parent, child) in &dangling {
            self.unlink(parent, child);
        }
        dangling.len()
    }

    /// Check the hierarchy invariants: no dangling children, single parent, no cycles.
    pub fn validate_topology(&self) -> ChartResult<()> {
        let mut parents: HashMap<&str, &str> = HashMap::new();
        for node in self.nodes() {
            for child in &node.children {
                if !self.contains(child) {
                    return Err(ChartError::InvalidTopology(format!(
                        "{} lists missing child {}",
                        node.id, child
                    )));
                }
                if let Some(previous) = parents.insert(child.as_str(), node.id.as_str()) {
                    return Err(ChartError::InvalidTopology(format!(
                        "{} has two parents: {} and {}",
                        child, previous, node.id
                    )));
                }
            }
        }

        // With a single parent each, a cycle means following parents from some node
        // returns to it.
        for id in self.ids() {
            let mut seen = HashSet::new();
            let mut current = id.as_str();
            while let Some(&parent) = parents.get(current) {
                if parent == id || !seen.insert(parent) {
                    return Err(ChartError::InvalidTopology(format!(
                        "{} is its own ancestor",
                        id
                    )));
                }
                current = parent;
            }
        }
        Ok(())
    }
}
