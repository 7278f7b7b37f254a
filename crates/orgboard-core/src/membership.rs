//! Department membership inferred from geometric overlap with group nodes.
//!
//! A functional node belongs to the group whose rectangle overlaps it the most. Groups are
//! compared in store order with a strict greater-than, so on equal overlap the group that was
//! added first wins.

use crate::error::{ChartError, ChartResult};
use crate::geometry::overlap_area;
use crate::node::NodeId;
use crate::store::EntityStore;
use std::collections::HashSet;

impl EntityStore {
    /// Name of the group overlapping `id` the most, or `None` if nothing overlaps.
    pub fn best_group_for(&self, id: &str) -> Option<&str> {
        let rect = self.node_rect(id)?;
        let mut best: Option<&str> = None;
        let mut max_area = 0.0;

        for group in self.groups() {
            let Some(group_rect) = self.node_rect(&group.id) else {
                continue;
            };
            let area = overlap_area(rect, group_rect);
            if area > max_area {
                max_area = area;
                best = Some(group.name.as_str());
            }
        }
        best
    }

    /// Re-evaluate one node against all groups.
    ///
    /// Returns whether the node's department changed. Non-functional nodes are ignored.
    pub fn update_node_membership(&mut self, id: &str) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if !node.is_functional() {
            return false;
        }

        let department = self.best_group_for(id).unwrap_or_default().to_string();
        match self.node_mut(id) {
            Some(node) if node.department != department => {
                log::debug!(
                    "Node {} department {:?} -> {:?}",
                    id,
                    node.department,
                    department
                );
                node.department = department;
                true
            }
            _ => false,
        }
    }

    /// Re-evaluate every functional node against one group.
    ///
    /// Overlapping nodes adopt the group's name; nodes that carried the group's name but no
    /// longer overlap it lose their department. Returns the ids that changed.
    pub fn update_group_membership(&mut self, group_id: &str) -> Vec<NodeId> {
        let Some(group) = self.node(group_id).filter(|n| n.is_group()) else {
            return Vec::new();
        };
        let Some(group_rect) = self.node_rect(group_id) else {
            return Vec::new();
        };
        let name = group.name.clone();

        let updates: Vec<(NodeId, String)> = self
            .nodes()
            .filter(|n| n.is_functional())
            .filter_map(|n| {
                let rect = self.node_rect(&n.id)?;
                let overlaps = overlap_area(rect, group_rect) > 0.0;
                if overlaps && n.department != name {
                    Some((n.id.clone(), name.clone()))
                } else if !overlaps && n.department == name && !name.is_empty() {
                    Some((n.id.clone(), String::new()))
                } else {
                    None
                }
            })
            .collect();

        let mut changed = Vec::with_capacity(updates.len());
        for (id, department) in updates {
            if let Some(node) = self.node_mut(&id) {
                node.department = department;
                changed.push(id);
            }
        }
        if !changed.is_empty() {
            log::debug!("Group {:?} membership changed for {} nodes", name, changed.len());
        }
        changed
    }

    /// Re-evaluate every functional node against all groups.
    pub fn update_all_membership(&mut self) -> usize {
        let ids: Vec<NodeId> = self
            .nodes()
            .filter(|n| n.is_functional())
            .map(|n| n.id.clone())
            .collect();
        ids.iter()
            .filter(|id| self.update_node_membership(id))
            .count()
    }

    /// Bring every functional node in line with the current group rectangles.
    ///
    /// Nodes overlapping a group take the best group's name. Nodes overlapping none lose their
    /// department only if it names an existing group; labels without a group are kept.
    /// Returns the number of nodes that changed.
    pub fn reconcile_membership(&mut self) -> usize {
        let group_names: HashSet<String> = self
            .groups()
            .filter(|g| !g.name.is_empty())
            .map(|g| g.name.clone())
            .collect();

        let updates: Vec<(NodeId, String)> = self
            .nodes()
            .filter(|n| n.is_functional())
            .filter_map(|n| {
                let department = match self.best_group_for(&n.id) {
                    Some(name) => name.to_string(),
                    None if group_names.contains(&n.department) => String::new(),
                    None => return None,
                };
                (n.department != department).then(|| (n.id.clone(), department))
            })
            .collect();

        for (id, department) in &updates {
            if let Some(node) = self.node_mut(id) {
                node.department = department.clone();
            }
        }
        if !updates.is_empty() {
            log::debug!("Reconciled membership for {} nodes", updates.len());
        }
        updates.len()
    }

    /// Rename a group and carry the new name over to every node in the old department.
    ///
    /// Returns the number of member nodes updated.
    pub fn rename_group(&mut self, group_id: &str, new_name: &str) -> ChartResult<usize> {
        let group = self
            .node_mut(group_id)
            .filter(|n| n.is_group())
            .ok_or_else(|| ChartError::NodeNotFound(group_id.to_string()))?;
        let old_name = std::mem::replace(&mut group.name, new_name.to_string());
        if old_name == new_name || old_name.is_empty() {
            return Ok(0);
        }

        let members: Vec<NodeId> = self
            .nodes()
            .filter(|n| !n.is_group() && n.department == old_name)
            .map(|n| n.id.clone())
            .collect();
        for id in &members {
            if let Some(node) = self.node_mut(id) {
                node.department = new_name.to_string();
            }
        }
        log::debug!(
            "Renamed group {:?} -> {:?} ({} members)",
            old_name,
            new_name,
            members.len()
        );
        Ok(members.len())
    }
}
