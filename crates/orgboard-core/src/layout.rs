//! Hierarchical auto-layout.
//!
//! Functional nodes (executive/manager/employee) are arranged as top-down trees. Siblings
//! that share a department are kept together in a padded block so the department's group
//! rectangle can be fitted around them afterwards. Notes, shapes and text sitting inside a
//! group are re-attached to that group at the same relative offset.
//!
//! The pipeline runs in a fixed order:
//! 1. capture annotation anchors against the current group rectangles
//! 2. stable-sort every `children` list by department
//! 3. measure subtree widths
//! 4. place trees left to right
//! 5. fit group rectangles around their members
//! 6. move anchored annotations along with their groups

use crate::geometry::{Geometry, union_rects};
use crate::node::{Node, NodeId};
use crate::store::EntityStore;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Spacing parameters for the tree layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Horizontal space taken by one card.
    pub card_width: f64,
    /// Vertical distance between tree levels.
    pub level_height: f64,
    /// Gap between siblings in the same department block.
    pub node_margin: f64,
    /// Gap between consecutive department blocks.
    pub group_margin: f64,
    /// Extra space on each side of a department block.
    pub block_padding: f64,
    /// Gap between separate trees.
    pub root_margin: f64,
    pub group_padding_side: f64,
    pub group_padding_top: f64,
    /// Larger than the top padding, leaves room for the group label.
    pub group_padding_bottom: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_width: 240.0,
            level_height: 180.0,
            node_margin: 20.0,
            group_margin: 80.0,
            block_padding: 30.0,
            root_margin: 120.0,
            group_padding_side: 20.0,
            group_padding_top: 20.0,
            group_padding_bottom: 50.0,
            origin_x: 100.0,
            origin_y: 100.0,
        }
    }
}

/// Summary of a layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutReport {
    /// Functional nodes that received a new position.
    pub placed: usize,
    /// Number of separate trees.
    pub roots: usize,
    /// Groups resized around their members.
    pub groups_fitted: usize,
    /// Annotations moved along with a group.
    pub anchored: usize,
}

/// An annotation's offset from the top-left corner of the group it sits in.
#[derive(Debug, Clone, PartialEq)]
struct Anchor {
    node: NodeId,
    group: NodeId,
    offset: Vec2,
}

/// Recompute the positions of all functional nodes and fit groups around them.
pub fn auto_layout(store: &mut EntityStore, config: &LayoutConfig) -> LayoutReport {
    let anchors = capture_anchors(store);
    sort_children_by_department(store);

    let (positions, roots) = {
        let mut tree = TreeLayout::new(store, config);
        let roots = tree.run();
        (tree.positions, roots)
    };

    for (id, point) in &positions {
        if let Some(geometry) = store.geometry_mut(id) {
            geometry.x = point.x;
            geometry.y = point.y;
        }
    }

    let groups_fitted = fit_groups(store, config);
    let anchored = reattach_anchors(store, &anchors);

    let report = LayoutReport {
        placed: positions.len(),
        roots,
        groups_fitted,
        anchored,
    };
    log::debug!("Auto layout: {:?}", report);
    report
}

/// Record where each note/shape/text sits relative to the group containing its center.
fn capture_anchors(store: &EntityStore) -> Vec<Anchor> {
    let groups: Vec<(&NodeId, Rect)> = store
        .groups()
        .filter_map(|g| store.node_rect(&g.id).map(|r| (&g.id, r)))
        .collect();

    store
        .nodes()
        .filter(|n| n.is_annotation())
        .filter_map(|node| {
            let rect = store.node_rect(&node.id)?;
            let center = rect.center();
            let (group, group_rect) = groups.iter().find(|(_, r)| r.contains(center))?;
            Some(Anchor {
                node: node.id.clone(),
                group: (*group).clone(),
                offset: rect.origin() - group_rect.origin(),
            })
        })
        .collect()
}

/// Stable-sort every `children` list by the children's departments (empty first).
fn sort_children_by_department(store: &mut EntityStore) {
    let departments: HashMap<NodeId, String> = store
        .nodes()
        .map(|n| (n.id.clone(), n.department.clone()))
        .collect();
    let ids: Vec<NodeId> = store.ids().to_vec();

    for id in ids {
        if let Some(node) = store.node_mut(&id) {
            node.children.sort_by(|a, b| {
                let da = departments.get(a).map(String::as_str).unwrap_or_default();
                let db = departments.get(b).map(String::as_str).unwrap_or_default();
                da.cmp(db)
            });
        }
    }
}

/// Width measurement and placement over the functional forest.
struct TreeLayout<'a> {
    store: &'a EntityStore,
    config: &'a LayoutConfig,
    widths: HashMap<NodeId, f64>,
    positions: HashMap<NodeId, Point>,
}

impl<'a> TreeLayout<'a> {
    fn new(store: &'a EntityStore, config: &'a LayoutConfig) -> Self {
        Self {
            store,
            config,
            widths: HashMap::new(),
            positions: HashMap::new(),
        }
    }

    /// Lay out every tree. Returns the number of roots.
    fn run(&mut self) -> usize {
        let roots = self.roots();
        let mut cursor = self.config.origin_x;
        for root in &roots {
            let width = self.measure(&root.id);
            self.place(&root.id, cursor, 0);
            cursor += width + self.config.root_margin;
        }
        roots.len()
    }

    /// Functional nodes not listed as a child of another functional node, in store order.
    fn roots(&self) -> Vec<&'a Node> {
        let store = self.store;
        let referenced: HashSet<&str> = store
            .nodes()
            .filter(|n| n.is_functional())
            .flat_map(|n| n.children.iter().map(String::as_str))
            .collect();
        store
            .nodes()
            .filter(|n| n.is_functional() && !referenced.contains(n.id.as_str()))
            .collect()
    }

    fn functional_children(&self, id: &str) -> Vec<&'a Node> {
        let store = self.store;
        let Some(node) = store.node(id) else {
            return Vec::new();
        };
        node.children
            .iter()
            .filter_map(|child| store.node(child))
            .filter(|child| child.is_functional())
            .collect()
    }

    /// Horizontal space needed by the subtree rooted at `id`.
    fn measure(&mut self, id: &str) -> f64 {
        if let Some(&width) = self.widths.get(id) {
            return width;
        }
        // Provisional entry so a malformed (cyclic) graph cannot recurse forever
        self.widths.insert(id.to_string(), self.config.card_width);

        let children = self.functional_children(id);
        if children.is_empty() {
            return self.config.card_width;
        }

        let mut total = 0.0;
        for (i, run) in children
            .chunk_by(|a, b| a.department == b.department)
            .enumerate()
        {
            if i > 0 {
                total += self.config.group_margin;
            }
            total += self.run_width(run);
        }

        let width = total.max(self.config.card_width);
        self.widths.insert(id.to_string(), width);
        width
    }

    /// Width of a contiguous block of siblings sharing a department.
    fn run_width(&mut self, run: &[&'a Node]) -> f64 {
        let mut width = 0.0;
        for (i, child) in run.iter().enumerate() {
            if i > 0 {
                width += self.config.node_margin;
            }
            width += self.measure(&child.id);
        }
        if is_padded(run) {
            width += 2.0 * self.config.block_padding;
        }
        width
    }

    /// Place `id` centered over its subtree starting at `x`, then its children below.
    fn place(&mut self, id: &str, x: f64, depth: usize) {
        if self.positions.contains_key(id) {
            return;
        }
        let width = self.measure(id);
        let config = self.config;
        let node_x = x + (width - config.card_width) / 2.0;
        let y = config.origin_y + depth as f64 * config.level_height;
        self.positions.insert(id.to_string(), Point::new(node_x, y));

        let children = self.functional_children(id);
        let mut cursor = x;
        for (i, run) in children
            .chunk_by(|a, b| a.department == b.department)
            .enumerate()
        {
            if i > 0 {
                cursor += config.group_margin;
            }
            let padded = is_padded(run);
            if padded {
                cursor += config.block_padding;
            }
            for (j, child) in run.iter().enumerate() {
                if j > 0 {
                    cursor += config.node_margin;
                }
                let child_width = self.measure(&child.id);
                self.place(&child.id, cursor, depth + 1);
                cursor += child_width;
            }
            if padded {
                cursor += config.block_padding;
            }
        }
    }
}

fn is_padded(run: &[&Node]) -> bool {
    run.first().is_some_and(|n| !n.department.is_empty())
}

/// Resize each group around the functional nodes of its department.
///
/// Groups without members keep their geometry.
fn fit_groups(store: &mut EntityStore, config: &LayoutConfig) -> usize {
    let fitted: Vec<(NodeId, Rect)> = store
        .groups()
        .filter(|g| !g.name.is_empty())
        .filter_map(|group| {
            let members = store
                .nodes()
                .filter(|n| n.is_functional() && n.department == group.name)
                .filter_map(|n| store.node_rect(&n.id));
            let bounds = union_rects(members)?;
            Some((
                group.id.clone(),
                Rect::new(
                    bounds.x0 - config.group_padding_side,
                    bounds.y0 - config.group_padding_top,
                    bounds.x1 + config.group_padding_side,
                    bounds.y1 + config.group_padding_bottom,
                ),
            ))
        })
        .collect();

    for (id, rect) in &fitted {
        if let Some(geometry) = store.geometry_mut(id) {
            *geometry = Geometry::sized(rect.x0, rect.y0, rect.width(), rect.height());
        }
    }
    fitted.len()
}

fn reattach_anchors(store: &mut EntityStore, anchors: &[Anchor]) -> usize {
    let mut moved = 0;
    for anchor in anchors {
        let Some(group_origin) = store.geometry(&anchor.group).map(Geometry::origin) else {
            continue;
        };
        if let Some(geometry) = store.geometry_mut(&anchor.node) {
            let target = group_origin + anchor.offset;
            geometry.x = target.x;
            geometry.y = target.y;
            moved += 1;
        }
    }
    moved
}
