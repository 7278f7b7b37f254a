//! The chart command surface.
//!
//! [`Chart`] owns the entity store together with history, clipboard, selection and viewport.
//! Every command that changes the store records a history snapshot first, applies its main
//! mutation, then recomputes group membership inside the same history entry. Commands that
//! would change nothing return `false`/`None` and leave history alone.

use crate::clipboard::{Clipboard, Pasted};
use crate::color::SerializableColor;
use crate::config::ChartConfig;
use crate::drawing::{Drawing, DrawingId};
use crate::error::{ChartError, ChartResult};
use crate::geometry::Geometry;
use crate::history::History;
use crate::layout::{LayoutReport, auto_layout};
use crate::node::{Node, NodeId, NodePatch, NodeType};
use crate::selection::Selection;
use crate::store::{EntityStore, Snapshot};
use crate::templates::build_template;
use crate::topology::Edge;
use crate::viewport::{FIT_PADDING, Viewport};
use kurbo::{Point, Rect, Size, Vec2};
use serde_json::Value;

/// Smallest width or height a resize can produce.
pub const MIN_NODE_SIZE: f64 = 20.0;

/// An editable chart.
#[derive(Debug, Clone, Default)]
pub struct Chart {
    store: EntityStore,
    history: History,
    clipboard: Clipboard,
    selection: Selection,
    viewport: Viewport,
    config: ChartConfig,
}

impl Chart {
    /// Create an empty chart with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty chart using `config`.
    pub fn with_config(config: ChartConfig) -> Self {
        Self {
            history: History::new(config.max_history),
            config,
            ..Self::default()
        }
    }

    /// The entity store, read-only.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Active engine configuration.
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Undo/redo stacks.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Contents of the last copy.
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Currently selected nodes and drawings.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Current pan and zoom.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable view state. View changes are not recorded in history.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.store.node(id)
    }

    /// Look up a node's geometry by id.
    pub fn geometry(&self, id: &str) -> Option<&Geometry> {
        self.store.geometry(id)
    }

    /// Parent to child edges derived from `children` lists.
    pub fn edges(&self) -> Vec<Edge> {
        self.store.edges()
    }

    /// Deep copy of the current contents.
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Whether there is anything to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether there is anything to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Push the current state onto the undo stack (call before making changes).
    fn record(&mut self) {
        self.history.record(self.store.snapshot());
    }

    /// Recompute membership after `id` was added, moved or resized.
    fn refresh_membership(&mut self, id: &str) {
        match self.store.node(id) {
            Some(node) if node.is_group() => {
                self.store.update_group_membership(id);
            }
            Some(node) if node.is_functional() => {
                self.store.update_node_membership(id);
            }
            _ => {}
        }
    }

    fn require_node(&self, id: &str) -> ChartResult<&Node> {
        self.store
            .node(id)
            .ok_or_else(|| ChartError::NodeNotFound(id.to_string()))
    }

    // ---- Nodes ----

    /// Add a node with its top-left corner at `at` and select it.
    ///
    /// `size` overrides the type's default size.
    pub fn add_node(
        &mut self,
        node_type: NodeType,
        at: Point,
        options: NodePatch,
        size: Option<Size>,
    ) -> NodeId {
        self.record();

        let mut node = Node::new(node_type, format!("New {}", node_type.name()));
        options.apply(&mut node);
        let geometry = match size {
            Some(size) => Geometry::sized(
                at.x,
                at.y,
                size.width.max(MIN_NODE_SIZE),
                size.height.max(MIN_NODE_SIZE),
            ),
            None => Geometry::at(at.x, at.y),
        };
        let id = node.id.clone();
        self.store.insert(node, geometry);
        self.refresh_membership(&id);
        self.selection.select_node(id.clone());

        log::debug!("Added {} node {}", node_type.name(), id);
        id
    }

    /// Apply a patch to every selected node.
    ///
    /// Renaming a group carries the new name over to its members. Returns whether anything
    /// was updated.
    pub fn update_selected(&mut self, patch: &NodePatch) -> bool {
        let targets: Vec<NodeId> = self
            .selection
            .nodes
            .iter()
            .filter(|id| self.store.contains(id))
            .cloned()
            .collect();
        let changes_something = targets.iter().any(|id| {
            self.store.node(id).is_some_and(|node| {
                let mut patched = node.clone();
                patch.apply(&mut patched);
                patched != *node
            })
        });
        if patch.is_empty() || !changes_something {
            return false;
        }

        self.record();
        for id in &targets {
            let is_group = self.store.node(id).is_some_and(Node::is_group);
            if let (true, Some(name)) = (is_group, &patch.name) {
                // Group membership is by name, so members follow the rename
                let _ = self.store.rename_group(id, name);
            }
            if let Some(node) = self.store.node_mut(id) {
                patch.apply(node);
            }
        }
        log::debug!("Updated {} nodes", targets.len());
        true
    }

    /// Rename a group and propagate the name to its members.
    ///
    /// Renaming to the current name returns `Ok(0)` without recording history.
    pub fn rename_group(&mut self, group_id: &str, name: &str) -> ChartResult<usize> {
        let group = self.require_node(group_id)?;
        if !group.is_group() {
            return Err(ChartError::NodeNotFound(group_id.to_string()));
        }
        if group.name == name {
            return Ok(0);
        }
        self.record();
        self.store.rename_group(group_id, name)
    }

    /// Move a node's top-left corner to `(x, y)`.
    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> ChartResult<bool> {
        self.require_node(id)?;
        let current = self.store.geometry(id).copied().unwrap_or_default();
        if current.x == x && current.y == y {
            return Ok(false);
        }

        self.record();
        if let Some(geometry) = self.store.geometry_mut(id) {
            geometry.x = x;
            geometry.y = y;
        }
        self.refresh_membership(id);
        Ok(true)
    }

    /// Give a node an explicit size.
    pub fn resize_node(&mut self, id: &str, width: f64, height: f64) -> ChartResult<bool> {
        self.require_node(id)?;
        let width = width.max(MIN_NODE_SIZE);
        let height = height.max(MIN_NODE_SIZE);
        let current = self.store.geometry(id).copied().unwrap_or_default();
        if current.width == Some(width) && current.height == Some(height) {
            return Ok(false);
        }

        self.record();
        if let Some(geometry) = self.store.geometry_mut(id) {
            geometry.width = Some(width);
            geometry.height = Some(height);
        }
        self.refresh_membership(id);
        Ok(true)
    }

    // ---- Topology ----

    /// Make `target` report to `source`.
    ///
    /// Self-links and existing edges return `Ok(false)`; cycles and unknown ids are errors.
    /// Neither records history.
    pub fn link(&mut self, source: &str, target: &str) -> ChartResult<bool> {
        match self.store.can_link(source, target) {
            Ok(true) => {}
            Ok(false) => return Ok(false),
            Err(e) => {
                log::debug!("Rejected link {} -> {}: {}", source, target, e);
                return Err(e);
            }
        }
        self.record();
        self.store.link(source, target)
    }

    /// Remove `target` from `source`'s reports. Returns false if there was no such edge.
    pub fn unlink(&mut self, source: &str, target: &str) -> bool {
        let exists = self
            .store
            .node(source)
            .is_some_and(|n| n.children.iter().any(|c| c == target));
        if !exists {
            return false;
        }
        self.record();
        self.store.unlink(source, target)
    }

    /// Delete every selected node and drawing. Returns how many items were removed.
    pub fn delete_selection(&mut self) -> usize {
        self.selection.retain_existing(&self.store);
        if self.selection.is_empty() {
            return 0;
        }

        self.record();
        let selection = std::mem::take(&mut self.selection);
        let nodes = selection
            .nodes
            .iter()
            .filter(|id| self.store.delete_node(id).is_some())
            .count();
        let drawings = selection
            .drawings
            .iter()
            .filter(|id| self.store.remove_drawing(id).is_some())
            .count();

        log::debug!("Deleted {} nodes and {} drawings", nodes, drawings);
        nodes + drawings
    }

    // ---- Clipboard ----

    /// Copy the selection into the clipboard. Returns the number of items copied.
    pub fn copy_selection(&mut self) -> usize {
        self.clipboard.copy(&self.store, &self.selection)
    }

    /// Paste the clipboard with its top-left corner at `at`, selecting exactly the new items.
    pub fn paste(&mut self, at: Point) -> Option<Pasted> {
        if self.clipboard.is_empty() {
            return None;
        }

        self.record();
        let pasted = self.clipboard.paste(&mut self.store, at)?;
        for id in &pasted.nodes {
            if self.store.node(id).is_some_and(Node::is_functional) {
                self.store.update_node_membership(id);
            }
        }
        for id in &pasted.nodes {
            if self.store.node(id).is_some_and(Node::is_group) {
                self.store.update_group_membership(id);
            }
        }
        self.selection = pasted.to_selection();
        Some(pasted)
    }

    // ---- History ----

    /// Undo the last change. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(self.store.snapshot()) else {
            return false;
        };
        self.store.restore(previous);
        self.selection.retain_existing(&self.store);
        true
    }

    /// Redo the last undone change. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(self.store.snapshot()) else {
            return false;
        };
        self.store.restore(next);
        self.selection.retain_existing(&self.store);
        true
    }

    // ---- Layout & templates ----

    /// Re-run the hierarchical layout over all functional nodes.
    ///
    /// Membership is reconciled against the fitted group rectangles once layout is done.
    pub fn auto_layout(&mut self) -> LayoutReport {
        if !self.store.nodes().any(Node::is_functional) {
            return LayoutReport::default();
        }
        self.record();
        let report = auto_layout(&mut self.store, &self.config.layout);
        self.store.reconcile_membership();
        report
    }

    /// Replace the chart contents with a built-in template.
    pub fn load_template(&mut self, name: &str) -> ChartResult<()> {
        let snapshot = build_template(name, &self.config.layout)?;
        self.record();
        self.store.restore(snapshot);
        self.selection.clear();
        log::info!("Loaded template {:?} ({} nodes)", name, self.store.len());
        Ok(())
    }

    // ---- Drawings ----

    /// Add a smoothed freehand stroke through `points`.
    pub fn add_drawing(
        &mut self,
        points: &[Point],
        color: SerializableColor,
        stroke_width: f64,
    ) -> Option<DrawingId> {
        if points.is_empty() {
            return None;
        }
        self.record();
        let drawing = Drawing::from_points(points, color, stroke_width);
        let id = drawing.id.clone();
        self.store.append_drawing(drawing);
        Some(id)
    }

    /// Translate a drawing by `(dx, dy)`.
    pub fn move_drawing(&mut self, id: &str, dx: f64, dy: f64) -> ChartResult<bool> {
        if self.store.drawing(id).is_none() {
            return Err(ChartError::DrawingNotFound(id.to_string()));
        }
        if dx == 0.0 && dy == 0.0 {
            return Ok(false);
        }
        self.record();
        if let Some(drawing) = self.store.drawing_mut(id) {
            drawing.translate(Vec2::new(dx, dy));
        }
        Ok(true)
    }

    // ---- Selection ----

    /// Select a single node. Returns false for unknown ids.
    pub fn select_node(&mut self, id: &str) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        self.selection.select_node(id);
        true
    }

    /// Add or remove a node from the selection. Returns whether it is now selected.
    pub fn toggle_node(&mut self, id: &str) -> bool {
        self.store.contains(id) && self.selection.toggle_node(id)
    }

    /// Select a single drawing. Returns false for unknown ids.
    pub fn select_drawing(&mut self, id: &str) -> bool {
        if self.store.drawing(id).is_none() {
            return false;
        }
        self.selection.select_drawing(id);
        true
    }

    /// Select everything inside a world-space rectangle.
    pub fn select_in_rect(&mut self, rect: Rect) -> usize {
        self.selection = Selection::marquee(&self.store, rect);
        self.selection.len()
    }

    /// Select every node and drawing.
    pub fn select_all(&mut self) {
        self.selection = Selection {
            nodes: self.store.ids().to_vec(),
            drawings: self.store.drawings().iter().map(|d| d.id.clone()).collect(),
        };
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ---- Import / export ----

    /// Serialize the chart contents as a snapshot.
    pub fn export_json(&self) -> ChartResult<String> {
        Ok(self.store.snapshot().to_json()?)
    }

    /// Replace the chart contents with an exported snapshot.
    ///
    /// Malformed input (not an object with `nodes` and `positions` arrays) is rejected without
    /// touching state or history. The snapshot is then built and validated in a separate store;
    /// if that fails the chart is left as it was and the error comes back as
    /// [`ChartError::ImportRolledBack`]. Only a valid import is recorded in history.
    pub fn import_json(&mut self, json: &str) -> ChartResult<usize> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| ChartError::InvalidImport(e.to_string()))?;
        validate_import_shape(&value)?;

        let imported = match build_import(&value) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("Import failed, keeping current chart: {}", e);
                return Err(ChartError::ImportRolledBack(Box::new(e)));
            }
        };

        self.record();
        self.store = imported;
        self.selection.clear();
        let count = self.store.len();
        log::info!("Imported {} nodes", count);
        Ok(count)
    }

    // ---- View ----

    /// Fit the viewport to all content on a screen of `screen` size.
    ///
    /// Returns false (and resets the view) when the chart is empty.
    pub fn fit_to_content(&mut self, screen: Size) -> bool {
        match self.store.bounds() {
            Some(bounds) => {
                self.viewport.fit_to_bounds(bounds, screen, FIT_PADDING);
                true
            }
            None => {
                self.viewport.reset();
                false
            }
        }
    }
}

fn validate_import_shape(value: &Value) -> ChartResult<()> {
    let Some(object) = value.as_object() else {
        return Err(ChartError::InvalidImport("expected a JSON object".to_string()));
    };
    for key in ["nodes", "positions"] {
        if !object.get(key).is_some_and(Value::is_array) {
            return Err(ChartError::InvalidImport(format!("`{}` must be an array", key)));
        }
    }
    if object.get("drawings").is_some_and(|d| !d.is_array() && !d.is_null()) {
        return Err(ChartError::InvalidImport("`drawings` must be an array".to_string()));
    }
    Ok(())
}

/// Decode and validate an import into a fresh store.
fn build_import(value: &Value) -> ChartResult<EntityStore> {
    let mut nodes = Vec::new();
    for entry in array_field(value, "nodes") {
        let (id, node): (NodeId, Node) = serde_json::from_value(entry.clone())?;
        nodes.push((id, node));
    }
    let mut positions = Vec::new();
    for entry in array_field(value, "positions") {
        let (id, geometry): (NodeId, Geometry) = serde_json::from_value(entry.clone())?;
        positions.push((id, geometry));
    }
    let mut drawings = Vec::new();
    for entry in array_field(value, "drawings") {
        drawings.push(serde_json::from_value::<Drawing>(entry.clone())?);
    }

    let mut store = EntityStore::new();
    store.replace_all(nodes, positions, drawings)?;
    let pruned = store.prune_dangling_children();
    if pruned > 0 {
        log::debug!("Dropped {} dangling child references", pruned);
    }
    store.validate_topology()?;
    Ok(store)
}

fn array_field<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutConfig;

    fn employee(chart: &mut Chart, name: &str, x: f64, y: f64) -> NodeId {
        chart.add_node(NodeType::Employee, Point::new(x, y), NodePatch::name(name), None)
    }

    fn group(chart: &mut Chart, name: &str, rect: Rect) -> NodeId {
        chart.add_node(
            NodeType::Group,
            rect.origin(),
            NodePatch::name(name),
            Some(rect.size()),
        )
    }

    #[test]
    fn test_add_node_selects_and_records() {
        let mut chart = Chart::new();
        let id = employee(&mut chart, "Ada", 10.0, 20.0);

        assert_eq!(chart.node(&id).unwrap().name, "Ada");
        assert_eq!(chart.selection().nodes, vec![id.clone()]);
        assert!(chart.can_undo());

        assert!(chart.undo());
        assert!(chart.node(&id).is_none());
        assert!(chart.selection().is_empty());
        assert!(chart.redo());
        assert!(chart.node(&id).is_some());
    }

    #[test]
    fn test_undo_redo_inverse() {
        let mut chart = Chart::new();
        let a = employee(&mut chart, "a", 0.0, 0.0);
        let b = employee(&mut chart, "b", 300.0, 0.0);
        chart.link(&a, &b).unwrap();
        chart.move_node(&b, 500.0, 500.0).unwrap();
        chart.auto_layout();
        let end = chart.snapshot();

        let mut states = Vec::new();
        while chart.can_undo() {
            states.push(chart.snapshot());
            assert!(chart.undo());
        }
        assert!(chart.snapshot().is_empty());
        for expected in states.iter().rev() {
            assert!(chart.redo());
            assert_eq!(&chart.snapshot(), expected);
        }
        assert_eq!(chart.snapshot(), end);
        assert!(!chart.redo());
    }

    #[test]
    fn test_history_bound() {
        let mut chart = Chart::with_config(ChartConfig {
            max_history: 3,
            ..ChartConfig::default()
        });
        for i in 0..5 {
            employee(&mut chart, &format!("n{}", i), i as f64 * 300.0, 0.0);
        }
        assert_eq!(chart.history().undo_len(), 3);

        let mut undone = 0;
        while chart.undo() {
            undone += 1;
        }
        assert_eq!(undone, 3);
        // The two oldest additions cannot be undone
        assert_eq!(chart.store().len(), 2);
    }

    #[test]
    fn test_soft_noops_record_nothing() {
        let mut chart = Chart::new();
        let a = employee(&mut chart, "a", 0.0, 0.0);
        let undo_len = chart.history().undo_len();

        assert!(!chart.link(&a, &a).unwrap());
        assert!(!chart.unlink(&a, "nobody"));
        assert!(!chart.move_node(&a, 0.0, 0.0).unwrap());
        chart.clear_selection();
        assert_eq!(chart.delete_selection(), 0);
        assert!(!chart.update_selected(&NodePatch::name("x")));
        assert!(chart.paste(Point::ZERO).is_none());
        assert!(chart.add_drawing(&[], SerializableColor::black(), 2.0).is_none());

        assert_eq!(chart.history().undo_len(), undo_len);
    }

    #[test]
    fn test_cycle_rejected_without_history() {
        let mut chart = Chart::new();
        let a = employee(&mut chart, "a", 0.0, 0.0);
        let b = employee(&mut chart, "b", 300.0, 0.0);
        chart.link(&a, &b).unwrap();
        let before = chart.snapshot();
        let undo_len = chart.history().undo_len();

        assert!(matches!(chart.link(&b, &a), Err(ChartError::Cycle { .. })));
        assert_eq!(chart.snapshot(), before);
        assert_eq!(chart.history().undo_len(), undo_len);
        assert!(matches!(
            chart.move_node("ghost", 1.0, 1.0),
            Err(ChartError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_move_updates_membership() {
        let mut chart = Chart::new();
        group(&mut chart, "Sales", Rect::new(0.0, 0.0, 600.0, 400.0));
        let e = employee(&mut chart, "e", 50.0, 50.0);
        assert_eq!(chart.node(&e).unwrap().department, "Sales");

        chart.move_node(&e, 2000.0, 2000.0).unwrap();
        assert_eq!(chart.node(&e).unwrap().department, "");

        // Undo restores the department together with the position
        chart.undo();
        assert_eq!(chart.node(&e).unwrap().department, "Sales");
    }

    #[test]
    fn test_moving_group_adopts_nodes() {
        let mut chart = Chart::new();
        let e = employee(&mut chart, "e", 1000.0, 1000.0);
        let g = group(&mut chart, "Ops", Rect::new(0.0, 0.0, 400.0, 300.0));
        assert_eq!(chart.node(&e).unwrap().department, "");

        chart.move_node(&g, 950.0, 950.0).unwrap();
        assert_eq!(chart.node(&e).unwrap().department, "Ops");
    }

    #[test]
    fn test_rename_group_via_update() {
        let mut chart = Chart::new();
        let g = group(&mut chart, "Sales", Rect::new(0.0, 0.0, 900.0, 400.0));
        let members: Vec<NodeId> = (0..3)
            .map(|i| employee(&mut chart, &format!("e{}", i), i as f64 * 260.0, 50.0))
            .collect();

        chart.select_node(&g);
        assert!(chart.update_selected(&NodePatch::name("Marketing")));
        for id in &members {
            assert_eq!(chart.node(id).unwrap().department, "Marketing");
        }
        assert_eq!(chart.node(&g).unwrap().name, "Marketing");

        chart.undo();
        assert_eq!(chart.node(&members[0]).unwrap().department, "Sales");
    }

    #[test]
    fn test_resize_group_orphans() {
        let mut chart = Chart::new();
        let g = group(&mut chart, "Sales", Rect::new(0.0, 0.0, 900.0, 400.0));
        let near = employee(&mut chart, "near", 10.0, 10.0);
        let far = employee(&mut chart, "far", 600.0, 10.0);

        chart.resize_node(&g, 300.0, 300.0).unwrap();
        assert_eq!(chart.node(&near).unwrap().department, "Sales");
        assert_eq!(chart.node(&far).unwrap().department, "");
        let geometry = chart.geometry(&g).unwrap();
        assert_eq!(geometry.width, Some(300.0));
    }

    #[test]
    fn test_delete_selection() {
        let mut chart = Chart::new();
        let a = employee(&mut chart, "a", 0.0, 0.0);
        let b = employee(&mut chart, "b", 300.0, 0.0);
        let c = employee(&mut chart, "c", 600.0, 0.0);
        chart.link(&a, &b).unwrap();
        chart.link(&b, &c).unwrap();

        chart.select_node(&b);
        assert_eq!(chart.delete_selection(), 1);
        assert!(chart.node(&b).is_none());
        assert!(chart.node(&a).unwrap().children.is_empty());
        assert!(chart.store().parent_of(&c).is_none());
        assert!(chart.store().validate_topology().is_ok());
        assert!(chart.selection().is_empty());
    }

    #[test]
    fn test_copy_paste_selects_new() {
        let mut chart = Chart::new();
        let p = employee(&mut chart, "p", 0.0, 0.0);
        let c1 = employee(&mut chart, "c1", 0.0, 200.0);
        let c2 = employee(&mut chart, "c2", 300.0, 200.0);
        chart.link(&p, &c1).unwrap();
        chart.link(&p, &c2).unwrap();

        chart.select_in_rect(Rect::new(-10.0, -10.0, 600.0, 400.0));
        assert_eq!(chart.copy_selection(), 3);

        let pasted = chart.paste(Point::new(2000.0, 0.0)).unwrap();
        assert_eq!(pasted.nodes.len(), 3);
        assert_eq!(chart.selection().nodes, pasted.nodes);
        assert_eq!(chart.edges().len(), 4);
        assert!(chart.store().validate_topology().is_ok());

        chart.undo();
        assert_eq!(chart.store().len(), 3);
    }

    #[test]
    fn test_paste_group_adopts() {
        let mut chart = Chart::new();
        let g = group(&mut chart, "Sales", Rect::new(0.0, 0.0, 300.0, 300.0));
        let loose = employee(&mut chart, "loose", 2050.0, 50.0);

        chart.select_node(&g);
        chart.copy_selection();
        chart.paste(Point::new(2000.0, 0.0)).unwrap();
        assert_eq!(chart.node(&loose).unwrap().department, "Sales");
    }

    #[test]
    fn test_auto_layout_scenario() {
        let mut chart = Chart::new();
        // Group first so adding it does not orphan the explicit departments below
        let gx = group(&mut chart, "X", Rect::new(-3000.0, -3000.0, -2900.0, -2900.0));
        let a = chart.add_node(NodeType::Executive, Point::ZERO, NodePatch::name("A"), None);
        let mut child = |name: &str, department: &str| {
            let id = chart.add_node(
                NodeType::Employee,
                Point::new(5000.0, 5000.0),
                NodePatch::name(name),
                None,
            );
            chart.update_selected(&NodePatch {
                department: Some(department.to_string()),
                ..NodePatch::default()
            });
            id
        };
        let d = child("D", "Y");
        let b = child("B", "X");
        let c = child("C", "X");
        for id in [&d, &b, &c] {
            chart.link(&a, id).unwrap();
        }

        let report = chart.auto_layout();
        assert_eq!(report.placed, 4);
        assert_eq!(report.groups_fitted, 1);

        let config = LayoutConfig::default();
        let rect = |id: &str| chart.store().node_rect(id).unwrap();
        assert!((rect(&c).x0 - rect(&b).x1 - config.node_margin).abs() < 1e-9);
        assert!(rect(&d).x0 - rect(&c).x1 > config.node_margin);
        let group = rect(&gx);
        assert!((group.x0 - (rect(&b).x0 - config.group_padding_side)).abs() < 1e-9);
        assert!((group.x1 - (rect(&c).x1 + config.group_padding_side)).abs() < 1e-9);
    }

    #[test]
    fn test_layout_reconciles_membership() {
        let mut chart = Chart::new();
        let gx = group(&mut chart, "X", Rect::new(-3000.0, -3000.0, -2900.0, -2900.0));
        let r = chart.add_node(NodeType::Executive, Point::ZERO, NodePatch::name("R"), None);
        let mut hire = |name: &str, department: &str| {
            let id = employee(&mut chart, name, 5000.0, 5000.0);
            if !department.is_empty() {
                chart.update_selected(&NodePatch {
                    department: Some(department.to_string()),
                    ..NodePatch::default()
                });
            }
            id
        };
        let b = hire("B", "X");
        let c = hire("C", "X");
        let e = hire("E", "X");
        let f = hire("F", "");
        chart.link(&r, &b).unwrap();
        chart.link(&r, &c).unwrap();
        chart.link(&b, &e).unwrap();
        chart.link(&c, &f).unwrap();
        let undo_len = chart.history().undo_len();

        chart.auto_layout();
        let group_rect = chart.store().node_rect(&gx).unwrap();
        let f_rect = chart.store().node_rect(&f).unwrap();
        assert!(group_rect.intersect(f_rect).area() > 0.0);
        assert_eq!(chart.node(&f).unwrap().department, "X");
        assert_eq!(chart.node(&r).unwrap().department, "");

        // Layout and reconciliation form one history entry
        assert_eq!(chart.history().undo_len(), undo_len + 1);
        chart.undo();
        assert_eq!(chart.node(&f).unwrap().department, "");
    }

    #[test]
    fn test_unchanged_updates_record_nothing() {
        let mut chart = Chart::new();
        let g = group(&mut chart, "Sales", Rect::new(0.0, 0.0, 600.0, 400.0));
        let undo_len = chart.history().undo_len();

        assert_eq!(chart.rename_group(&g, "Sales").unwrap(), 0);
        chart.select_node(&g);
        assert!(!chart.update_selected(&NodePatch::name("Sales")));
        assert_eq!(chart.history().undo_len(), undo_len);

        assert!(chart.update_selected(&NodePatch::name("Ops")));
        assert_eq!(chart.history().undo_len(), undo_len + 1);
    }

    #[test]
    fn test_layout_empty_chart() {
        let mut chart = Chart::new();
        chart.add_node(NodeType::Note, Point::ZERO, NodePatch::default(), None);
        let undo_len = chart.history().undo_len();
        assert_eq!(chart.auto_layout(), LayoutReport::default());
        assert_eq!(chart.history().undo_len(), undo_len);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut chart = Chart::new();
        chart.load_template("corporate").unwrap();
        chart
            .add_drawing(
                &[Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(20.0, 0.0)],
                SerializableColor::black(),
                2.0,
            )
            .unwrap();
        let json = chart.export_json().unwrap();

        let mut other = Chart::new();
        let count = other.import_json(&json).unwrap();
        assert_eq!(count, chart.store().len());
        assert_eq!(other.edges(), chart.edges());
        assert_eq!(other.snapshot(), chart.snapshot());
        assert!(other.can_undo());
    }

    #[test]
    fn test_invalid_import_untouched() {
        let mut chart = Chart::new();
        employee(&mut chart, "keep", 0.0, 0.0);
        let before = chart.snapshot();
        let undo_len = chart.history().undo_len();

        for input in [
            "[]",
            "not json",
            r#"{"nodes": []}"#,
            r#"{"nodes": {}, "positions": []}"#,
            r#"{"nodes": [], "positions": [], "drawings": 3}"#,
        ] {
            assert!(
                matches!(chart.import_json(input), Err(ChartError::InvalidImport(_))),
                "{input}"
            );
        }
        assert_eq!(chart.snapshot(), before);
        assert_eq!(chart.history().undo_len(), undo_len);
    }

    #[test]
    fn test_import_rollback() {
        let mut chart = Chart::new();
        employee(&mut chart, "keep", 0.0, 0.0);
        let before = chart.snapshot();
        let undo_len = chart.history().undo_len();

        // Two-node cycle
        let json = r#"{
            "nodes": [
                ["a", {"id": "a", "type": "employee", "children": ["b"]}],
                ["b", {"id": "b", "type": "employee", "children": ["a"]}]
            ],
            "positions": [["a", {"x": 0, "y": 0}], ["b", {"x": 300, "y": 0}]]
        }"#;
        let result = chart.import_json(json);
        assert!(matches!(result, Err(ChartError::ImportRolledBack(_))));
        assert_eq!(chart.snapshot(), before);
        assert_eq!(chart.history().undo_len(), undo_len);
        assert!(!chart.can_redo());

        // Missing position
        let json = r#"{"nodes": [["a", {"id": "a", "type": "note"}]], "positions": []}"#;
        assert!(matches!(
            chart.import_json(json),
            Err(ChartError::ImportRolledBack(inner)) if matches!(*inner, ChartError::KeysetMismatch(_))
        ));
        assert_eq!(chart.snapshot(), before);
    }

    #[test]
    fn test_import_rollback_without_history() {
        let mut chart = Chart::with_config(ChartConfig {
            max_history: 0,
            ..ChartConfig::default()
        });
        employee(&mut chart, "keep", 0.0, 0.0);
        let before = chart.snapshot();

        let json = r#"{
            "nodes": [
                ["a", {"id": "a", "type": "employee", "children": ["b"]}],
                ["b", {"id": "b", "type": "employee", "children": ["a"]}]
            ],
            "positions": [["a", {"x": 0, "y": 0}], ["b", {"x": 300, "y": 0}]]
        }"#;
        assert!(matches!(
            chart.import_json(json),
            Err(ChartError::ImportRolledBack(_))
        ));
        assert_eq!(chart.snapshot(), before);
        assert!(chart.store().validate_topology().is_ok());
        assert!(!chart.can_redo());
    }

    #[test]
    fn test_import_prunes_dangling() {
        let mut chart = Chart::new();
        let json = r#"{
            "nodes": [["a", {"id": "a", "type": "manager", "children": ["ghost"]}]],
            "positions": [["a", {"x": 0, "y": 0}]]
        }"#;
        assert_eq!(chart.import_json(json).unwrap(), 1);
        assert!(chart.node("a").unwrap().children.is_empty());
    }

    #[test]
    fn test_load_template_unknown() {
        let mut chart = Chart::new();
        assert!(matches!(
            chart.load_template("nope"),
            Err(ChartError::UnknownTemplate(_))
        ));
        assert!(!chart.can_undo());

        chart.load_template("startup").unwrap();
        assert!(!chart.store().is_empty());
        assert!(chart.undo());
        assert!(chart.store().is_empty());
    }

    #[test]
    fn test_drawings() {
        let mut chart = Chart::new();
        let id = chart
            .add_drawing(
                &[Point::new(0.0, 0.0), Point::new(40.0, 0.0)],
                SerializableColor::black(),
                3.0,
            )
            .unwrap();
        assert!(chart.move_drawing(&id, 10.0, 5.0).unwrap());
        assert_eq!(chart.store().drawing(&id).unwrap().path, "M10 5 L50 5");
        assert!(!chart.move_drawing(&id, 0.0, 0.0).unwrap());
        assert!(matches!(
            chart.move_drawing("nope", 1.0, 1.0),
            Err(ChartError::DrawingNotFound(_))
        ));

        assert!(chart.select_drawing(&id));
        assert_eq!(chart.delete_selection(), 1);
        assert!(chart.store().drawings().is_empty());
    }

    #[test]
    fn test_fit_to_content() {
        let mut chart = Chart::new();
        assert!(!chart.fit_to_content(Size::new(800.0, 600.0)));

        employee(&mut chart, "a", 0.0, 0.0);
        assert!(chart.fit_to_content(Size::new(800.0, 600.0)));
        let center = chart.viewport().world_to_screen(Point::new(120.0, 50.0));
        assert!((center.x - 400.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_all_and_toggle() {
        let mut chart = Chart::new();
        let a = employee(&mut chart, "a", 0.0, 0.0);
        let b = employee(&mut chart, "b", 300.0, 0.0);
        chart.select_all();
        assert_eq!(chart.selection().nodes, vec![a.clone(), b.clone()]);

        assert!(!chart.toggle_node(&a));
        assert_eq!(chart.selection().nodes, vec![b]);
        assert!(!chart.select_node("ghost"));
    }
}
