//! Copy/paste with id remapping.

use crate::drawing::{Drawing, DrawingId};
use crate::geometry::Geometry;
use crate::node::{Node, NodeId, generate_id};
use crate::selection::Selection;
use crate::store::EntityStore;
use kurbo::{Point, Rect, Vec2};
use std::collections::HashMap;

/// A deep copy of one selected item.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardEntry {
    Node { node: Node, geometry: Geometry },
    Drawing { drawing: Drawing, bounds: Rect },
}

impl ClipboardEntry {
    /// Top-left corner used to compute the paste offset.
    fn origin(&self) -> Point {
        match self {
            ClipboardEntry::Node { geometry, .. } => geometry.origin(),
            ClipboardEntry::Drawing { bounds, .. } => bounds.origin(),
        }
    }
}

/// Ids created by a paste.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pasted {
    pub nodes: Vec<NodeId>,
    pub drawings: Vec<DrawingId>,
}

impl Pasted {
    pub fn to_selection(&self) -> Selection {
        Selection {
            nodes: self.nodes.clone(),
            drawings: self.drawings.clone(),
        }
    }
}

/// Internal copy buffer.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    entries: Vec<ClipboardEntry>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ClipboardEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the buffer with the selected nodes and drawings, in store order.
    ///
    /// Drawings without coordinates are skipped. Returns the number of entries copied.
    pub fn copy(&mut self, store: &EntityStore, selection: &Selection) -> usize {
        let nodes = store
            .nodes()
            .filter(|n| selection.contains_node(&n.id))
            .filter_map(|node| {
                store.geometry(&node.id).map(|geometry| ClipboardEntry::Node {
                    node: node.clone(),
                    geometry: *geometry,
                })
            });
        let drawings = store
            .drawings()
            .iter()
            .filter(|d| selection.contains_drawing(&d.id))
            .filter_map(|drawing| {
                drawing.bounds().map(|bounds| ClipboardEntry::Drawing {
                    drawing: drawing.clone(),
                    bounds,
                })
            });

        self.entries = nodes.chain(drawings).collect();
        log::debug!("Copied {} items", self.entries.len());
        self.entries.len()
    }

    /// Minimal top-left corner over all buffered items.
    pub fn origin(&self) -> Option<Point> {
        self.entries
            .iter()
            .map(ClipboardEntry::origin)
            .reduce(|a, b| Point::new(a.x.min(b.x), a.y.min(b.y)))
    }

    /// Insert fresh copies of the buffer so its top-left lands on `target`.
    ///
    /// Children are remapped to the new ids; references to nodes that were not copied are
    /// dropped. Returns `None` when the buffer is empty.
    pub fn paste(&self, store: &mut EntityStore, target: Point) -> Option<Pasted> {
        let origin = self.origin()?;
        let delta: Vec2 = target - origin;

        let remap: HashMap<&str, NodeId> = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ClipboardEntry::Node { node, .. } => Some((node.id.as_str(), generate_id())),
                ClipboardEntry::Drawing { .. } => None,
            })
            .collect();

        let mut pasted = Pasted::default();
        for entry in &self.entries {
            match entry {
                ClipboardEntry::Node { node, geometry } => {
                    let Some(new_id) = remap.get(node.id.as_str()) else {
                        continue;
                    };
                    let mut node = node.clone();
                    node.id = new_id.clone();
                    node.children = node
                        .children
                        .iter()
                        .filter_map(|child| remap.get(child.as_str()).cloned())
                        .collect();
                    let mut geometry = *geometry;
                    geometry.translate(delta);
                    store.insert(node, geometry);
                    pasted.nodes.push(new_id.clone());
                }
                ClipboardEntry::Drawing { drawing, .. } => {
                    let mut drawing = drawing.clone();
                    drawing.id = generate_id();
                    drawing.translate(delta);
                    pasted.drawings.push(drawing.id.clone());
                    store.append_drawing(drawing);
                }
            }
        }
        log::debug!(
            "Pasted {} nodes and {} drawings at ({}, {})",
            pasted.nodes.len(),
            pasted.drawings.len(),
            target.x,
            target.y
        );
        Some(pasted)
    }
}
