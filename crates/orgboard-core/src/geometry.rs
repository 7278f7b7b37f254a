//! Node geometry and rectangle helpers.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Position and optional size of a node in world coordinates.
///
/// When `width`/`height` are absent the node type's default size applies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Geometry {
    /// Geometry at a position with the type default size.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            width: None,
            height: None,
        }
    }

    /// Geometry with an explicit size.
    pub fn sized(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Resolved size, falling back to `default` per missing dimension.
    pub fn size(&self, default: Size) -> Size {
        Size::new(
            self.width.unwrap_or(default.width),
            self.height.unwrap_or(default.height),
        )
    }

    /// Rectangle covered by this geometry.
    pub fn rect(&self, default: Size) -> Rect {
        Rect::from_origin_size(self.origin(), self.size(default))
    }

    /// Move by a delta, keeping the size.
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

/// Area of the intersection of two rectangles (zero when disjoint or only touching).
pub fn overlap_area(a: Rect, b: Rect) -> f64 {
    let overlap = a.intersect(b);
    if overlap.width() <= 0.0 || overlap.height() <= 0.0 {
        return 0.0;
    }
    overlap.area()
}

/// Union of a sequence of rectangles.
pub fn union_rects(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}
