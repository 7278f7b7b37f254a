//! Freehand drawings.

use crate::color::SerializableColor;
use crate::node::generate_id;
use crate::path::{path_bounds, smooth_path, translate_path};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Unique identifier for drawings.
pub type DrawingId = String;

/// A freehand stroke stored as an SVG-style path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawing {
    pub id: DrawingId,
    /// Path in world coordinates (`M`, `L`, `Q`, `C` commands).
    pub path: String,
    pub color: SerializableColor,
    pub stroke_width: f64,
}

impl Drawing {
    /// Create a drawing from an existing path string.
    pub fn new(path: impl Into<String>, color: SerializableColor, stroke_width: f64) -> Self {
        Self {
            id: generate_id(),
            path: path.into(),
            color,
            stroke_width,
        }
    }

    /// Create a drawing from raw pointer samples, applying the smoothing pass.
    pub fn from_points(points: &[Point], color: SerializableColor, stroke_width: f64) -> Self {
        Self::new(smooth_path(points), color, stroke_width)
    }

    /// Bounding box of the path, if it has any coordinates.
    pub fn bounds(&self) -> Option<Rect> {
        path_bounds(&self.path)
    }

    /// Move the stroke by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.path = translate_path(&self.path, delta.x, delta.y);
    }

    pub fn is_empty(&self) -> bool {
        self.bounds().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let drawing = Drawing::from_points(
            &[Point::new(0.0, 0.0), Point::new(100.0, 50.0)],
            SerializableColor::black(),
            2.0,
        );
        assert_eq!(drawing.path, "M0 0 L100 50");
        assert_eq!(drawing.bounds(), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
    }

    #[test]
    fn test_translate() {
        let mut drawing = Drawing::new("M0 0 L10 10", SerializableColor::black(), 1.0);
        drawing.translate(Vec2::new(5.0, 5.0));
        assert_eq!(drawing.path, "M5 5 L15 15");
    }

    #[test]
    fn test_empty() {
        let drawing = Drawing::from_points(&[], SerializableColor::black(), 1.0);
        assert!(drawing.is_empty());
        assert!(drawing.bounds().is_none());
    }

    #[test]
    fn test_unique_ids() {
        let a = Drawing::new("M0 0", SerializableColor::black(), 1.0);
        let b = Drawing::new("M0 0", SerializableColor::black(), 1.0);
        assert_ne!(a.id, b.id);
    }
}
