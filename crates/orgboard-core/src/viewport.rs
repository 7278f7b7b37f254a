//! Zoom/pan view over the chart.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Padding around content when fitting the view, in screen pixels.
pub const FIT_PADDING: f64 = 50.0;

/// Screen-space view transform: `screen = world * zoom + offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub offset: Vec2,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 4.0,
        }
    }
}

impl Viewport {
    /// Create a viewport at the origin with zoom 1.0.
    pub fn new() -> Self {
        Self::default()
    }

    /// World to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        self.transform().inverse() * screen
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world: Point) -> Point {
        self.transform() * world
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Multiply the zoom by `factor`, keeping `focus` (screen coordinates) fixed.
    pub fn zoom_at(&mut self, focus: Point, factor: f64) {
        let zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor = self.screen_to_world(focus);
        self.zoom = zoom;
        self.offset += focus - self.world_to_screen(anchor);
    }

    /// Reset pan and zoom to the defaults.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Center `bounds` in a screen of `screen` size, zooming to fit with `padding`.
    pub fn fit_to_bounds(&mut self, bounds: Rect, screen: Size, padding: f64) {
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            self.reset();
            self.offset = screen.to_vec2() / 2.0 - bounds.center().to_vec2();
            return;
        }

        let available = Size::new(
            (screen.width - padding * 2.0).max(1.0),
            (screen.height - padding * 2.0).max(1.0),
        );
        self.zoom = (available.width / bounds.width())
            .min(available.height / bounds.height())
            .clamp(self.min_zoom, self.max_zoom);
        self.offset = screen.to_vec2() / 2.0 - bounds.center().to_vec2() * self.zoom;
    }
}
