//! The camera transform and screen ⇄ canvas conversion.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Viewport transform: `screen = canvas · z + (x, y)`.
///
/// `(x, y)` is where the canvas origin sits on screen, `z` the zoom scale
/// (1.0 = 100%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Camera {
    pub const IDENTITY: Camera = Camera {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        screen_to_canvas(screen, self)
    }

    #[inline]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        canvas_to_screen(canvas, self)
    }

    /// CSS transform for the render surface. Expects `transform-origin: 0 0`.
    pub fn css_transform(&self) -> String {
        format!("translate({}px, {}px) scale({})", self.x, self.y, self.z)
    }

    /// Component-wise linear interpolation.
    pub fn lerp(&self, target: &Camera, t: f64) -> Camera {
        let offset = self.offset().lerp(target.offset(), t);
        Camera::new(offset.x, offset.y, self.z + (target.z - self.z) * t)
    }

    /// Screen-space distance between the two offsets.
    pub fn offset_distance(&self, other: &Camera) -> f64 {
        self.offset().distance(other.offset())
    }

    pub fn zoom_distance(&self, other: &Camera) -> f64 {
        (self.z - other.z).abs()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `canvas = (screen − (x, y)) / z`
#[inline]
pub fn screen_to_canvas(screen: Point, camera: &Camera) -> Point {
    (screen - camera.offset()) / camera.z
}

/// `screen = canvas · z + (x, y)`
#[inline]
pub fn canvas_to_screen(canvas: Point, camera: &Camera) -> Point {
    canvas * camera.z + camera.offset()
}
