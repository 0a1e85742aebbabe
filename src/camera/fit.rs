//! Fit-to-bounds camera computation.

use super::transform::Camera;
use crate::geometry::{Bounds, Size};

/// Camera that centers `bounds` in `viewport`, leaving `padding` (a fraction
/// of the viewport) empty on each side.
///
/// Zoom is `min(usable_w / bounds_w, usable_h / bounds_h, max_zoom)`. A
/// zero-width or zero-height rectangle only constrains the other axis; a point
/// gets `max_zoom`. Returns `None` for an empty viewport.
pub fn fit_camera(bounds: &Bounds, viewport: Size, padding: f64, max_zoom: f64) -> Option<Camera> {
    if viewport.is_empty() {
        return None;
    }
    let padding = padding.clamp(0.0, 0.49);
    let usable_w = viewport.width * (1.0 - 2.0 * padding);
    let usable_h = viewport.height * (1.0 - 2.0 * padding);

    let mut z = max_zoom;
    if bounds.width > 0.0 {
        z = z.min(usable_w / bounds.width);
    }
    if bounds.height > 0.0 {
        z = z.min(usable_h / bounds.height);
    }

    let center = bounds.center();
    Some(Camera::new(
        viewport.width / 2.0 - center.x * z,
        viewport.height / 2.0 - center.y * z,
        z,
    ))
}
