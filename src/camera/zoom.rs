//! Zoom math: exponential wheel response, elastic clamping and
//! cursor-anchored zoom.

use super::transform::Camera;
use crate::config::CameraConfig;
use crate::geometry::Point;

/// Raw zoom after a wheel step: `z − delta·k·z`.
///
/// Proportional to the current zoom so every step feels the same at any
/// scale. Positive deltas (scrolling down) zoom out.
#[inline]
pub fn wheel_zoom(z: f64, delta: f64, sensitivity: f64) -> f64 {
    z - delta * sensitivity * z
}

/// Soft bound: identity inside `[min, max]`, `tanh` compression outside.
///
/// Above `max` the result approaches `max + radius_above` without reaching it
/// for any finite input; below `min` it approaches `min − radius_below`.
pub fn elastic_clamp(raw: f64, min: f64, max: f64, radius_below: f64, radius_above: f64) -> f64 {
    if raw > max {
        if radius_above <= 0.0 {
            return max;
        }
        max + radius_above * ((raw - max) / radius_above).tanh()
    } else if raw < min {
        if radius_below <= 0.0 {
            return min;
        }
        min - radius_below * ((min - raw) / radius_below).tanh()
    } else {
        raw
    }
}

/// [`elastic_clamp`] with the limits from `config`, hard-clipped to the
/// absolute bounds so rounding can never escape them.
pub fn elastic_zoom(raw: f64, config: &CameraConfig) -> f64 {
    let z = elastic_clamp(
        raw,
        config.min_zoom,
        config.max_zoom,
        config.elastic_radius_below,
        config.elastic_radius_above,
    );
    z.clamp(config.hard_min_zoom(), config.hard_max_zoom())
}

/// Camera at zoom `new_z` keeping the canvas point under `anchor` (screen)
/// where it is.
pub fn zoom_about(camera: &Camera, anchor: Point, new_z: f64) -> Camera {
    let canvas = camera.screen_to_canvas(anchor);
    let offset = anchor - canvas * new_z;
    Camera::new(offset.x, offset.y, new_z)
}

/// True when `z` lies in the comfortable range.
pub fn is_comfortable(z: f64, config: &CameraConfig) -> bool {
    z >= config.min_zoom && z <= config.max_zoom
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_elastic_identity_inside_range() {
        assert_eq!(elastic_clamp(1.0, 0.1, 2.0, 0.05, 0.5), 1.0);
        assert_eq!(elastic_clamp(2.0, 0.1, 2.0, 0.05, 0.5), 2.0);
    }

    #[test]
    fn test_elastic_resists_overshoot() {
        let a = elastic_clamp(2.5, 0.1, 2.0, 0.05, 0.5);
        let b = elastic_clamp(5.0, 0.1, 2.0, 0.05, 0.5);
        let c = elastic_clamp(1.0e6, 0.1, 2.0, 0.05, 0.5);
        assert!(a > 2.0 && a < 2.5);
        assert!(b > a && b < 2.5);
        assert!(c <= 2.5);
        let below = elastic_clamp(-10.0, 0.1, 2.0, 0.05, 0.5);
        assert!(below >= 0.0499 && below < 0.1);
    }

    #[test]
    fn test_wheel_zoom_is_proportional() {
        let small = wheel_zoom(0.5, -100.0, 0.001);
        let large = wheel_zoom(2.0, -100.0, 0.001);
        assert!((small / 0.5 - large / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_about_keeps_anchor() {
        let camera = Camera::new(40.0, -20.0, 1.0);
        let anchor = Point::new(300.0, 200.0);
        let zoomed = zoom_about(&camera, anchor, 1.5);
        let before = camera.screen_to_canvas(anchor);
        let after = zoomed.screen_to_canvas(anchor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
        assert_eq!(zoomed.z, 1.5);
    }

    proptest! {
        #[test]
        fn prop_fixed_point_zoom(
            x in -5000.0f64..5000.0,
            y in -5000.0f64..5000.0,
            z in 0.06f64..2.4,
            delta in -2000.0f64..2000.0,
            cx in 0.0f64..2000.0,
            cy in 0.0f64..1200.0,
        ) {
            let config = CameraConfig::default();
            let camera = Camera::new(x, y, z);
            let cursor = Point::new(cx, cy);
            let new_z = elastic_zoom(wheel_zoom(z, delta, config.wheel_sensitivity), &config);
            let zoomed = zoom_about(&camera, cursor, new_z);
            let before = camera.screen_to_canvas(cursor);
            let after = zoomed.screen_to_canvas(cursor);
            let tolerance = 1e-6 * (1.0 + before.x.abs().max(before.y.abs()));
            prop_assert!((before.x - after.x).abs() <= tolerance);
            prop_assert!((before.y - after.y).abs() <= tolerance);
        }

        #[test]
        fn prop_elastic_zoom_within_hard_bounds(
            deltas in proptest::collection::vec(-3000.0f64..3000.0, 1..40),
        ) {
            let config = CameraConfig::default();
            let mut z = 1.0;
            for delta in deltas {
                z = elastic_zoom(wheel_zoom(z, delta, config.wheel_sensitivity), &config);
                prop_assert!(z >= config.hard_min_zoom() && z <= config.hard_max_zoom());
            }
        }
    }
}
