//! Tunable constants and the config structs they seed.
//!
//! Units: screen values are CSS pixels, canvas values are canvas units (equal
//! to pixels at zoom 1.0), angles are radians, rates are per second.

use serde::{Deserialize, Serialize};

// =============================================================================
// Camera
// =============================================================================

/// Lower edge of the comfortable zoom range. Settled cameras never go below it.
pub const COMFORT_MIN_ZOOM: f64 = 0.1;

/// Upper edge of the comfortable zoom range for the default context.
pub const COMFORT_MAX_ZOOM: f64 = 2.0;

/// Rubber-band radius below `COMFORT_MIN_ZOOM` (zoom units).
pub const ELASTIC_RADIUS_BELOW: f64 = 0.05;

/// Rubber-band radius above `COMFORT_MAX_ZOOM` (zoom units).
pub const ELASTIC_RADIUS_ABOVE: f64 = 0.5;

/// Absolute zoom floor. The elastic clamp approaches it but never reaches it.
pub const MIN_ZOOM: f64 = COMFORT_MIN_ZOOM - ELASTIC_RADIUS_BELOW;

/// Absolute zoom ceiling.
pub const MAX_ZOOM: f64 = COMFORT_MAX_ZOOM + ELASTIC_RADIUS_ABOVE;

/// Relative zoom change per wheel delta unit (mouse wheel).
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.0015;

/// Relative zoom change per wheel delta unit for pinch / ctrl+wheel.
pub const PINCH_ZOOM_SENSITIVITY: f64 = 0.01;

/// Exponential smoothing rate for fly-to animations (1/s).
pub const FLY_TO_SPEED: f64 = 10.0;

/// Exponential smoothing rate when snapping back into the comfortable range (1/s).
pub const SNAP_BACK_SPEED: f64 = 20.0;

/// Delay after the last zoom event before an out-of-range zoom snaps back (ms).
pub const SNAP_BACK_DELAY_MS: f64 = 150.0;

/// Idle window after the last input before the live camera is committed (ms).
pub const CAMERA_SETTLE_MS: f64 = 300.0;

/// Fly-to terminates once the offset is closer than this (screen px).
pub const FLY_TO_POSITION_EPSILON: f64 = 0.5;

/// Fly-to terminates once the zoom is closer than this.
pub const FLY_TO_ZOOM_EPSILON: f64 = 0.001;

/// Fraction of the viewport left empty on each side by fit-to-bounds.
pub const FIT_PADDING_FRACTION: f64 = 0.1;

/// Fit-to-bounds never zooms in further than this.
pub const FIT_MAX_ZOOM: f64 = 1.0;

/// Camera positions remembered for "navigate back".
pub const NAVIGATION_HISTORY_LIMIT: usize = 50;

// =============================================================================
// Animation
// =============================================================================

/// Largest elapsed time a single frame may advance by (ms).
pub const MAX_FRAME_STEP_MS: f64 = 100.0;

// =============================================================================
// Tree
// =============================================================================

/// Radius of the root marker drawn at the canvas origin (canvas units).
pub const ROOT_RADIUS: f64 = 40.0;

/// Removed nodes remembered for undo.
pub const UNDO_HISTORY_LIMIT: usize = 50;

// =============================================================================
// Force layout
// =============================================================================

/// Force per canvas unit of overlap between two padded bodies.
pub const REPULSION_STRENGTH: f64 = 4.0;

/// Force per canvas unit a child sits beyond `TARGET_DISTANCE` from its parent.
pub const ATTRACTION_STRENGTH: f64 = 1.5;

/// Share of the attraction applied back onto the parent (dimensionless).
pub const PARENT_PULL_FRACTION: f64 = 0.2;

/// Parent-child center distance beyond which attraction kicks in (canvas units).
pub const TARGET_DISTANCE: f64 = 600.0;

/// Extra margin added to both extents in the overlap test (canvas units).
pub const FORCE_PADDING: f64 = 40.0;

/// Per-body displacement cap (canvas units per simulated second).
pub const MAX_SPEED: f64 = 600.0;

pub const DEFAULT_SPEED_MULTIPLIER: f64 = 1.0;
pub const MIN_SPEED_MULTIPLIER: f64 = 0.25;
pub const MAX_SPEED_MULTIPLIER: f64 = 8.0;

/// Centers closer than this are treated as coincident (canvas units).
pub const COINCIDENT_DISTANCE: f64 = 0.1;

/// Accumulated forces below this magnitude are ignored.
pub const NEGLIGIBLE_FORCE: f64 = 1e-3;

/// Displacements below this magnitude are dropped (canvas units).
pub const MIN_DISPLACEMENT: f64 = 0.01;

// =============================================================================
// Placement
// =============================================================================

/// Distance from parent center to a new child's center (canvas units).
pub const CHILD_DISTANCE: f64 = 600.0;

/// Avoid direction used when the parent is the root: straight down.
pub const ROOT_AVOID_ANGLE: f64 = std::f64::consts::FRAC_PI_2;

/// Spread of the three copies of the avoid angle (radians).
pub const AVOID_ANGLE_JITTER: f64 = 0.01;

// =============================================================================
// Edge hover
// =============================================================================

/// Maximum pointer distance from a connector that still counts as hovering it (screen px).
pub const EDGE_HOVER_THRESHOLD_PX: f64 = 12.0;

/// Hover points this close to a node or the root marker are suppressed (screen px).
pub const EDGE_EXCLUSION_MARGIN_PX: f64 = 16.0;

// =============================================================================
// Config structs
// =============================================================================

/// Camera behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub elastic_radius_below: f64,
    pub elastic_radius_above: f64,
    pub wheel_sensitivity: f64,
    pub pinch_sensitivity: f64,
    pub fly_to_speed: f64,
    pub snap_back_speed: f64,
    pub snap_back_delay_ms: f64,
    pub settle_ms: f64,
    pub fit_padding: f64,
    pub fit_max_zoom: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: COMFORT_MIN_ZOOM,
            max_zoom: COMFORT_MAX_ZOOM,
            elastic_radius_below: ELASTIC_RADIUS_BELOW,
            elastic_radius_above: ELASTIC_RADIUS_ABOVE,
            wheel_sensitivity: WHEEL_ZOOM_SENSITIVITY,
            pinch_sensitivity: PINCH_ZOOM_SENSITIVITY,
            fly_to_speed: FLY_TO_SPEED,
            snap_back_speed: SNAP_BACK_SPEED,
            snap_back_delay_ms: SNAP_BACK_DELAY_MS,
            settle_ms: CAMERA_SETTLE_MS,
            fit_padding: FIT_PADDING_FRACTION,
            fit_max_zoom: FIT_MAX_ZOOM,
        }
    }
}

impl CameraConfig {
    /// Lowest zoom the elastic clamp can approach.
    pub fn hard_min_zoom(&self) -> f64 {
        (self.min_zoom - self.elastic_radius_below).max(f64::EPSILON)
    }

    /// Highest zoom the elastic clamp can approach.
    pub fn hard_max_zoom(&self) -> f64 {
        self.max_zoom + self.elastic_radius_above
    }
}

/// Force-directed layout tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceConfig {
    pub repulsion_strength: f64,
    pub attraction_strength: f64,
    pub parent_pull_fraction: f64,
    pub target_distance: f64,
    pub padding: f64,
    pub max_speed: f64,
    pub min_speed_multiplier: f64,
    pub max_speed_multiplier: f64,
    pub root_radius: f64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            repulsion_strength: REPULSION_STRENGTH,
            attraction_strength: ATTRACTION_STRENGTH,
            parent_pull_fraction: PARENT_PULL_FRACTION,
            target_distance: TARGET_DISTANCE,
            padding: FORCE_PADDING,
            max_speed: MAX_SPEED,
            min_speed_multiplier: MIN_SPEED_MULTIPLIER,
            max_speed_multiplier: MAX_SPEED_MULTIPLIER,
            root_radius: ROOT_RADIUS,
        }
    }
}

/// Child placement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementConfig {
    pub child_distance: f64,
    pub root_avoid_angle: f64,
    pub avoid_jitter: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            child_distance: CHILD_DISTANCE,
            root_avoid_angle: ROOT_AVOID_ANGLE,
            avoid_jitter: AVOID_ANGLE_JITTER,
        }
    }
}

/// Edge hover tuning. Both distances are in screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeHoverConfig {
    pub threshold_px: f64,
    pub exclusion_margin_px: f64,
    pub root_radius: f64,
}

impl Default for EdgeHoverConfig {
    fn default() -> Self {
        Self {
            threshold_px: EDGE_HOVER_THRESHOLD_PX,
            exclusion_margin_px: EDGE_EXCLUSION_MARGIN_PX,
            root_radius: ROOT_RADIUS,
        }
    }
}

/// Everything the engine can be configured with. Missing fields fall back to
/// the constants above.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    pub camera: CameraConfig,
    pub force: ForceConfig,
    pub placement: PlacementConfig,
    pub edge_hover: EdgeHoverConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_bounds_wrap_comfortable_range() {
        let config = CameraConfig::default();
        assert!(config.hard_min_zoom() < config.min_zoom);
        assert!(config.hard_max_zoom() > config.max_zoom);
        assert!((config.hard_min_zoom() - MIN_ZOOM).abs() < 1e-12);
        assert!((config.hard_max_zoom() - MAX_ZOOM).abs() < 1e-12);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CanvasConfig =
            serde_json::from_str(r#"{"force": {"targetDistance": 300}}"#).unwrap();
        assert_eq!(config.force.target_distance, 300.0);
        assert_eq!(config.force.padding, FORCE_PADDING);
        assert_eq!(config.camera, CameraConfig::default());
    }
}
