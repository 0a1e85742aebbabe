//! Edge hit-testing: which parent→child connector is the pointer hovering?
//!
//! Connectors run from the parent's center (the origin for root children)
//! to the child's center. The hovered connector is the globally nearest one
//! within a screen-space threshold, unless its closest point sits on or near
//! a node, in which case there is no hover at all.

use serde::Serialize;

use super::rtree::SpatialIndex;
use crate::camera::Camera;
use crate::config::EdgeHoverConfig;
use crate::geometry::{Bounds, Point, closest_point_on_segment};
use crate::graph::{NodeId, NodeTree, ParentRef};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoveredEdge {
    pub parent_id: ParentRef,
    pub child_id: NodeId,
    /// Closest point on the connector, in canvas space.
    pub point: Point,
}

/// Nearest connector to `cursor` (canvas space) at zoom `zoom`.
///
/// Threshold and exclusion margin in `config` are screen pixels; they are
/// divided by the zoom so the hover band looks the same at any scale.
/// Equal distances resolve to the first connector in node insertion order.
pub fn find_hovered_edge(
    tree: &NodeTree,
    spatial: &SpatialIndex,
    cursor: Point,
    zoom: f64,
    config: &EdgeHoverConfig,
) -> Option<HoveredEdge> {
    if !(zoom > 0.0) || !cursor.x.is_finite() || !cursor.y.is_finite() {
        return None;
    }
    if spatial.node_at(cursor).is_some() {
        return None;
    }

    let threshold = config.threshold_px / zoom;
    let margin = config.exclusion_margin_px / zoom;

    let mut best: Option<(f64, Point, &ParentRef, &NodeId)> = None;
    for node in tree.iter() {
        let Some(a) = tree.parent_center(&node.parent_id) else {
            continue;
        };
        let b = node.center();
        if !Bounds::of_segment(a, b).expand(threshold).contains(cursor) {
            continue;
        }
        let closest = closest_point_on_segment(cursor, a, b);
        let distance = cursor.distance(closest);
        if distance >= threshold {
            continue;
        }
        if best.is_none_or(|(d, ..)| distance < d) {
            best = Some((distance, closest, &node.parent_id, &node.id));
        }
    }

    let (_, point, parent_id, child_id) = best?;
    if spatial.any_within(point, margin) || point.length() <= config.root_radius + margin {
        return None;
    }
    Some(HoveredEdge {
        parent_id: parent_id.clone(),
        child_id: child_id.clone(),
        point,
    })
}

/// Per-frame hover state around [`find_hovered_edge`].
#[derive(Debug, Default)]
pub struct EdgeHitTester {
    enabled: bool,
    dragging: bool,
    pointer: Option<Point>,
    hovered: Option<HoveredEdge>,
}

impl EdgeHitTester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.hovered = None;
        }
    }

    /// Suspend hit-testing while another drag owns the pointer.
    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
        if dragging {
            self.hovered = None;
        }
    }

    /// Latest pointer position in screen space.
    pub fn pointer_move(&mut self, screen: Point) {
        self.pointer = Some(screen);
    }

    /// The pointer left the canvas.
    pub fn pointer_leave(&mut self) {
        self.pointer = None;
        self.hovered = None;
    }

    /// Drop the current hover after the tree changed under it. The next
    /// update recomputes it from the same pointer.
    pub fn invalidate(&mut self) {
        self.hovered = None;
    }

    pub fn hovered(&self) -> Option<&HoveredEdge> {
        self.hovered.as_ref()
    }

    /// Recompute the hover for this frame. Returns true when it changed.
    pub fn update(
        &mut self,
        tree: &NodeTree,
        spatial: &SpatialIndex,
        camera: &Camera,
        config: &EdgeHoverConfig,
    ) -> bool {
        let next = match self.pointer {
            Some(screen) if self.enabled && !self.dragging => {
                let cursor = camera.screen_to_canvas(screen);
                find_hovered_edge(tree, spatial, cursor, camera.z, config)
            }
            _ => None,
        };
        if next == self.hovered {
            return false;
        }
        tracing::trace!(hovered = ?next.as_ref().map(|h| &h.child_id), "edge hover changed");
        self.hovered = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    // a sits straight right of the root, b straight right of a.
    fn fixture() -> (NodeTree, SpatialIndex) {
        let mut tree = NodeTree::new();
        tree.insert(Node::new("a", ParentRef::Root, 550.0, -50.0, 100.0, 100.0)).unwrap();
        tree.insert(Node::new("b", ParentRef::from("a"), 1150.0, -50.0, 100.0, 100.0)).unwrap();
        let mut spatial = SpatialIndex::new();
        spatial.rebuild(tree.iter());
        (tree, spatial)
    }

    #[test]
    fn test_hover_near_connector() {
        let (tree, spatial) = fixture();
        let config = EdgeHoverConfig::default();

        let hit = find_hovered_edge(&tree, &spatial, Point::new(300.0, 5.0), 1.0, &config).unwrap();
        assert_eq!(hit.parent_id, ParentRef::Root);
        assert_eq!(hit.child_id.as_str(), "a");
        assert_eq!(hit.point, Point::new(300.0, 0.0));

        let hit = find_hovered_edge(&tree, &spatial, Point::new(900.0, -4.0), 1.0, &config).unwrap();
        assert_eq!(hit.parent_id, ParentRef::from("a"));
        assert_eq!(hit.child_id.as_str(), "b");
    }

    #[test]
    fn test_threshold_scales_with_zoom() {
        let (tree, spatial) = fixture();
        let config = EdgeHoverConfig::default();
        let cursor = Point::new(300.0, 20.0);

        assert!(find_hovered_edge(&tree, &spatial, cursor, 1.0, &config).is_none());
        assert!(find_hovered_edge(&tree, &spatial, cursor, 0.5, &config).is_some());
    }

    #[test]
    fn test_suppressed_near_nodes_and_root() {
        let (tree, spatial) = fixture();
        let config = EdgeHoverConfig::default();

        // Inside node a: over a node.
        assert!(find_hovered_edge(&tree, &spatial, Point::new(600.0, 0.0), 1.0, &config).is_none());
        // On the segment but within the exclusion margin of node a.
        assert!(find_hovered_edge(&tree, &spatial, Point::new(540.0, 0.0), 1.0, &config).is_none());
        // Within the root circle plus margin.
        assert!(find_hovered_edge(&tree, &spatial, Point::new(50.0, 0.0), 1.0, &config).is_none());
    }

    #[test]
    fn test_equal_distance_first_wins() {
        let mut tree = NodeTree::new();
        tree.insert(Node::new("up", ParentRef::Root, -50.0, -650.0, 100.0, 100.0)).unwrap();
        tree.insert(Node::new("right", ParentRef::Root, 550.0, -50.0, 100.0, 100.0)).unwrap();
        let mut spatial = SpatialIndex::new();
        spatial.rebuild(tree.iter());
        let config = EdgeHoverConfig {
            root_radius: 0.0,
            exclusion_margin_px: 0.0,
            ..EdgeHoverConfig::default()
        };

        // Equidistant from both connectors.
        let hit = find_hovered_edge(&tree, &spatial, Point::new(5.0, -5.0), 1.0, &config).unwrap();
        assert_eq!(hit.child_id.as_str(), "up");
    }

    #[test]
    fn test_orphans_and_empty_tree() {
        let config = EdgeHoverConfig::default();
        let tree = NodeTree::from_nodes(vec![Node::new("o", ParentRef::from("gone"), 500.0, 0.0, 10.0, 10.0)]);
        let spatial = SpatialIndex::new();
        assert!(find_hovered_edge(&tree, &spatial, Point::new(250.0, 0.0), 1.0, &config).is_none());
        assert!(find_hovered_edge(&NodeTree::new(), &spatial, Point::new(250.0, 0.0), 1.0, &config).is_none());
    }

    #[test]
    fn test_hit_tester_state() {
        let (tree, spatial) = fixture();
        let config = EdgeHoverConfig::default();
        let camera = Camera::IDENTITY;
        let mut tester = EdgeHitTester::new();

        tester.pointer_move(Point::new(300.0, 5.0));
        assert!(!tester.update(&tree, &spatial, &camera, &config));
        assert!(tester.hovered().is_none());

        tester.set_enabled(true);
        assert!(tester.update(&tree, &spatial, &camera, &config));
        assert_eq!(tester.hovered().map(|h| h.child_id.as_str()), Some("a"));
        assert!(!tester.update(&tree, &spatial, &camera, &config));

        tester.set_dragging(true);
        assert!(tester.hovered().is_none());
        tester.update(&tree, &spatial, &camera, &config);
        assert!(tester.hovered().is_none());

        tester.set_dragging(false);
        tester.update(&tree, &spatial, &camera, &config);
        assert!(tester.hovered().is_some());

        tester.pointer_leave();
        assert!(tester.hovered().is_none());
    }
}
