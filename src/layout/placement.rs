//! Where to put a new child around its parent.
//!
//! Pure and deterministic: the widest free angular gap around the parent
//! wins, where "occupied" means an existing sibling or the direction back
//! toward the grandparent. The grandparent direction goes in three times,
//! a hair apart, so it outweighs a single sibling.

use std::f64::consts::{PI, TAU};

use crate::config::PlacementConfig;
use crate::error::{Error, Result};
use crate::geometry::{Point, Size};
use crate::graph::{NodeTree, ParentRef};

/// Angle (radians, in `(-π, π]`) for a new child of the node centered at
/// `parent`.
pub fn choose_angle(
    parent: Point,
    grandparent: Option<Point>,
    siblings: &[Point],
    config: &PlacementConfig,
) -> f64 {
    let avoid = match grandparent {
        Some(g) if g.distance(parent) > f64::EPSILON => (g - parent).angle(),
        _ => config.root_avoid_angle,
    };

    if siblings.is_empty() {
        return normalize_signed(avoid + PI);
    }

    let mut occupied: Vec<f64> = siblings
        .iter()
        .map(|&s| normalize((s - parent).angle()))
        .collect();
    occupied.push(normalize(avoid - config.avoid_jitter));
    occupied.push(normalize(avoid));
    occupied.push(normalize(avoid + config.avoid_jitter));
    occupied.sort_by(f64::total_cmp);

    let mut best_gap = f64::NEG_INFINITY;
    let mut best_angle = avoid + PI;
    for (i, &start) in occupied.iter().enumerate() {
        let end = occupied.get(i + 1).copied().unwrap_or(occupied[0] + TAU);
        let gap = end - start;
        if gap > best_gap {
            best_gap = gap;
            best_angle = (start + end) / 2.0;
        }
    }
    normalize_signed(best_angle)
}

/// Center for a new child `distance` away from `parent` at the chosen angle.
pub fn child_center(
    parent: Point,
    grandparent: Option<Point>,
    siblings: &[Point],
    config: &PlacementConfig,
) -> Point {
    let angle = choose_angle(parent, grandparent, siblings, config);
    parent + Point::from_angle(angle) * config.child_distance
}

/// Top-left corner for a new child of `size` under `parent` in `tree`.
pub fn place_child(
    tree: &NodeTree,
    parent: &ParentRef,
    size: Size,
    config: &PlacementConfig,
) -> Result<Point> {
    let parent_center = match parent {
        ParentRef::Root => Point::ORIGIN,
        ParentRef::Node(id) => tree
            .get(id)
            .map(|node| node.center())
            .ok_or_else(|| Error::ParentNotFound(id.clone()))?,
    };
    let grandparent = match parent {
        ParentRef::Root => None,
        ParentRef::Node(id) => tree
            .get(id)
            .and_then(|node| tree.parent_center(&node.parent_id)),
    };
    let siblings: Vec<Point> = tree.children(parent).map(|n| n.center()).collect();

    let center = child_center(parent_center, grandparent, &siblings, config);
    Ok(Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0))
}

fn normalize(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

fn normalize_signed(angle: f64) -> f64 {
    let a = normalize(angle);
    if a > PI { a - TAU } else { a }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_first_child_of_root_goes_up() {
        let config = PlacementConfig::default();
        let angle = choose_angle(Point::ORIGIN, None, &[], &config);
        assert!((angle + FRAC_PI_2).abs() < 1e-12);

        let center = child_center(Point::ORIGIN, None, &[], &config);
        assert!(center.x.abs() < 1e-9);
        assert!((center.y + config.child_distance).abs() < 1e-9);
    }

    #[test]
    fn test_second_child_bisects_remaining_gap() {
        let config = PlacementConfig::default();
        let first = Point::new(0.0, -600.0);
        let angle = choose_angle(Point::ORIGIN, None, &[first], &config);
        // Two equal gaps remain (left and right); the first one scanned wins.
        assert!((angle.cos() + 1.0).abs() < 1e-3);
        assert!(angle.sin().abs() < 0.01);
    }

    #[test]
    fn test_avoids_grandparent_direction() {
        let config = PlacementConfig::default();
        // Grandparent to the left: first grandchild goes right.
        let angle = choose_angle(Point::new(600.0, 0.0), Some(Point::ORIGIN), &[], &config);
        assert!(angle.abs() < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let config = PlacementConfig::default();
        let siblings = [Point::new(100.0, 10.0), Point::new(-30.0, 90.0), Point::new(5.0, -70.0)];
        let a = choose_angle(Point::ORIGIN, Some(Point::new(0.0, 500.0)), &siblings, &config);
        let b = choose_angle(Point::ORIGIN, Some(Point::new(0.0, 500.0)), &siblings, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_place_child_in_tree() {
        let config = PlacementConfig::default();
        let mut tree = NodeTree::new();
        let size = Size::new(200.0, 100.0);

        let top_left = place_child(&tree, &ParentRef::Root, size, &config).unwrap();
        assert!((top_left.x + 100.0).abs() < 1e-9);
        assert!((top_left.y + 650.0).abs() < 1e-9);

        tree.insert(Node::new("a", ParentRef::Root, top_left.x, top_left.y, 200.0, 100.0)).unwrap();
        // a sits above the root, so its first child continues upward.
        let child = place_child(&tree, &ParentRef::from("a"), size, &config).unwrap();
        assert!((child.y + 1250.0).abs() < 1e-6);

        assert_eq!(
            place_child(&tree, &ParentRef::from("zzz"), size, &config),
            Err(Error::ParentNotFound("zzz".into()))
        );
    }
}
