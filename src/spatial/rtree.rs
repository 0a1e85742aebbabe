//! R-tree over node rectangles using the rstar crate.
//!
//! Provides O(log n) queries for:
//! - Topmost node under a point
//! - Rectangle intersection
//! - "Is anything within this margin of a point"

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::geometry::{Bounds, Point};
use crate::graph::{Node, NodeId};

/// A node rectangle in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRect {
    pub id: NodeId,
    pub bounds: Bounds,
    pub z_index: u32,
    /// Insertion order, used to break z-index ties.
    pub order: usize,
}

impl RTreeObject for NodeRect {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bounds.min_x(), self.bounds.min_y()],
            [self.bounds.max_x(), self.bounds.max_y()],
        )
    }
}

impl PointDistance for NodeRect {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope().distance_2(point)
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.bounds.contains(Point::new(point[0], point[1]))
    }
}

/// Spatial index of node rectangles, rebuilt from the tree when positions
/// change.
pub struct SpatialIndex {
    tree: RTree<NodeRect>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Rebuild from nodes in insertion order.
    ///
    /// Bulk loading is cheaper than incremental inserts when most rectangles
    /// moved, which is the common case while the layout runs.
    pub fn rebuild<'a>(&mut self, nodes: impl IntoIterator<Item = &'a Node>) {
        let rects: Vec<_> = nodes
            .into_iter()
            .enumerate()
            .map(|(order, node)| NodeRect {
                id: node.id.clone(),
                bounds: node.bounds(),
                z_index: node.z_index,
                order,
            })
            .collect();
        self.tree = RTree::bulk_load(rects);
    }

    /// Topmost node containing `point`: highest z-index, later insertion on
    /// ties.
    pub fn node_at(&self, point: Point) -> Option<&NodeId> {
        self.tree
            .locate_all_at_point(&[point.x, point.y])
            .max_by_key(|rect| (rect.z_index, rect.order))
            .map(|rect| &rect.id)
    }

    /// Every node whose rectangle intersects `bounds`.
    pub fn intersecting(&self, bounds: &Bounds) -> Vec<&NodeId> {
        let envelope = AABB::from_corners(
            [bounds.min_x(), bounds.min_y()],
            [bounds.max_x(), bounds.max_y()],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|rect| &rect.id)
            .collect()
    }

    /// True if `point` lies inside some node rectangle expanded by `margin`.
    pub fn any_within(&self, point: Point, margin: f64) -> bool {
        let margin = margin.max(0.0);
        self.tree
            .locate_within_distance([point.x, point.y], margin * margin)
            .next()
            .is_some()
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
