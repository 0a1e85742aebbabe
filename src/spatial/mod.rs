//! Spatial queries.
//!
//! An R-tree over node rectangles for point and margin tests, and the
//! edge hit-tester that uses it to keep hover indicators off real nodes.

mod edge_hover;
mod rtree;

pub use edge_hover::{EdgeHitTester, HoveredEdge, find_hovered_edge};
pub use rtree::{NodeRect, SpatialIndex};
