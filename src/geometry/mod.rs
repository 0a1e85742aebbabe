//! Geometry primitives: points, rectangles and segment projection.

mod bounds;
mod point;
mod segment;

pub use bounds::{Bounds, Size};
pub use point::Point;
pub use segment::closest_point_on_segment;
