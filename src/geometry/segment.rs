//! Point-to-segment projection used by the edge hit-tester.

use super::Point;

/// Closest point on segment `a`–`b` to `p`.
///
/// Uses the clamped projection parameter
/// `t = clamp((p − a)·(b − a) / |b − a|², 0, 1)`. A zero-length segment
/// collapses to `a`.
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> Point {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f64::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_interior() {
        let c = closest_point_on_segment(
            Point::new(5.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert_eq!(c, Point::new(5.0, 0.0));
    }

    #[test]
    fn test_projection_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(closest_point_on_segment(Point::new(-4.0, 1.0), a, b), a);
        assert_eq!(closest_point_on_segment(Point::new(14.0, 1.0), a, b), b);
    }

    #[test]
    fn test_degenerate_segment() {
        let a = Point::new(2.0, 2.0);
        assert_eq!(closest_point_on_segment(Point::new(9.0, 9.0), a, a), a);
    }
}
