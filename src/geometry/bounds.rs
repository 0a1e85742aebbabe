//! Axis-aligned rectangles and viewport sizes.

use serde::{Deserialize, Serialize};

use super::Point;

/// Viewport size in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A viewport with no area cannot host a camera fit.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Axis-aligned rectangle `{x, y, width, height}` with `(x, y)` the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn min_y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive point containment.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// Grow every side by `margin`.
    pub fn expand(&self, margin: f64) -> Bounds {
        Bounds::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let min_x = self.min_x().min(other.min_x());
        let min_y = self.min_y().min(other.min_y());
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Bounding box of the segment `a`–`b`.
    pub fn of_segment(a: Point, b: Point) -> Bounds {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        Bounds::new(min_x, min_y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Union of a sequence of rectangles, `None` when empty.
    pub fn union_all<I: IntoIterator<Item = Bounds>>(iter: I) -> Option<Bounds> {
        iter.into_iter().reduce(|acc, b| acc.union(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_all() {
        let merged = Bounds::union_all([
            Bounds::new(0.0, 0.0, 10.0, 10.0),
            Bounds::new(-5.0, 20.0, 5.0, 5.0),
        ])
        .unwrap();
        assert_eq!(merged, Bounds::new(-5.0, 0.0, 15.0, 25.0));
        assert_eq!(Bounds::union_all(std::iter::empty()), None);
    }

    #[test]
    fn test_expand_and_contains() {
        let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(!b.contains(Point::new(12.0, 5.0)));
        assert!(b.expand(3.0).contains(Point::new(12.0, 5.0)));
    }

    #[test]
    fn test_segment_bounds_any_direction() {
        let b = Bounds::of_segment(Point::new(10.0, -2.0), Point::new(4.0, 6.0));
        assert_eq!(b, Bounds::new(4.0, -2.0, 6.0, 8.0));
    }
}
