//! Lines in implicit form

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Point;

/// Determinant magnitude below which two unit-normal lines count as parallel
const PARALLEL_TOLERANCE: f64 = 1e-12;

/// A line `a·x + b·y = c` with unit normal `(a, b)`
///
/// [`side`](Line::side) is a signed distance: positive on the side the normal
/// points to. The line's direction is the normal rotated a quarter turn
/// counter-clockwise, and [`parameter`](Line::parameter) measures arc length
/// along it, which gives every line a canonical order for its points.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    a: f64,
    b: f64,
    c: f64,
}

impl Line {
    /// Create a line from implicit coefficients, normalizing `(a, b)`
    ///
    /// Returns `None` if `(a, b)` is zero or not finite.
    pub fn new(a: f64, b: f64, c: f64) -> Option<Self> {
        let norm = a.hypot(b);
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        Some(Self {
            a: a / norm,
            b: b / norm,
            c: c / norm,
        })
    }

    /// Line through two points, directed from `p` to `q`
    pub fn through(p: Point, q: Point) -> Option<Self> {
        let a = q.y - p.y;
        let b = p.x - q.x;
        Self::new(a, b, a * p.x + b * p.y)
    }

    /// Perpendicular bisector of `site` and `center`
    ///
    /// Oriented so that [`side`](Line::side) is positive for points closer to
    /// `site` than to `center`. Returns `None` when the two points are closer
    /// than `epsilon`.
    pub fn perpendicular_bisector(site: Point, center: Point, epsilon: f64) -> Option<Self> {
        let normal = site - center;
        if normal.length() <= epsilon {
            return None;
        }
        let midpoint = (site + center) * 0.5;
        Self::new(normal.x, normal.y, normal.dot(midpoint))
    }

    /// Unit normal `(a, b)`
    #[inline]
    pub fn normal(&self) -> Point {
        Point::new(self.a, self.b)
    }

    /// Unit direction along the line
    #[inline]
    pub fn direction(&self) -> Point {
        Point::new(-self.b, self.a)
    }

    /// Signed distance from the line
    #[inline]
    pub fn side(&self, point: Point) -> f64 {
        self.a * point.x + self.b * point.y - self.c
    }

    /// Position of a point along the line's direction
    #[inline]
    pub fn parameter(&self, point: Point) -> f64 {
        self.direction().dot(point)
    }

    /// Intersection point of two lines, `None` if they are parallel
    pub fn intersection(&self, other: &Line) -> Option<Point> {
        let det = self.a * other.b - other.a * self.b;
        if det.abs() < PARALLEL_TOLERANCE {
            return None;
        }
        Some(Point::new(
            (self.c * other.b - self.b * other.c) / det,
            (self.a * other.c - self.c * other.a) / det,
        ))
    }

    /// Whether two lines are the same line within `epsilon`, regardless of orientation
    pub fn coincides(&self, other: &Line, epsilon: f64) -> bool {
        let det = self.a * other.b - other.a * self.b;
        if det.abs() >= PARALLEL_TOLERANCE {
            return false;
        }
        if self.normal().dot(other.normal()) > 0.0 {
            (self.c - other.c).abs() <= epsilon
        } else {
            (self.c + other.c).abs() <= epsilon
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_through_direction_and_side() {
        let line = Line::through(Point::new(0.0, 0.0), Point::new(2.0, 0.0)).unwrap();
        assert!((line.direction() - Point::new(1.0, 0.0)).length() < TOL);
        // Normal points to the right of the direction
        assert!(line.side(Point::new(1.0, -1.0)) > 0.0);
        assert!((line.side(Point::new(1.0, 3.0)) + 3.0).abs() < TOL);
        assert!(line.parameter(Point::new(-1.0, 5.0)) < line.parameter(Point::new(1.0, 5.0)));
    }

    #[test]
    fn test_perpendicular_bisector_orientation() {
        let center = Point::new(0.0, 0.0);
        let site = Point::new(1.0, 0.0);
        let line = Line::perpendicular_bisector(site, center, 1e-9).unwrap();

        assert!(line.side(Point::new(0.5, 7.0)).abs() < TOL);
        assert!(line.side(site) > 0.0);
        assert!(line.side(center) < 0.0);
        assert!((line.side(Point::new(2.0, 0.0)) - 1.5).abs() < TOL);
    }

    #[test]
    fn test_bisector_of_coincident_points() {
        let p = Point::new(3.0, 4.0);
        assert!(Line::perpendicular_bisector(p, p, 1e-9).is_none());
    }

    #[test]
    fn test_intersection() {
        let x = Line::new(1.0, 0.0, 0.5).unwrap();
        let diagonal = Line::new(1.0, 1.0, 10.0).unwrap();
        let p = x.intersection(&diagonal).unwrap();
        assert!((p - Point::new(0.5, 9.5)).length() < 1e-9);
    }

    #[test]
    fn test_parallel_lines_do_not_intersect() {
        let a = Line::new(1.0, 0.0, 0.5).unwrap();
        let b = Line::new(-2.0, 0.0, 10.0).unwrap();
        assert!(a.intersection(&b).is_none());
        assert!(!a.coincides(&b, 1e-9));
    }

    #[test]
    fn test_coincides_ignores_orientation() {
        let a = Line::new(1.0, 0.0, 0.5).unwrap();
        let flipped = Line::new(-2.0, 0.0, -1.0).unwrap();
        assert!(a.coincides(&flipped, 1e-9));
    }

    #[test]
    fn test_zero_normal_rejected() {
        assert!(Line::new(0.0, 0.0, 1.0).is_none());
        assert!(Line::through(Point::new(1.0, 1.0), Point::new(1.0, 1.0)).is_none());
    }
}
