//! Bounding frame triangle

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Line, Point};

/// A directed edge of the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Start point
    pub from: Point,
    /// End point
    pub to: Point,
}

impl Edge {
    /// Line carrying this edge, directed from `from` to `to`
    pub fn line(&self) -> Option<Line> {
        Line::through(self.from, self.to)
    }
}

/// Frame triangle that contains every site of a computation
///
/// Its three edges become the boundary bisectors of the graph.
///
/// # Example
///
/// ```
/// use order_voronoi::{Point, Triangle};
///
/// let stations = [Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
/// let frame = Triangle::enclosing(&stations, 0.5).unwrap();
/// assert!(stations.iter().all(|&p| frame.contains_strictly(p, 1e-9)));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First corner
    pub a: Point,
    /// Second corner
    pub b: Point,
    /// Third corner
    pub c: Point,
}

impl Triangle {
    /// Create a triangle from three corners
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        Self { a, b, c }
    }

    /// Right triangle strictly containing the bounding box of `points` grown by `margin`
    ///
    /// Returns `None` for an empty point set, a non-positive margin or
    /// non-finite coordinates.
    pub fn enclosing(points: &[Point], margin: f64) -> Option<Self> {
        if margin <= 0.0 || !margin.is_finite() {
            return None;
        }
        let (min, max) = points.iter().copied().fold(None, |acc, p| match acc {
            Some((min, max)) => Some((p.min(min), p.max(max))),
            None => Some((p, p)),
        })?;
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        // Every box point satisfies (x - x0) + (y - y0) < span
        let origin = min - Point::splat(margin);
        let span = (max.x - origin.x) + (max.y - origin.y) + margin;
        Some(Self::new(
            origin,
            origin + Point::new(span, 0.0),
            origin + Point::new(0.0, span),
        ))
    }

    /// The three corners in order
    #[inline]
    pub fn corners(&self) -> [Point; 3] {
        [self.a, self.b, self.c]
    }

    /// The three directed edges `a→b`, `b→c`, `c→a`
    pub fn edges(&self) -> [Edge; 3] {
        [
            Edge { from: self.a, to: self.b },
            Edge { from: self.b, to: self.c },
            Edge { from: self.c, to: self.a },
        ]
    }

    /// Signed area, positive for counter-clockwise corners
    pub fn signed_area(&self) -> f64 {
        0.5 * (self.b - self.a).perp_dot(self.c - self.a)
    }

    /// Whether the triangle's area is at most `epsilon`
    #[inline]
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        let area = self.signed_area();
        !area.is_finite() || area.abs() <= epsilon
    }

    /// Edge lines paired with the sign of [`Line::side`] on the interior
    ///
    /// Returns `None` when two corners coincide.
    pub fn boundary(&self) -> Option<[(Line, f64); 3]> {
        let corners = self.corners();
        let edges = self.edges();
        let entry = |i: usize| -> Option<(Line, f64)> {
            let line = edges[i].line()?;
            // Edge i is opposite corner i + 2
            Some((line, line.side(corners[(i + 2) % 3]).signum()))
        };
        Some([entry(0)?, entry(1)?, entry(2)?])
    }

    /// Whether `point` lies inside or within `epsilon` of the triangle
    pub fn contains(&self, point: Point, epsilon: f64) -> bool {
        self.interior_distance(point)
            .map_or(false, |distance| distance >= -epsilon)
    }

    /// Whether `point` lies inside and farther than `epsilon` from every edge
    pub fn contains_strictly(&self, point: Point, epsilon: f64) -> bool {
        self.interior_distance(point)
            .map_or(false, |distance| distance > epsilon)
    }

    /// Smallest signed distance to the edges, positive inside
    fn interior_distance(&self, point: Point) -> Option<f64> {
        let boundary = self.boundary()?;
        Some(
            boundary
                .iter()
                .map(|(line, sign)| line.side(point) * sign)
                .fold(f64::INFINITY, f64::min),
        )
    }
}
