//! Order-k polygon
//!
//! Result of one order of a computation: the boundary of the region where
//! the center is among the `k` nearest sites.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Site};

/// Boundary of the order-k region around the center
///
/// # Example
///
/// ```
/// use order_voronoi::{OrderPolygon, Point};
///
/// let polygon: OrderPolygon<()> = OrderPolygon::new(
///     1,
///     vec![
///         Point::new(0.0, 0.0),
///         Point::new(2.0, 0.0),
///         Point::new(2.0, 2.0),
///         Point::new(0.0, 2.0),
///     ],
///     vec![],
///     vec![],
/// );
/// assert_eq!(polygon.area(), 4.0);
/// assert!(polygon.contains(Point::new(1.0, 1.0)));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPolygon<T> {
    /// The order `k`, starting at 1
    pub order: u32,

    /// Polygon vertices in walk order, without repeating the first vertex
    ///
    /// The walk direction is the same for every order of a computation but
    /// is not guaranteed to be counter-clockwise.
    pub vertices: Vec<Point>,

    /// Distinct sites whose bisectors pass through a vertex, in walk order
    ///
    /// These are the sites whose neighbors are requested when the next order
    /// expands its frontier.
    pub boundary_sites: Vec<Site<T>>,

    /// Sites inserted into the computation while expanding for this order
    pub new_sites: Vec<Site<T>>,
}

impl<T> OrderPolygon<T> {
    /// Create a polygon
    pub fn new(
        order: u32,
        vertices: Vec<Point>,
        boundary_sites: Vec<Site<T>>,
        new_sites: Vec<Site<T>>,
    ) -> Self {
        Self {
            order,
            vertices,
            boundary_sites,
            new_sites,
        }
    }

    /// Number of vertices
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Iterate over edges as `(from, to)` pairs, closing the ring
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Area enclosed by the polygon (shoelace formula)
    pub fn area(&self) -> f64 {
        if self.vertices.len() < 3 {
            return 0.0;
        }
        let twice: f64 = self.edges().map(|(p, q)| p.perp_dot(q)).sum();
        twice.abs() * 0.5
    }

    /// Whether `point` is inside the polygon (even-odd rule)
    ///
    /// Points exactly on an edge may land on either side.
    pub fn contains(&self, point: Point) -> bool {
        let mut inside = false;
        for (p, q) in self.edges() {
            if (p.y > point.y) != (q.y > point.y) {
                let x = p.x + (point.y - p.y) / (q.y - p.y) * (q.x - p.x);
                if point.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Distance from `point` to the nearest edge
    pub fn distance_to_boundary(&self, point: Point) -> f64 {
        self.edges()
            .map(|(p, q)| segment_distance(point, p, q))
            .fold(f64::INFINITY, f64::min)
    }

    /// Whether `site` is one of the boundary sites
    pub fn is_bounded_by(&self, site: &Site<T>) -> bool
    where
        T: PartialEq,
    {
        self.boundary_sites.contains(site)
    }

    /// Whether the ring has at least three distinct vertices and does not touch itself
    ///
    /// Vertices closer than `tolerance` count as the same vertex, and a vertex
    /// within `tolerance` of a non-adjacent edge touches it. Consecutive edges
    /// along one line (a polygon following a frame edge past several
    /// crossings) are not a self-intersection.
    pub fn is_simple(&self, tolerance: f64) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        for i in 0..n {
            for j in i + 1..n {
                if (self.vertices[i] - self.vertices[j]).length() <= tolerance {
                    return false;
                }
            }
        }

        let edges: Vec<(Point, Point)> = self.edges().collect();
        for i in 0..n {
            for j in i + 1..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if adjacent {
                    continue;
                }
                let (a, b) = edges[i];
                let (c, d) = edges[j];
                if segments_meet(a, b, c, d, tolerance) {
                    return false;
                }
            }
        }
        true
    }
}

fn segment_distance(point: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared == 0.0 {
        return (point - a).length();
    }
    let t = ((point - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    (point - (a + ab * t)).length()
}

/// Whether two segments cross or touch, with `tolerance` as the collinearity band
fn segments_meet(a: Point, b: Point, c: Point, d: Point, tolerance: f64) -> bool {
    let crosses = |p: Point, q: Point, r: Point, s: Point| {
        let side_r = signed_distance(p, q, r, tolerance);
        let side_s = signed_distance(p, q, s, tolerance);
        side_r * side_s < 0.0
    };
    if crosses(a, b, c, d) && crosses(c, d, a, b) {
        return true;
    }

    // Touching or collinear overlap puts an endpoint on the other segment
    segment_distance(c, a, b) <= tolerance
        || segment_distance(d, a, b) <= tolerance
        || segment_distance(a, c, d) <= tolerance
        || segment_distance(b, c, d) <= tolerance
}

/// Distance of `r` from the line through `p` and `q`, zero inside the tolerance band
fn signed_distance(p: Point, q: Point, r: Point, tolerance: f64) -> f64 {
    let pq = q - p;
    let length = pq.length();
    if length == 0.0 {
        return 0.0;
    }
    let distance = pq.perp_dot(r - p) / length;
    if distance.abs() <= tolerance {
        0.0
    } else {
        distance
    }
}
