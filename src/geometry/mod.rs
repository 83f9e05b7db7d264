//! Planar geometry primitives
//!
//! Map coordinates (longitude/latitude) are treated as Cartesian for the
//! duration of a computation. Everything here is pure and allocation free.

mod line;
mod triangle;

pub use line::Line;
pub use triangle::{Edge, Triangle};

use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in the computation plane
#[doc(no_inline)]
pub use glam::DVec2 as Point;

/// Default tolerance for containment and duplicate-point tests (2⁻³⁰)
pub const DEFAULT_EPSILON: f64 = 1.0 / (1u64 << 30) as f64;

/// Exact, hashable key for a point
///
/// `-0.0` and `0.0` map to the same key; every other bit pattern is distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey {
    x: u64,
    y: u64,
}

impl PointKey {
    /// Build the key for a point
    pub fn new(point: Point) -> Self {
        // Adding 0.0 folds -0.0 into 0.0
        Self {
            x: (point.x + 0.0).to_bits(),
            y: (point.y + 0.0).to_bits(),
        }
    }
}

impl From<Point> for PointKey {
    fn from(point: Point) -> Self {
        Self::new(point)
    }
}

/// A site (station) with caller-defined identifying data
///
/// Two sites are the same site when both position and data match. Sites at
/// the same position with different data are distinct, and the engine rejects
/// them as coincident.
///
/// # Example
///
/// ```
/// use order_voronoi::{Point, Site};
///
/// let station = Site::new(Point::new(13.40, 52.52), "BER-01");
/// assert_eq!(station.data, "BER-01");
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct Site<T> {
    /// Position of the site
    pub position: Point,
    /// Identifying data attached by the caller
    pub data: T,
}

impl<T> Site<T> {
    /// Create a new site
    pub fn new(position: Point, data: T) -> Self {
        Self { position, data }
    }

    /// Exact key of this site's position
    #[inline]
    pub fn key(&self) -> PointKey {
        PointKey::new(self.position)
    }
}

impl<T: PartialEq> PartialEq for Site<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key() && self.data == other.data
    }
}

impl<T: Eq> Eq for Site<T> {}

impl<T: Hash> Hash for Site<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
        self.data.hash(state);
    }
}
