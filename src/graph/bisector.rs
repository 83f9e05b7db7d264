use crate::error::{Result, VoronoiError};
use crate::geometry::Line;

use super::{Intersection, IntersectionId};

/// What a bisector separates
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BisectorKind {
    /// A frame edge; `interior` is the sign of [`Line::side`] inside the frame
    Boundary { interior: f64 },
    /// Perpendicular bisector of a site and the center
    Site(usize),
}

/// A line of the graph with its intersections sorted along the line
#[derive(Debug, Clone)]
pub(crate) struct Bisector {
    pub line: Line,
    pub kind: BisectorKind,
    /// Intersections in increasing line parameter
    pub(super) intersections: Vec<IntersectionId>,
}

impl Bisector {
    pub fn boundary(line: Line, interior: f64) -> Self {
        Self {
            line,
            kind: BisectorKind::Boundary { interior },
            intersections: Vec::new(),
        }
    }

    pub fn for_site(line: Line, site: usize) -> Self {
        Self {
            line,
            kind: BisectorKind::Site(site),
            intersections: Vec::new(),
        }
    }

    #[inline]
    pub fn is_boundary(&self) -> bool {
        matches!(self.kind, BisectorKind::Boundary { .. })
    }

    /// Caller handle of the site, `None` for frame edges
    #[inline]
    pub fn site(&self) -> Option<usize> {
        match self.kind {
            BisectorKind::Site(site) => Some(site),
            BisectorKind::Boundary { .. } => None,
        }
    }

    /// Sign of [`Line::side`] on the frame's interior, `None` for site bisectors
    #[inline]
    pub fn interior(&self) -> Option<f64> {
        match self.kind {
            BisectorKind::Boundary { interior } => Some(interior),
            BisectorKind::Site(_) => None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    /// Insert an intersection at its rank along the line and link it to its neighbors
    ///
    /// Fails with `DuplicatePoint` if a neighbor lies within `epsilon` along the
    /// line, and with `ResolvedSegment` if the gap it lands in was already
    /// walked by an emitted polygon.
    pub fn insert(
        &mut self,
        id: IntersectionId,
        arena: &mut [Intersection],
        epsilon: f64,
    ) -> Result<()> {
        let param = arena[id.0].param;
        let point = arena[id.0].point;
        let rank = self
            .intersections
            .partition_point(|other| arena[other.0].param < param);
        let previous = rank.checked_sub(1).map(|r| self.intersections[r]);
        let next = self.intersections.get(rank).copied();

        for neighbor in [previous, next].into_iter().flatten() {
            if (arena[neighbor.0].param - param).abs() <= epsilon {
                return Err(VoronoiError::DuplicatePoint {
                    x: point.x,
                    y: point.y,
                });
            }
        }
        if previous.is_some_and(|p| arena[p.0].segment_solved) {
            return Err(VoronoiError::ResolvedSegment {
                x: point.x,
                y: point.y,
            });
        }

        arena[id.0].previous = previous;
        arena[id.0].next = next;
        if let Some(p) = previous {
            arena[p.0].next = Some(id);
        }
        if let Some(n) = next {
            arena[n.0].previous = Some(id);
        }
        self.intersections.insert(rank, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::graph::{BisectorId, Step, VertexId};

    /// The x axis, directed toward +x so parameters increase with x
    fn line() -> Line {
        Line::new(0.0, -1.0, 0.0).unwrap()
    }

    fn push(arena: &mut Vec<Intersection>, x: f64) -> IntersectionId {
        let point = Point::new(x, 0.0);
        let id = IntersectionId(arena.len());
        arena.push(Intersection::new(
            point,
            BisectorId(0),
            BisectorId(1),
            Step::Up,
            line().parameter(point),
            VertexId(id.0),
        ));
        id
    }

    #[test]
    fn test_insert_keeps_parameter_order() {
        let mut bisector = Bisector::for_site(line(), 0);
        let mut arena = Vec::new();
        for x in [3.0, -1.0, 1.0, 2.0] {
            let id = push(&mut arena, x);
            bisector.insert(id, &mut arena, 1e-9).unwrap();
        }
        let params: Vec<f64> = bisector
            .intersections
            .iter()
            .map(|id| arena[id.0].param)
            .collect();
        let mut sorted = params.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(params, sorted);
        assert_eq!(bisector.len(), 4);
    }

    #[test]
    fn test_insert_rejects_near_duplicates() {
        let mut bisector = Bisector::for_site(line(), 0);
        let mut arena = Vec::new();
        let first = push(&mut arena, 1.0);
        bisector.insert(first, &mut arena, 1e-6).unwrap();
        let near = push(&mut arena, 1.0 + 1e-7);
        let err = bisector.insert(near, &mut arena, 1e-6).unwrap_err();
        assert!(matches!(err, VoronoiError::DuplicatePoint { .. }));
        assert_eq!(bisector.len(), 1);
    }

    #[test]
    fn test_insert_into_solved_gap() {
        let mut bisector = Bisector::for_site(line(), 0);
        let mut arena = Vec::new();
        let left = push(&mut arena, 0.0);
        let right = push(&mut arena, 4.0);
        bisector.insert(left, &mut arena, 1e-9).unwrap();
        bisector.insert(right, &mut arena, 1e-9).unwrap();
        arena[left.0].segment_solved = true;

        // Outside the solved gap is fine
        let outside = push(&mut arena, 6.0);
        bisector.insert(outside, &mut arena, 1e-9).unwrap();

        let inside = push(&mut arena, 2.0);
        let err = bisector.insert(inside, &mut arena, 1e-9).unwrap_err();
        assert!(matches!(err, VoronoiError::ResolvedSegment { .. }));
        assert_eq!(bisector.len(), 3);
    }

    #[test]
    fn test_solved_gap_follows_parameter_order() {
        // Reversed direction: parameter is -x, so x = 4 ranks before x = 0
        let reversed = Line::new(0.0, 1.0, 0.0).unwrap();
        let mut bisector = Bisector::for_site(reversed, 0);
        let mut arena = Vec::new();
        let push = |arena: &mut Vec<Intersection>, x: f64| {
            let point = Point::new(x, 0.0);
            let id = IntersectionId(arena.len());
            arena.push(Intersection::new(
                point,
                BisectorId(0),
                BisectorId(1),
                Step::Up,
                reversed.parameter(point),
                VertexId(id.0),
            ));
            id
        };
        let left = push(&mut arena, 0.0);
        let right = push(&mut arena, 4.0);
        bisector.insert(left, &mut arena, 1e-9).unwrap();
        bisector.insert(right, &mut arena, 1e-9).unwrap();
        assert_eq!(bisector.intersections, vec![right, left]);
        arena[right.0].segment_solved = true;

        let outside = push(&mut arena, -2.0);
        bisector.insert(outside, &mut arena, 1e-9).unwrap();

        let inside = push(&mut arena, 2.0);
        let err = bisector.insert(inside, &mut arena, 1e-9).unwrap_err();
        assert!(matches!(err, VoronoiError::ResolvedSegment { .. }));
    }

    #[test]
    fn test_kind_accessors() {
        let frame = Bisector::boundary(line(), -1.0);
        assert!(frame.is_boundary());
        assert_eq!(frame.site(), None);
        assert_eq!(frame.interior(), Some(-1.0));

        let site = Bisector::for_site(line(), 4);
        assert_eq!(site.site(), Some(4));
        assert_eq!(site.interior(), None);
    }
}
