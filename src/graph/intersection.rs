use crate::geometry::Point;

use super::{BisectorId, IntersectionId, VertexId};

/// Change in level when moving forward along a bisector across another line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Moving forward enters the crossing site's half-plane
    Up,
    /// Moving forward leaves the crossing site's half-plane
    Down,
    /// The crossing line is a frame edge
    Zero,
}

impl Step {
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Step::Up => Step::Down,
            Step::Down => Step::Up,
            Step::Zero => Step::Zero,
        }
    }
}

/// Direction of travel along a bisector, relative to its parameter order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Heading {
    Forward,
    Backward,
}

/// One bisector's view of a vertex
#[derive(Debug, Clone)]
pub(crate) struct Intersection {
    pub point: Point,
    /// Bisector this intersection lies on
    pub bisector: BisectorId,
    /// The other bisector through the vertex
    pub crossing: BisectorId,
    pub step: Step,
    /// Position along the owning bisector
    pub param: f64,
    pub vertex: VertexId,
    pub previous: Option<IntersectionId>,
    pub next: Option<IntersectionId>,
    /// Set once the vertex belongs to an emitted polygon
    pub solved: bool,
    /// Set once the segment from here to `next` belongs to an emitted polygon
    pub segment_solved: bool,
}

impl Intersection {
    pub fn new(
        point: Point,
        bisector: BisectorId,
        crossing: BisectorId,
        step: Step,
        param: f64,
        vertex: VertexId,
    ) -> Self {
        Self {
            point,
            bisector,
            crossing,
            step,
            param,
            vertex,
            previous: None,
            next: None,
            solved: false,
            segment_solved: false,
        }
    }

    /// Neighbor reached by moving across the crossing line with the given step
    ///
    /// `None` for zero steps, or when that side of the bisector is empty.
    pub fn neighbor(&self, step: Step) -> Option<IntersectionId> {
        match (self.step, step) {
            (Step::Zero, _) | (_, Step::Zero) => None,
            (own, wanted) if own == wanted => self.next,
            _ => self.previous,
        }
    }

    /// Neighbor in the given heading
    #[inline]
    pub fn toward(&self, heading: Heading) -> Option<IntersectionId> {
        match heading {
            Heading::Forward => self.next,
            Heading::Backward => self.previous,
        }
    }

    /// Neighbor behind a traveller arriving here with the given heading
    #[inline]
    pub fn behind(&self, heading: Heading) -> Option<IntersectionId> {
        match heading {
            Heading::Forward => self.previous,
            Heading::Backward => self.next,
        }
    }

    /// Heading that leads from here to `to`, `None` if `to` is not adjacent
    pub fn heading_to(&self, to: IntersectionId) -> Option<Heading> {
        if self.next == Some(to) {
            Some(Heading::Forward)
        } else if self.previous == Some(to) {
            Some(Heading::Backward)
        } else {
            None
        }
    }

    /// Level change when passing through this intersection with the given heading
    pub fn level_change(&self, heading: Heading) -> i64 {
        let step = match heading {
            Heading::Forward => self.step,
            Heading::Backward => self.step.opposite(),
        };
        match step {
            Step::Up => 1,
            Step::Down => -1,
            Step::Zero => 0,
        }
    }
}
