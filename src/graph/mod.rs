//! Bisector / intersection / vertex graph
//!
//! All records live in flat arenas owned by [`Graph`] and are addressed by
//! typed handles. Links between records are handles, never references, so
//! releasing the graph is clearing three vectors.
//!
//! # Levels
//!
//! The *level* of a point is 1 plus the number of inserted sites strictly
//! closer to it than the center. The order-`k` polygon is the boundary of the
//! region of level at most `k`, clipped to the frame. Every bisector has an
//! *inner* side (the center side of a site bisector, the interior side of a
//! frame edge); traversal tracks the level of the face on that side.

mod bisector;
mod intersection;
mod vertex;
mod walk;

pub(crate) use bisector::Bisector;
pub(crate) use intersection::{Heading, Intersection, Step};
pub(crate) use vertex::{Arrival, Vertex};
pub use vertex::VertexOrder;
pub(crate) use walk::Walk;

use std::fmt;

use crate::error::{Result, VoronoiError};
use crate::geometry::{Line, Point, Triangle};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub(crate) struct $name(pub(crate) usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

handle!(
    /// Handle of a [`Bisector`] in the graph arena
    BisectorId
);
handle!(
    /// Handle of an [`Intersection`] in the graph arena
    IntersectionId
);
handle!(
    /// Handle of a [`Vertex`] in the graph arena
    VertexId
);

/// Planar subdivision induced by the frame edges and the inserted bisectors
#[derive(Debug)]
pub(crate) struct Graph {
    frame: Triangle,
    center: Point,
    epsilon: f64,
    pub(crate) bisectors: Vec<Bisector>,
    pub(crate) intersections: Vec<Intersection>,
    pub(crate) vertices: Vec<Vertex>,
}

impl Graph {
    /// Seed the graph with the three frame edges and their corner vertices
    pub fn new(frame: Triangle, center: Point, epsilon: f64) -> Result<Self> {
        let boundary = frame
            .boundary()
            .ok_or_else(|| VoronoiError::InvalidConfig("frame has coincident corners".into()))?;

        let mut graph = Self {
            frame,
            center,
            epsilon,
            bisectors: Vec::new(),
            intersections: Vec::new(),
            vertices: Vec::new(),
        };
        for (line, interior) in boundary {
            graph.bisectors.push(Bisector::boundary(line, interior));
        }
        for new in 1..3 {
            for existing in 0..new {
                graph.connect(BisectorId(new), BisectorId(existing))?;
            }
        }

        if graph.vertices.len() != 3 {
            return Err(VoronoiError::InvalidConfig(format!(
                "frame produced {} corners",
                graph.vertices.len()
            )));
        }
        Ok(graph)
    }

    /// Insert the bisector of `position` and the center, crossing it with every existing bisector
    ///
    /// `site` is the caller's handle for the site, returned later by
    /// [`Bisector::site`].
    ///
    /// # Errors
    ///
    /// - `DuplicatePoint` if `position` is the center, or a crossing lands on
    ///   an existing point of a bisector
    /// - `DuplicateSite` if another site bisector is the same line
    /// - `ResolvedSegment` if a crossing splits a segment of an emitted polygon
    pub fn insert_site(&mut self, site: usize, position: Point) -> Result<BisectorId> {
        let line = Line::perpendicular_bisector(position, self.center, self.epsilon).ok_or(
            VoronoiError::DuplicatePoint {
                x: position.x,
                y: position.y,
            },
        )?;
        let coincident = self
            .bisectors
            .iter()
            .any(|b| !b.is_boundary() && b.line.coincides(&line, self.epsilon));
        if coincident {
            return Err(VoronoiError::DuplicateSite {
                x: position.x,
                y: position.y,
            });
        }

        let id = BisectorId(self.bisectors.len());
        self.bisectors.push(Bisector::for_site(line, site));
        for existing in 0..id.0 {
            self.connect(id, BisectorId(existing))?;
        }

        tracing::trace!(
            bisector = %id,
            site,
            crossings = self.bisectors[id.0].len(),
            "bisector inserted"
        );
        Ok(id)
    }

    /// Cross two bisectors, adding a vertex if they meet inside the frame
    fn connect(&mut self, new: BisectorId, existing: BisectorId) -> Result<()> {
        let (new_line, existing_line) = (self.bisectors[new.0].line, self.bisectors[existing.0].line);
        let Some(point) = new_line.intersection(&existing_line) else {
            return Ok(());
        };

        let on_boundary = self.bisectors[new.0].is_boundary() || self.bisectors[existing.0].is_boundary();
        let inside = if on_boundary {
            self.frame.contains(point, self.epsilon)
        } else {
            self.frame.contains_strictly(point, self.epsilon)
        };
        if !inside {
            return Ok(());
        }

        let vertex = VertexId(self.vertices.len());
        let on_new = IntersectionId(self.intersections.len());
        let on_existing = IntersectionId(on_new.0 + 1);
        self.intersections.push(Intersection::new(
            point,
            new,
            existing,
            self.step_across(new, existing),
            new_line.parameter(point),
            vertex,
        ));
        self.intersections.push(Intersection::new(
            point,
            existing,
            new,
            self.step_across(existing, new),
            existing_line.parameter(point),
            vertex,
        ));
        self.vertices
            .push(Vertex::new(point, [on_new, on_existing], on_boundary));

        // Existing bisectors carry the solved segments, check them first
        let Self {
            bisectors,
            intersections,
            epsilon,
            ..
        } = self;
        bisectors[existing.0].insert(on_existing, intersections, *epsilon)?;
        bisectors[new.0].insert(on_new, intersections, *epsilon)
    }

    /// Step direction when moving forward along `owner` across `crossing`
    fn step_across(&self, owner: BisectorId, crossing: BisectorId) -> Step {
        let crossing = &self.bisectors[crossing.0];
        if crossing.is_boundary() {
            return Step::Zero;
        }
        if self.bisectors[owner.0].line.direction().dot(crossing.line.normal()) > 0.0 {
            Step::Up
        } else {
            Step::Down
        }
    }

    /// Level of a point, counted directly from the site bisectors
    pub fn level_at(&self, point: Point) -> u32 {
        let closer = self
            .bisectors
            .iter()
            .filter(|b| !b.is_boundary() && b.line.side(point) > 0.0)
            .count();
        1 + closer as u32
    }

    /// Vertex an intersection belongs to
    #[inline]
    pub fn vertex_of(&self, id: IntersectionId) -> VertexId {
        self.intersections[id.0].vertex
    }

    /// Position of the vertex an arrival points at
    #[inline]
    pub fn point_of(&self, arrival: Arrival) -> Point {
        self.intersections[arrival.at.0].point
    }

    /// Site handles of the bisectors crossing at an arrival's vertex
    pub fn sites_at(&self, arrival: Arrival) -> impl Iterator<Item = usize> + '_ {
        let vertex = &self.vertices[self.vertex_of(arrival.at).0];
        vertex
            .intersections
            .into_iter()
            .filter_map(move |id| self.bisectors[self.intersections[id.0].bisector.0].site())
    }

    /// Number of site bisectors in the graph
    pub fn site_count(&self) -> usize {
        self.bisectors.iter().filter(|b| !b.is_boundary()).count()
    }

    /// Number of intersections that belong to an emitted polygon's vertices
    pub fn solved_count(&self) -> usize {
        self.intersections.iter().filter(|x| x.solved).count()
    }

    /// Drop every record, breaking all links at once
    pub fn release(&mut self) {
        tracing::trace!(
            bisectors = self.bisectors.len(),
            intersections = self.intersections.len(),
            solved = self.solved_count(),
            vertices = self.vertices.len(),
            "graph released"
        );
        self.bisectors.clear();
        self.intersections.clear();
        self.vertices.clear();
    }
}
