use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};
use crate::geometry::Point;

use super::{BisectorId, Graph, Heading, IntersectionId, Step, VertexId};

/// Order assigned to a polygon vertex
///
/// Vertices where two site bisectors cross sit on two consecutive polygons
/// and get the half-integer between them; every other vertex gets a whole
/// order.
///
/// # Example
///
/// ```
/// use order_voronoi::VertexOrder;
///
/// assert_eq!(VertexOrder::half_above(1).value(), 1.5);
/// assert_eq!(VertexOrder::whole(2).to_string(), "2");
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexOrder(u32);

impl VertexOrder {
    /// Order `k`
    #[inline]
    pub fn whole(order: u32) -> Self {
        Self(order.saturating_mul(2))
    }

    /// Order `k + 0.5`
    #[inline]
    pub fn half_above(order: u32) -> Self {
        Self(order.saturating_mul(2).saturating_add(1))
    }

    /// Order `k - 0.5`
    #[inline]
    pub fn half_below(order: u32) -> Self {
        Self(order.saturating_mul(2).saturating_sub(1))
    }

    /// Numeric value of the order
    #[inline]
    pub fn value(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    /// Whether this is a half-integer order
    #[inline]
    pub fn is_half(self) -> bool {
        self.0 % 2 == 1
    }
}

impl fmt::Display for VertexOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_half() {
            write!(f, "{}.5", self.0 / 2)
        } else {
            write!(f, "{}", self.0 / 2)
        }
    }
}

/// A point where two graph lines cross
#[derive(Debug, Clone)]
pub(crate) struct Vertex {
    pub point: Point,
    /// The two intersections, one per line, in creation order
    pub intersections: [IntersectionId; 2],
    pub order: Option<VertexOrder>,
    /// At least one of the lines is a frame edge
    pub on_boundary: bool,
}

impl Vertex {
    pub fn new(point: Point, intersections: [IntersectionId; 2], on_boundary: bool) -> Self {
        Self {
            point,
            intersections,
            order: None,
            on_boundary,
        }
    }

    /// The intersection on the other line
    #[inline]
    pub fn partner(&self, id: IntersectionId) -> IntersectionId {
        if self.intersections[0] == id {
            self.intersections[1]
        } else {
            self.intersections[0]
        }
    }
}

/// A traveller that just reached `at` along its bisector
///
/// `level` is the level of the face on the inner side of the segment it
/// travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Arrival {
    pub at: IntersectionId,
    pub heading: Heading,
    pub level: u32,
}

impl Graph {
    /// Next vertex on the boundary of the order-`order` region
    ///
    /// Returns the arrival at the next vertex together with the order of the
    /// vertex being left.
    pub fn next(&self, arrival: Arrival, order: u32) -> Result<(Arrival, VertexOrder)> {
        let a = &self.intersections[arrival.at.0];
        let vertex = &self.vertices[a.vertex.0];
        let o_id = vertex.partner(arrival.at);
        let o = &self.intersections[o_id.0];
        let along_frame = self.bisectors[a.bisector.0].is_boundary();
        let onto_frame = self.bisectors[a.crossing.0].is_boundary();
        let after = self.level_after(arrival)?;
        let missing = || VoronoiError::NoNextVertex {
            order,
            x: vertex.point.x,
            y: vertex.point.y,
        };

        match (along_frame, onto_frame) {
            (false, false) => {
                self.expect_level(arrival, order)?;
                if after > arrival.level {
                    // Lower corner: follow the other line away from its site
                    let to = o.neighbor(Step::Down).ok_or_else(missing)?;
                    Ok((self.depart(o_id, to, order)?, VertexOrder::half_above(order)))
                } else {
                    // Upper corner: follow the other line into its site's half-plane
                    let to = o.neighbor(Step::Up).ok_or_else(missing)?;
                    Ok((self.depart(o_id, to, order)?, VertexOrder::half_below(order)))
                }
            }
            (false, true) => {
                self.expect_level(arrival, order)?;
                let to = o.neighbor(Step::Down).ok_or_else(missing)?;
                Ok((self.depart(o_id, to, order)?, VertexOrder::whole(order)))
            }
            (true, false) => {
                if after <= order {
                    let to = a.toward(arrival.heading).ok_or_else(missing)?;
                    let vertex_order = VertexOrder::whole(arrival.level.min(after));
                    Ok((self.depart(arrival.at, to, after)?, vertex_order))
                } else {
                    let to = self.inward(o_id, a.bisector).ok_or_else(missing)?;
                    Ok((
                        self.depart(o_id, to, arrival.level)?,
                        VertexOrder::whole(arrival.level),
                    ))
                }
            }
            (true, true) => {
                let to = self.inward(o_id, a.bisector).ok_or_else(missing)?;
                Ok((
                    self.depart(o_id, to, arrival.level)?,
                    VertexOrder::whole(arrival.level),
                ))
            }
        }
    }

    /// Continue a descent toward the lowest level
    ///
    /// Frame lines are followed around the corners and site lines straight
    /// through every crossing. Returns `None` at the far end of a site line.
    pub fn next_down(&self, arrival: Arrival) -> Result<Option<Arrival>> {
        let a = &self.intersections[arrival.at.0];
        let o_id = self.vertices[a.vertex.0].partner(arrival.at);
        let along_frame = self.bisectors[a.bisector.0].is_boundary();
        let onto_frame = self.bisectors[a.crossing.0].is_boundary();

        if along_frame && onto_frame {
            let to = self
                .inward(o_id, a.bisector)
                .ok_or_else(|| corrupt(format!("frame corner {} has no inward edge", a.vertex)))?;
            return self.depart(o_id, to, arrival.level).map(Some);
        }

        let after = self.level_after(arrival)?;
        match a.toward(arrival.heading) {
            Some(to) => self.depart(arrival.at, to, after).map(Some),
            None if along_frame => Err(corrupt(format!(
                "frame perimeter ends at {}",
                a.vertex
            ))),
            None => Ok(None),
        }
    }

    /// Lift an arrival of the order-`order - 1` polygon onto the order-`order` polygon
    ///
    /// Frame arrivals carry over unchanged. An arrival at a lower corner
    /// continues along its line through the corner, into the face one level
    /// up. Any other arrival yields `None`.
    pub fn next_up(&self, arrival: Arrival, order: u32) -> Result<Option<Arrival>> {
        let a = &self.intersections[arrival.at.0];
        if self.bisectors[a.bisector.0].is_boundary() {
            return Ok(Some(arrival));
        }
        let vertex = &self.vertices[a.vertex.0];
        if vertex.on_boundary || vertex.order != Some(VertexOrder::half_below(order)) {
            return Ok(None);
        }
        match a.neighbor(Step::Up) {
            Some(to) => self.depart(arrival.at, to, order).map(Some),
            None => Ok(None),
        }
    }

    /// Record the order of a walked vertex and mark both its intersections solved
    ///
    /// Fails with `OrderConflict` if the vertex already carries a different
    /// order.
    pub fn on_solved(&mut self, id: VertexId, order: VertexOrder) -> Result<()> {
        let vertex = &mut self.vertices[id.0];
        for at in vertex.intersections {
            self.intersections[at.0].solved = true;
        }
        match vertex.order {
            None => vertex.order = Some(order),
            Some(existing) if existing == order => {}
            Some(existing) => {
                return Err(VoronoiError::OrderConflict {
                    x: vertex.point.x,
                    y: vertex.point.y,
                    existing,
                    computed: order,
                })
            }
        }
        Ok(())
    }

    /// Mark the segment an arrival travelled as part of an emitted polygon
    pub fn solve_segment(&mut self, arrival: Arrival) -> Result<()> {
        let a = &self.intersections[arrival.at.0];
        let from = a
            .behind(arrival.heading)
            .ok_or_else(|| corrupt(format!("arrival at {} has no origin", arrival.at)))?;
        let lower = match arrival.heading {
            Heading::Forward => from,
            Heading::Backward => arrival.at,
        };
        self.intersections[lower.0].segment_solved = true;
        Ok(())
    }

    /// Arrival at `to`, travelling from its neighbor `from` on the same line
    pub(super) fn depart(&self, from: IntersectionId, to: IntersectionId, level: u32) -> Result<Arrival> {
        let heading = self.intersections[from.0]
            .heading_to(to)
            .ok_or_else(|| corrupt(format!("{from} and {to} are not adjacent")))?;
        Ok(Arrival { at: to, heading, level })
    }

    /// Neighbor of `on` that lies on the interior side of a frame line
    pub(super) fn inward(&self, on: IntersectionId, frame: BisectorId) -> Option<IntersectionId> {
        let frame = &self.bisectors[frame.0];
        let interior = frame.interior()?;
        let here = &self.intersections[on.0];
        [here.previous, here.next]
            .into_iter()
            .flatten()
            .map(|id| (id, frame.line.side(self.intersections[id.0].point) * interior))
            .filter(|(_, distance)| *distance > 0.0)
            .max_by(|x, y| x.1.total_cmp(&y.1))
            .map(|(id, _)| id)
    }

    /// Level on the inner side after passing through the arrival's vertex
    pub(super) fn level_after(&self, arrival: Arrival) -> Result<u32> {
        let change = self.intersections[arrival.at.0].level_change(arrival.heading);
        u32::try_from(i64::from(arrival.level) + change)
            .ok()
            .filter(|level| *level >= 1)
            .ok_or_else(|| corrupt(format!("level drops below 1 at {}", arrival.at)))
    }

    fn expect_level(&self, arrival: Arrival, order: u32) -> Result<()> {
        if arrival.level == order {
            Ok(())
        } else {
            Err(corrupt(format!(
                "site bisector reached at level {} while walking order {order}",
                arrival.level
            )))
        }
    }
}

fn corrupt(message: String) -> VoronoiError {
    VoronoiError::CorruptGraph(message)
}
