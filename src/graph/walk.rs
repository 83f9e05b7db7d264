use std::collections::HashSet;

use crate::error::{Result, VoronoiError};

use super::{Arrival, BisectorId, Graph, IntersectionId, VertexOrder};

/// Closed boundary walk of one order's region
#[derive(Debug, Clone, Default)]
pub(crate) struct Walk {
    /// Arrivals in walk order, one per polygon vertex
    pub arrivals: Vec<Arrival>,
    /// Order computed for each arrival's vertex
    pub orders: Vec<VertexOrder>,
}

impl Walk {
    #[inline]
    pub fn len(&self) -> usize {
        self.arrivals.len()
    }
}

impl Graph {
    /// Walk the boundary of the order-`order` region from `start` until it closes
    pub fn walk(&self, start: Arrival, order: u32) -> Result<Walk> {
        let first = self.vertex_of(start.at);
        let mut visited = HashSet::new();
        let mut walk = Walk::default();
        let mut current = start;

        loop {
            let vertex = self.vertex_of(current.at);
            if !visited.insert(vertex) {
                let point = self.point_of(current);
                return Err(VoronoiError::VertexRevisited {
                    order,
                    x: point.x,
                    y: point.y,
                });
            }
            let (next, vertex_order) = self.next(current, order)?;
            walk.arrivals.push(current);
            walk.orders.push(vertex_order);
            if self.vertex_of(next.at) == first {
                break;
            }
            current = next;
        }

        Ok(walk)
    }

    /// Commit a closed walk: assign vertex orders and mark its segments resolved
    pub fn solve(&mut self, walk: &Walk) -> Result<()> {
        for (arrival, order) in walk.arrivals.iter().zip(&walk.orders) {
            self.on_solved(self.vertex_of(arrival.at), *order)?;
            self.solve_segment(*arrival)?;
        }
        Ok(())
    }

    /// Find an arrival on the order-1 boundary by descending from a frame corner
    ///
    /// The frame perimeter is searched first. If no frame segment has level
    /// 1, every site line crossing the frame is followed inward until one of
    /// its segments does.
    pub fn first_order_start(&self) -> Result<Arrival> {
        let start = self.perimeter_start()?;
        let mut crossings: Vec<(IntersectionId, BisectorId, u32)> = Vec::new();
        let mut current = start;

        loop {
            if current.level == 1 {
                return Ok(current);
            }
            let a = &self.intersections[current.at.0];
            let o_id = self.vertices[a.vertex.0].partner(current.at);
            if !self.bisectors[a.crossing.0].is_boundary() {
                let after = self.level_after(current)?;
                crossings.push((o_id, a.bisector, current.level.min(after)));
            }

            current = self.next_down(current)?.ok_or_else(|| {
                VoronoiError::CorruptGraph("frame perimeter is open".into())
            })?;
            if current.at == start.at {
                break;
            }
        }

        let mut scanned = HashSet::new();
        for (on_site, frame, level) in crossings {
            if !scanned.insert(self.intersections[on_site.0].bisector) {
                continue;
            }
            let Some(to) = self.inward(on_site, frame) else {
                continue;
            };
            let mut current = self.depart(on_site, to, level)?;
            loop {
                if current.level == 1 {
                    return Ok(current);
                }
                match self.next_down(current)? {
                    Some(next) => current = next,
                    None => break,
                }
            }
        }

        Err(VoronoiError::NoStartVertex { order: 1 })
    }

    /// Find an arrival on the order-`order` boundary from the previous order's walk
    ///
    /// Candidates are tried from the previous walk's last arrival onward,
    /// wrapping around.
    pub fn next_order_start(&self, previous: &Walk, order: u32) -> Result<Arrival> {
        let n = previous.len();
        for k in 0..n {
            let arrival = previous.arrivals[(n - 1 + k) % n];
            if let Some(start) = self.next_up(arrival, order)? {
                return Ok(start);
            }
        }
        Err(VoronoiError::NoStartVertex { order })
    }

    /// Arrival leaving the first frame corner along one of its edges
    fn perimeter_start(&self) -> Result<Arrival> {
        let corner = self
            .vertices
            .iter()
            .find(|v| {
                v.intersections
                    .iter()
                    .all(|id| self.bisectors[self.intersections[id.0].bisector.0].is_boundary())
            })
            .ok_or_else(|| VoronoiError::CorruptGraph("frame has no corner".into()))?;

        let [along, other] = corner.intersections;
        let frame = self.intersections[other.0].bisector;
        let to = self
            .inward(along, frame)
            .ok_or_else(|| VoronoiError::CorruptGraph("frame corner has no inward edge".into()))?;
        self.depart(along, to, self.level_at(corner.point))
    }
}
