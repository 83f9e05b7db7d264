//! Spatial indexing for nearest-site lookups and local neighbor answers
//!
//! This module is only available with the `spatial-index` feature.

use std::collections::{BTreeSet, HashMap};
use std::future::{ready, Future};

use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

use crate::error::VoronoiError;
use crate::geometry::{Point, PointKey, Site};
use crate::provider::NeighborProvider;

/// In-memory site set with a KD-tree and a Delaunay triangulation
///
/// Answers nearest-site queries in O(log n) and serves as a
/// [`NeighborProvider`] when the whole site set is available locally, for
/// example in tests or batch jobs.
///
/// # Example
///
/// ```
/// use order_voronoi::*;
///
/// # #[cfg(feature = "spatial-index")]
/// # {
/// let index = SiteIndex::new(vec![
///     Site::new(Point::new(0.0, 0.0), "a"),
///     Site::new(Point::new(4.0, 0.0), "b"),
///     Site::new(Point::new(0.0, 4.0), "c"),
/// ]);
///
/// let nearest = index.find_nearest(Point::new(3.5, 0.5)).unwrap();
/// assert_eq!(index.site(nearest).unwrap().data, "b");
/// assert_eq!(index.neighbors_of(nearest), &[0, 2]);
/// # }
/// ```
pub struct SiteIndex<T> {
    sites: Vec<Site<T>>,
    tree: Option<ImmutableKdTree<f64, usize, 2, 32>>,
    by_position: HashMap<PointKey, usize>,
    neighbors: Vec<Vec<usize>>,
}

impl<T> SiteIndex<T> {
    /// Build the index from a site list
    ///
    /// Site indices are positions in `sites`. When several sites share a
    /// position, lookups by position resolve to the first of them.
    pub fn new(sites: Vec<Site<T>>) -> Self {
        let positions: Vec<Point> = sites.iter().map(|s| s.position).collect();

        let points: Vec<[f64; 2]> = positions.iter().map(|p| [p.x, p.y]).collect();
        let tree = (!points.is_empty()).then(|| ImmutableKdTree::new_from_slice(&points));

        let mut by_position = HashMap::with_capacity(sites.len());
        for (i, site) in sites.iter().enumerate() {
            by_position.entry(site.key()).or_insert(i);
        }

        let neighbors = delaunay_neighbors(&positions);
        tracing::debug!(sites = sites.len(), "site index built");

        Self {
            sites,
            tree,
            by_position,
            neighbors,
        }
    }

    /// Number of sites
    #[inline]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether the index holds no sites
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// All sites, in index order
    #[inline]
    pub fn sites(&self) -> &[Site<T>] {
        &self.sites
    }

    /// Site at `index`
    #[inline]
    pub fn site(&self, index: usize) -> Option<&Site<T>> {
        self.sites.get(index)
    }

    /// Index of the site nearest to `position`, `None` if the index is empty
    pub fn find_nearest(&self, position: Point) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        let result = tree.nearest_one::<SquaredEuclidean>(&[position.x, position.y]);
        Some(result.item as usize)
    }

    /// Index of the site exactly at `position`
    #[inline]
    pub fn index_of(&self, position: Point) -> Option<usize> {
        self.by_position.get(&PointKey::new(position)).copied()
    }

    /// Indices of the Delaunay neighbors of the site at `index`, ascending
    pub fn neighbors_of(&self, index: usize) -> &[usize] {
        self.neighbors.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl<T: Clone> NeighborProvider<T> for SiteIndex<T> {
    type Error = VoronoiError;

    fn neighbors(
        &mut self,
        site: &Site<T>,
    ) -> impl Future<Output = Result<Vec<Site<T>>, VoronoiError>> {
        let result = match self.index_of(site.position) {
            Some(index) => Ok(self
                .neighbors_of(index)
                .iter()
                .map(|&n| self.sites[n].clone())
                .collect()),
            None => Err(VoronoiError::SiteNotFound {
                x: site.position.x,
                y: site.position.y,
            }),
        };
        ready(result)
    }
}

/// Adjacency lists of the Delaunay triangulation of `positions`
///
/// Collinear inputs have no triangles; consecutive hull points are linked
/// instead.
fn delaunay_neighbors(positions: &[Point]) -> Vec<Vec<usize>> {
    if positions.len() < 2 {
        return vec![Vec::new(); positions.len()];
    }
    let input: Vec<delaunator::Point> = positions
        .iter()
        .map(|p| delaunator::Point { x: p.x, y: p.y })
        .collect();
    let triangulation = delaunator::triangulate(&input);

    let mut adjacency = vec![BTreeSet::new(); positions.len()];
    let mut link = |a: usize, b: usize| {
        if a != b {
            adjacency[a].insert(b);
            adjacency[b].insert(a);
        }
    };
    for triangle in triangulation.triangles.chunks_exact(3) {
        link(triangle[0], triangle[1]);
        link(triangle[1], triangle[2]);
        link(triangle[2], triangle[0]);
    }
    if triangulation.triangles.is_empty() {
        for pair in triangulation.hull.windows(2) {
            link(pair[0], pair[1]);
        }
    }

    adjacency
        .into_iter()
        .map(|set| set.into_iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SiteIndex<u32> {
        SiteIndex::new(vec![
            Site::new(Point::new(0.0, 0.0), 0),
            Site::new(Point::new(10.0, 0.0), 1),
            Site::new(Point::new(0.0, 10.0), 2),
            Site::new(Point::new(10.0, 11.0), 3),
            Site::new(Point::new(5.0, 4.0), 4),
        ])
    }

    #[test]
    fn test_find_nearest() {
        let index = grid();
        assert_eq!(index.find_nearest(Point::new(0.5, 0.5)), Some(0));
        assert_eq!(index.find_nearest(Point::new(9.0, 1.0)), Some(1));
        assert_eq!(index.find_nearest(Point::new(5.0, 5.0)), Some(4));
        // Exact positions resolve to themselves
        for (i, site) in index.sites().iter().enumerate() {
            assert_eq!(index.find_nearest(site.position), Some(i));
        }
    }

    #[test]
    fn test_empty_index() {
        let index: SiteIndex<u32> = SiteIndex::new(vec![]);
        assert!(index.is_empty());
        assert_eq!(index.find_nearest(Point::ZERO), None);
        assert!(index.neighbors_of(0).is_empty());
    }

    #[test]
    fn test_neighbors_are_symmetric() {
        let index = grid();
        for i in 0..index.len() {
            for &j in index.neighbors_of(i) {
                assert_ne!(i, j);
                assert!(index.neighbors_of(j).contains(&i));
            }
        }
        // The inner site is connected to every corner
        assert_eq!(index.neighbors_of(4), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_collinear_sites_form_a_chain() {
        let index = SiteIndex::new(vec![
            Site::new(Point::new(2.0, 0.0), 'c'),
            Site::new(Point::new(0.0, 0.0), 'a'),
            Site::new(Point::new(1.0, 0.0), 'b'),
        ]);
        assert_eq!(index.neighbors_of(1), &[2]);
        assert_eq!(index.neighbors_of(2), &[0, 1]);
    }

    #[test]
    fn test_provider_answers_from_triangulation() {
        let mut index = grid();
        let center = index.site(4).unwrap().clone();
        let neighbors = pollster::block_on(index.neighbors(&center)).unwrap();
        let ids: Vec<u32> = neighbors.iter().map(|s| s.data).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);

        let missing = Site::new(Point::new(7.0, 7.0), 9);
        let err = pollster::block_on(index.neighbors(&missing)).unwrap_err();
        assert!(matches!(err, VoronoiError::SiteNotFound { .. }));
    }
}
