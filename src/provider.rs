//! Neighbor discovery
//!
//! The engine never sees the full site set. It asks a [`NeighborProvider`]
//! for the Delaunay neighbors of individual sites as the computation grows
//! outward from the center.

use std::future::Future;

use crate::geometry::Site;

/// Source of Delaunay neighbors for a site
///
/// Implementations typically wrap a remote service or a local spatial
/// index. The engine awaits each request before issuing the next one, so an
/// implementation never sees concurrent calls from the same computation.
///
/// # Contract
///
/// `neighbors(s)` must return every site sharing a Delaunay edge with `s`
/// in the full site set. Returning extra sites is harmless; leaving one out
/// can make a later insertion split a polygon that was already emitted,
/// which the engine reports as an error.
pub trait NeighborProvider<T> {
    /// Error type of a failed request
    type Error: std::error::Error + Send + Sync + 'static;

    /// Delaunay neighbors of `site`
    fn neighbors(
        &mut self,
        site: &Site<T>,
    ) -> impl Future<Output = Result<Vec<Site<T>>, Self::Error>>;
}

/// A [`NeighborProvider`] backed by a closure
///
/// Created with [`from_fn`].
#[derive(Debug, Clone)]
pub struct FnProvider<F> {
    f: F,
}

/// Build a [`NeighborProvider`] from an async closure
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
/// use order_voronoi::{provider, NeighborProvider, Point, Site};
///
/// let mut provider = provider::from_fn(|site: Site<u32>| async move {
///     let east = Site::new(site.position + Point::new(1.0, 0.0), site.data + 1);
///     Ok::<_, Infallible>(vec![east])
/// });
///
/// let center = Site::new(Point::ZERO, 0);
/// let neighbors = pollster::block_on(provider.neighbors(&center)).unwrap();
/// assert_eq!(neighbors[0].data, 1);
/// ```
pub fn from_fn<F>(f: F) -> FnProvider<F> {
    FnProvider { f }
}

impl<T, F, Fut, E> NeighborProvider<T> for FnProvider<F>
where
    T: Clone,
    F: FnMut(Site<T>) -> Fut,
    Fut: Future<Output = Result<Vec<Site<T>>, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn neighbors(&mut self, site: &Site<T>) -> impl Future<Output = Result<Vec<Site<T>>, E>> {
        (self.f)(site.clone())
    }
}
