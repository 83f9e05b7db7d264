//! VoronoiEngine main structure

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::EngineConfig;
use crate::error::{Result, VoronoiError};
use crate::geometry::{Point, Site};
use crate::graph::{Graph, Walk};
use crate::polygon::OrderPolygon;
use crate::provider::NeighborProvider;

/// Incremental order-k Voronoi engine around a fixed center site
///
/// The engine computes, for each order `k = 1, 2, ...`, the region where the
/// center is among the `k` nearest sites, discovering sites on demand through
/// a [`NeighborProvider`]. Only the sites near the growing region are ever
/// requested.
///
/// # Type Parameters
///
/// * `T` - Data attached to every site (e.g. a station ID)
///
/// # Examples
///
/// ```
/// use std::convert::Infallible;
/// use order_voronoi::*;
///
/// let frame = Triangle::new(
///     Point::new(-5.0, -5.0),
///     Point::new(15.0, -5.0),
///     Point::new(-5.0, 15.0),
/// );
/// let config = EngineConfigBuilder::new().frame(frame).build().unwrap();
/// let engine = VoronoiEngine::new(config, Site::new(Point::ZERO, "center")).unwrap();
///
/// // One neighbor to the east halves the frame at x = 0.5
/// let mut neighbors = provider::from_fn(|_site: Site<&str>| async {
///     Ok::<_, Infallible>(vec![Site::new(Point::new(1.0, 0.0), "east")])
/// });
///
/// let polygons = pollster::block_on(engine.execute(1, &mut neighbors, |order, points| {
///     println!("order {order}: {} vertices", points.len());
/// }))
/// .unwrap();
///
/// assert_eq!(polygons[0].vertex_count(), 4);
/// assert!(polygons[0].contains(Point::ZERO));
/// ```
#[derive(Debug)]
pub struct VoronoiEngine<T> {
    /// Frame and tolerance shared by every computation
    config: EngineConfig,

    /// Site whose order-k regions are computed
    center: Site<T>,

    /// Set while an `execute()` future is alive
    running: AtomicBool,
}

impl<T> VoronoiEngine<T>
where
    T: Clone + Eq + Hash,
{
    /// Create an engine for `center`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the center does not lie strictly inside the frame
    pub fn new(config: EngineConfig, center: Site<T>) -> Result<Self> {
        if !config.frame.contains_strictly(center.position, config.epsilon) {
            return Err(VoronoiError::InvalidConfig(format!(
                "center ({}, {}) is not strictly inside the frame",
                center.position.x, center.position.y
            )));
        }

        Ok(Self {
            config,
            center,
            running: AtomicBool::new(false),
        })
    }

    /// Configuration of this engine
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The center site
    #[inline]
    pub fn center(&self) -> &Site<T> {
        &self.center
    }

    /// Whether a computation is currently in flight
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Compute the order-1 through order-`max_order` polygons
    ///
    /// Orders are computed strictly in sequence. After each order closes,
    /// `on_order(k, vertices)` is called before the next order requests any
    /// neighbors. Provider requests are awaited one at a time.
    ///
    /// Dropping the returned future abandons the computation; the engine can
    /// be used again afterwards.
    ///
    /// # Arguments
    ///
    /// * `max_order` - Highest order to compute, at least 1
    /// * `provider` - Source of Delaunay neighbors
    /// * `on_order` - Called with each completed order and its vertices
    ///
    /// # Errors
    ///
    /// - `InvalidOrder` if `max_order` is 0
    /// - `AlreadyRunning` if another computation on this engine is in flight
    /// - `Provider` if a neighbor request fails
    /// - Duplicate-data and graph errors as described on [`VoronoiError`]
    pub async fn execute<P, F>(
        &self,
        max_order: u32,
        provider: &mut P,
        mut on_order: F,
    ) -> Result<Vec<OrderPolygon<T>>>
    where
        P: NeighborProvider<T>,
        F: FnMut(u32, &[Point]),
    {
        if max_order == 0 {
            return Err(VoronoiError::InvalidOrder(max_order));
        }
        let _guard = RunningGuard::acquire(&self.running)?;

        tracing::debug!(
            max_order,
            x = self.center.position.x,
            y = self.center.position.y,
            "starting computation"
        );

        let mut computation = Computation::new(&self.config, &self.center)?;
        let mut polygons = Vec::with_capacity(max_order as usize);
        for order in 1..=max_order {
            let polygon = computation.advance(order, provider).await?;
            on_order(order, &polygon.vertices);
            polygons.push(polygon);
        }
        computation.release();

        Ok(polygons)
    }
}

/// Clears the running flag when a computation ends, however it ends
struct RunningGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| VoronoiError::AlreadyRunning)?;
        Ok(Self { flag })
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// State of one `execute()` call
struct Computation<'e, T> {
    center: &'e Site<T>,
    graph: Graph,
    /// Inserted sites, indexed by the handle stored on their bisector
    sites: Vec<Site<T>>,
    requested: HashSet<Site<T>>,
    inserted: HashSet<Site<T>>,
    /// Walk of the last completed order
    previous: Option<Walk>,
}

impl<'e, T> Computation<'e, T>
where
    T: Clone + Eq + Hash,
{
    fn new(config: &EngineConfig, center: &'e Site<T>) -> Result<Self> {
        let graph = Graph::new(config.frame, center.position, config.epsilon)?;
        // Neighbors of other sites include the center itself
        let requested = HashSet::from([center.clone()]);
        let inserted = HashSet::from([center.clone()]);

        Ok(Self {
            center,
            graph,
            sites: Vec::new(),
            requested,
            inserted,
            previous: None,
        })
    }

    /// Expand the frontier for `order`, then locate and walk its polygon
    async fn advance<P>(&mut self, order: u32, provider: &mut P) -> Result<OrderPolygon<T>>
    where
        P: NeighborProvider<T>,
    {
        let sources: Vec<Site<T>> = match &self.previous {
            None => vec![self.center.clone()],
            Some(walk) => self
                .boundary_sites(walk)
                .into_iter()
                .filter(|site| !self.requested.contains(site))
                .collect(),
        };

        let mut new_sites = Vec::new();
        for source in sources {
            self.requested.insert(source.clone());
            tracing::trace!(
                order,
                x = source.position.x,
                y = source.position.y,
                "requesting neighbors"
            );
            let neighbors = provider
                .neighbors(&source)
                .await
                .map_err(|e| VoronoiError::Provider(Box::new(e)))?;
            for site in neighbors {
                if self.inserted.contains(&site) {
                    continue;
                }
                self.insert(site.clone())?;
                new_sites.push(site);
            }
        }

        let start = match &self.previous {
            None => self.graph.first_order_start()?,
            Some(walk) => self.graph.next_order_start(walk, order)?,
        };
        let walk = self.graph.walk(start, order)?;
        self.graph.solve(&walk)?;

        let vertices: Vec<Point> = walk.arrivals.iter().map(|a| self.graph.point_of(*a)).collect();
        let boundary_sites = self.boundary_sites(&walk);
        tracing::debug!(
            order,
            vertices = vertices.len(),
            new_sites = new_sites.len(),
            sites = self.graph.site_count(),
            "order polygon closed"
        );

        self.previous = Some(walk);
        Ok(OrderPolygon::new(order, vertices, boundary_sites, new_sites))
    }

    fn insert(&mut self, site: Site<T>) -> Result<()> {
        self.graph.insert_site(self.sites.len(), site.position)?;
        self.inserted.insert(site.clone());
        self.sites.push(site);
        Ok(())
    }

    /// Distinct sites whose bisectors pass through the walk's vertices, in walk order
    fn boundary_sites(&self, walk: &Walk) -> Vec<Site<T>> {
        let graph = &self.graph;
        let sites = &self.sites;
        let mut seen = HashSet::new();
        walk.arrivals
            .iter()
            .flat_map(move |a| graph.sites_at(*a))
            .filter(|handle| seen.insert(*handle))
            .map(|handle| sites[handle].clone())
            .collect()
    }

    fn release(&mut self) {
        self.graph.release();
        self.sites.clear();
        self.requested.clear();
        self.inserted.clear();
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfigBuilder;
    use crate::geometry::Triangle;
    use crate::provider::{from_fn, FnProvider};
    use std::cell::RefCell;
    use std::convert::Infallible;
    use std::future::{ready, Ready};

    type Script = Vec<(Site<u32>, Vec<Site<u32>>)>;

    fn site(x: f64, y: f64, id: u32) -> Site<u32> {
        Site::new(Point::new(x, y), id)
    }

    fn small_frame() -> Triangle {
        Triangle::new(
            Point::new(-5.0, -5.0),
            Point::new(15.0, -5.0),
            Point::new(-5.0, 15.0),
        )
    }

    fn wide_frame() -> Triangle {
        Triangle::new(
            Point::new(-10.0, -10.0),
            Point::new(30.0, -10.0),
            Point::new(-10.0, 30.0),
        )
    }

    fn engine(frame: Triangle) -> VoronoiEngine<u32> {
        let config = EngineConfigBuilder::new().frame(frame).build().unwrap();
        VoronoiEngine::new(config, site(0.0, 0.0, 0)).unwrap()
    }

    /// Provider answering from a fixed site-to-neighbors table
    fn scripted(
        script: Script,
    ) -> FnProvider<impl FnMut(Site<u32>) -> Ready<std::result::Result<Vec<Site<u32>>, Infallible>>>
    {
        from_fn(move |query: Site<u32>| {
            let found = script
                .iter()
                .find(|(s, _)| *s == query)
                .map(|(_, neighbors)| neighbors.clone())
                .unwrap_or_default();
            ready(Ok(found))
        })
    }

    fn cross_script() -> Script {
        vec![(
            site(0.0, 0.0, 0),
            vec![
                site(2.0, 0.0, 1),
                site(0.0, 2.0, 2),
                site(-2.0, 0.0, 3),
                site(0.0, -2.0, 4),
            ],
        )]
    }

    fn same_cycle(actual: &[Point], expected: &[Point]) -> bool {
        if actual.len() != expected.len() {
            return false;
        }
        let Some(offset) = actual
            .iter()
            .position(|p| (*p - expected[0]).length() < 1e-9)
        else {
            return false;
        };
        expected
            .iter()
            .enumerate()
            .all(|(i, e)| (actual[(i + offset) % actual.len()] - *e).length() < 1e-9)
    }

    #[test]
    fn test_single_neighbor_clips_frame() {
        let engine = engine(small_frame());
        let mut provider = scripted(vec![(site(0.0, 0.0, 0), vec![site(1.0, 0.0, 1)])]);
        let mut emitted = Vec::new();

        let polygons = pollster::block_on(engine.execute(1, &mut provider, |order, points| {
            emitted.push((order, points.len()));
        }))
        .unwrap();

        assert_eq!(emitted, vec![(1, 4)]);
        assert_eq!(polygons.len(), 1);
        let polygon = &polygons[0];
        assert_eq!(polygon.order, 1);
        assert!(same_cycle(
            &polygon.vertices,
            &[
                Point::new(-5.0, 15.0),
                Point::new(-5.0, -5.0),
                Point::new(0.5, -5.0),
                Point::new(0.5, 9.5),
            ]
        ));
        assert_eq!(polygon.boundary_sites, vec![site(1.0, 0.0, 1)]);
        assert_eq!(polygon.new_sites, vec![site(1.0, 0.0, 1)]);
        assert!(polygon.contains(Point::ZERO));
    }

    #[test]
    fn test_enclosed_orders() {
        let engine = engine(wide_frame());
        let mut provider = scripted(cross_script());

        let polygons = pollster::block_on(engine.execute(3, &mut provider, |_, _| {})).unwrap();

        let counts: Vec<usize> = polygons.iter().map(|p| p.vertex_count()).collect();
        assert_eq!(counts, vec![4, 12, 11]);
        assert!(same_cycle(
            &polygons[0].vertices,
            &[
                Point::new(-1.0, -1.0),
                Point::new(-1.0, 1.0),
                Point::new(1.0, 1.0),
                Point::new(1.0, -1.0),
            ]
        ));
        assert!((polygons[0].area() - 4.0).abs() < 1e-9);
        assert!(polygons[1].area() > 4.0 && polygons[1].area() < 800.0);
        // No point has more than two closer sites, so order 3 is the whole frame
        assert!((polygons[2].area() - 800.0).abs() < 1e-6);

        assert_eq!(polygons[0].new_sites.len(), 4);
        assert!(polygons[1].new_sites.is_empty());
        assert_eq!(polygons[0].boundary_sites.len(), 4);
        for polygon in &polygons {
            assert!(polygon.is_simple(1e-9));
            assert!(polygon.contains(Point::ZERO));
        }
    }

    #[test]
    fn test_no_neighbors_yields_frame() {
        let engine = engine(small_frame());
        let mut provider = scripted(vec![]);

        let polygons = pollster::block_on(engine.execute(2, &mut provider, |_, _| {})).unwrap();

        for polygon in &polygons {
            assert_eq!(polygon.vertex_count(), 3);
            assert!((polygon.area() - 200.0).abs() < 1e-9);
            assert!(polygon.boundary_sites.is_empty());
        }
    }

    #[test]
    fn test_requests_follow_emitted_orders() {
        let engine = engine(wide_frame());
        let log = RefCell::new(Vec::new());
        let script = cross_script();
        let mut provider = from_fn(|query: Site<u32>| {
            log.borrow_mut().push(format!("request {}", query.data));
            let found = script
                .iter()
                .find(|(s, _)| *s == query)
                .map(|(_, neighbors)| neighbors.clone())
                .unwrap_or_default();
            ready(Ok::<_, Infallible>(found))
        });

        pollster::block_on(engine.execute(3, &mut provider, |order, _| {
            log.borrow_mut().push(format!("order {order}"));
        }))
        .unwrap();
        drop(provider);

        let log = log.into_inner();
        assert_eq!(log[0], "request 0");
        assert_eq!(log[1], "order 1");
        let order_2 = log.iter().position(|entry| entry == "order 2").unwrap();
        // Every boundary site of order 1 is requested exactly once, before order 2
        let mut requested: Vec<&str> = log[2..order_2].iter().map(String::as_str).collect();
        requested.sort_unstable();
        assert_eq!(requested, vec!["request 1", "request 2", "request 3", "request 4"]);
        assert_eq!(&log[order_2 + 1..], &["order 3".to_string()]);
    }

    #[test]
    fn test_late_site_invalidates_emitted_polygon() {
        let engine = engine(small_frame());
        let mut provider = scripted(vec![
            (site(0.0, 0.0, 0), vec![site(1.0, 0.0, 1)]),
            (site(1.0, 0.0, 1), vec![site(0.0, 1.0, 2)]),
        ]);
        let mut emitted = Vec::new();

        let result = pollster::block_on(engine.execute(2, &mut provider, |order, _| {
            emitted.push(order);
        }));

        assert!(matches!(result, Err(VoronoiError::ResolvedSegment { .. })));
        assert_eq!(emitted, vec![1]);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_reentrant_execute_is_rejected() {
        let engine = engine(small_frame());
        let nested = RefCell::new(None);
        let mut provider = from_fn(|_query: Site<u32>| {
            let engine = &engine;
            let nested = &nested;
            async move {
                let mut empty = from_fn(|_: Site<u32>| ready(Ok::<Vec<Site<u32>>, Infallible>(vec![])));
                let result = engine.execute(1, &mut empty, |_, _| {}).await;
                *nested.borrow_mut() = Some(result.map(|polygons| polygons.len()));
                Ok::<_, Infallible>(vec![site(1.0, 0.0, 1)])
            }
        });

        let polygons = pollster::block_on(engine.execute(1, &mut provider, |_, _| {})).unwrap();
        drop(provider);

        assert_eq!(polygons[0].vertex_count(), 4);
        assert!(matches!(
            nested.into_inner(),
            Some(Err(VoronoiError::AlreadyRunning))
        ));
        assert!(!engine.is_running());

        // The flag is released, so the engine runs again
        let mut provider = scripted(vec![]);
        assert!(pollster::block_on(engine.execute(1, &mut provider, |_, _| {})).is_ok());
    }

    #[test]
    fn test_provider_failure_aborts() {
        let engine = engine(small_frame());
        let mut provider = from_fn(|_: Site<u32>| {
            ready(Err::<Vec<Site<u32>>, _>(std::io::Error::new(
                std::io::ErrorKind::Other,
                "station service offline",
            )))
        });

        let err = pollster::block_on(engine.execute(2, &mut provider, |_, _| {})).unwrap_err();

        assert!(matches!(err, VoronoiError::Provider(_)));
        assert!(err.to_string().contains("station service offline"));
        assert!(!engine.is_running());
    }

    #[test]
    fn test_neighbor_at_center_is_duplicate_point() {
        let engine = engine(small_frame());
        let mut provider = scripted(vec![(site(0.0, 0.0, 0), vec![site(0.0, 0.0, 9)])]);

        let err = pollster::block_on(engine.execute(1, &mut provider, |_, _| {})).unwrap_err();
        assert!(matches!(err, VoronoiError::DuplicatePoint { .. }));
    }

    #[test]
    fn test_coincident_neighbors_are_duplicate_sites() {
        let engine = engine(small_frame());
        let mut provider = scripted(vec![(
            site(0.0, 0.0, 0),
            vec![site(2.0, 0.0, 1), site(2.0, 0.0, 2)],
        )]);

        let err = pollster::block_on(engine.execute(1, &mut provider, |_, _| {})).unwrap_err();
        assert!(matches!(err, VoronoiError::DuplicateSite { .. }));
    }

    #[test]
    fn test_repeated_neighbors_are_inserted_once() {
        let engine = engine(small_frame());
        let mut provider = scripted(vec![(
            site(0.0, 0.0, 0),
            vec![site(1.0, 0.0, 1), site(1.0, 0.0, 1)],
        )]);

        let polygons = pollster::block_on(engine.execute(1, &mut provider, |_, _| {})).unwrap();
        assert_eq!(polygons[0].new_sites.len(), 1);
        assert_eq!(polygons[0].vertex_count(), 4);
    }

    #[test]
    fn test_center_in_neighbor_lists_is_skipped() {
        let engine = engine(wide_frame());
        let mut script = cross_script();
        script.push((site(2.0, 0.0, 1), vec![site(0.0, 0.0, 0), site(0.0, 2.0, 2)]));
        let mut provider = scripted(script);

        let polygons = pollster::block_on(engine.execute(2, &mut provider, |_, _| {})).unwrap();
        assert_eq!(polygons[1].vertex_count(), 12);
        assert!(polygons[1].new_sites.is_empty());
    }

    #[test]
    fn test_zero_order_is_invalid() {
        let engine = engine(small_frame());
        let mut provider = scripted(vec![]);
        let err = pollster::block_on(engine.execute(0, &mut provider, |_, _| {})).unwrap_err();
        assert!(matches!(err, VoronoiError::InvalidOrder(0)));
    }

    #[test]
    fn test_center_outside_frame() {
        let config = EngineConfigBuilder::new().frame(small_frame()).build().unwrap();
        let result = VoronoiEngine::new(config, site(20.0, 20.0, 0));
        assert!(matches!(result, Err(VoronoiError::InvalidConfig(_))));

        // On the frame edge is not strictly inside either
        let result = VoronoiEngine::new(config, site(0.0, -5.0, 0));
        assert!(result.is_err());
    }

    #[test]
    fn test_deterministic_results() {
        let run = || {
            let engine = engine(wide_frame());
            let mut provider = scripted(cross_script());
            pollster::block_on(engine.execute(3, &mut provider, |_, _| {})).unwrap()
        };
        assert_eq!(run(), run());
    }
}
