//! Incremental higher-order Voronoi regions
//!
//! A standalone library for computing, around one center site, the region
//! where that site is among the `k` nearest for `k = 1, 2, ...`, discovering
//! the surrounding sites lazily through an async neighbor provider.
//!
//! Typical use is coverage analysis around a station: order 1 is the area the
//! station serves first, order 2 where it is the first or second choice, and
//! so on.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use order_voronoi::*;
//!
//! let stations: Vec<Site<u32>> = (0..50)
//!     .map(|i| {
//!         let angle = i as f64 * 2.399;
//!         let radius = (i as f64).sqrt();
//!         Site::new(Point::new(radius * angle.cos(), radius * angle.sin()), i)
//!     })
//!     .collect();
//! let positions: Vec<Point> = stations.iter().map(|s| s.position).collect();
//!
//! let config = EngineConfigBuilder::new()
//!     .enclosing(&positions, 1.0)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let mut index = SiteIndex::new(stations.clone());
//! let engine = VoronoiEngine::new(config, stations[0].clone()).unwrap();
//!
//! let polygons = pollster::block_on(engine.execute(3, &mut index, |order, points| {
//!     println!("order {order}: {} vertices", points.len());
//! }))
//! .unwrap();
//! assert_eq!(polygons.len(), 3);
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables [`SiteIndex`], a KD-tree and Delaunay
//!   backed provider for site sets held in memory
//! - `serde`: Enables serialization support for configuration, sites and polygons

// Modules
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
mod graph;
pub mod polygon;
pub mod provider;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use config::{EngineConfig, EngineConfigBuilder};
pub use engine::VoronoiEngine;
pub use error::{ProviderError, Result, VoronoiError};
pub use geometry::{Edge, Line, Point, PointKey, Site, Triangle, DEFAULT_EPSILON};
pub use graph::VertexOrder;
pub use polygon::OrderPolygon;
pub use provider::{from_fn, FnProvider, NeighborProvider};

#[cfg(feature = "spatial-index")]
pub use spatial::SiteIndex;
