//! Error types for higher-order Voronoi computations

use thiserror::Error;

use crate::graph::VertexOrder;

/// Boxed error returned by a [`NeighborProvider`](crate::NeighborProvider)
pub type ProviderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort a computation
///
/// None of these are recovered inside the engine. A failed `execute()` leaves
/// nothing behind; retry with a fresh call.
#[derive(Debug, Error)]
pub enum VoronoiError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Requested order is not at least 1
    #[error("requested order must be at least 1 (got {0})")]
    InvalidOrder(u32),

    /// `execute()` was called while another computation is in flight
    #[error("a computation is already running on this engine")]
    AlreadyRunning,

    /// A point already exists at this position on a bisector, or a site sits on the center
    #[error("duplicate point at ({x}, {y})")]
    DuplicatePoint {
        /// X coordinate of the offending point
        x: f64,
        /// Y coordinate of the offending point
        y: f64,
    },

    /// A new site has the same position as a site already in the graph
    #[error("site at ({x}, {y}) coincides with an existing site")]
    DuplicateSite {
        /// X coordinate of the site
        x: f64,
        /// Y coordinate of the site
        y: f64,
    },

    /// A new intersection splits a segment an emitted polygon already walked
    #[error("intersection at ({x}, {y}) falls inside an already resolved segment")]
    ResolvedSegment {
        /// X coordinate of the intersection
        x: f64,
        /// Y coordinate of the intersection
        y: f64,
    },

    /// No starting vertex could be found for an order
    #[error("no starting vertex found for order {order}")]
    NoStartVertex {
        /// Order being located
        order: u32,
    },

    /// The boundary walk hit the end of a bisector
    #[error("order {order} traversal could not find a next vertex after ({x}, {y})")]
    NoNextVertex {
        /// Order being walked
        order: u32,
        /// X coordinate of the last vertex reached
        x: f64,
        /// Y coordinate of the last vertex reached
        y: f64,
    },

    /// The boundary walk visited a vertex twice before closing
    #[error("order {order} traversal revisited ({x}, {y}) before the polygon closed")]
    VertexRevisited {
        /// Order being walked
        order: u32,
        /// X coordinate of the repeated vertex
        x: f64,
        /// Y coordinate of the repeated vertex
        y: f64,
    },

    /// A vertex was resolved again with a different order
    #[error("vertex at ({x}, {y}) already has order {existing}, computed {computed}")]
    OrderConflict {
        /// X coordinate of the vertex
        x: f64,
        /// Y coordinate of the vertex
        y: f64,
        /// Order stored on the vertex
        existing: VertexOrder,
        /// Order computed by the current traversal
        computed: VertexOrder,
    },

    /// Graph links are inconsistent
    #[error("corrupt graph: {0}")]
    CorruptGraph(String),

    /// The neighbor provider has no site at this position
    #[error("no site at ({x}, {y})")]
    SiteNotFound {
        /// X coordinate that was looked up
        x: f64,
        /// Y coordinate that was looked up
        y: f64,
    },

    /// The neighbor provider failed
    #[error("neighbor provider failed: {0}")]
    Provider(#[source] ProviderError),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, VoronoiError>;
