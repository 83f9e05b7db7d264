//! Engine Configuration and Builder
//!
//! This module provides the validated configuration shared by every
//! computation of a [`VoronoiEngine`](crate::VoronoiEngine).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};
use crate::geometry::{Point, Triangle, DEFAULT_EPSILON};

/// Configuration for a Voronoi engine
///
/// The frame bounds the computation: every polygon is clipped to it, and the
/// center must lie strictly inside. Choose it large enough to contain every
/// site the provider can return.
///
/// # Example
///
/// ```rust
/// use order_voronoi::*;
///
/// let stations = [Point::new(13.3, 52.4), Point::new(13.5, 52.6)];
/// let config = EngineConfigBuilder::new()
///     .enclosing(&stations, 0.5)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// // Config is serializable (with "serde" feature)
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: EngineConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Triangle that clips every polygon
    pub frame: Triangle,

    /// Tolerance for containment and duplicate-point tests
    ///
    /// Defaults to 2⁻³⁰, fine enough for longitude/latitude coordinates.
    pub epsilon: f64,
}

/// Builder for creating EngineConfig with validation
///
/// # Example
///
/// ```rust
/// use order_voronoi::*;
///
/// let frame = Triangle::new(
///     Point::new(-10.0, -10.0),
///     Point::new(30.0, -10.0),
///     Point::new(-10.0, 30.0),
/// );
/// let config = EngineConfigBuilder::new()
///     .frame(frame)
///     .epsilon(1e-9)
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(config.epsilon, 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    frame: Option<Triangle>,
    epsilon: f64,
}

impl EngineConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - frame: none, must be set before `build()`
    /// - epsilon: [`DEFAULT_EPSILON`]
    pub fn new() -> Self {
        Self {
            frame: None,
            epsilon: DEFAULT_EPSILON,
        }
    }

    /// Set the frame triangle
    pub fn frame(mut self, frame: Triangle) -> Self {
        self.frame = Some(frame);
        self
    }

    /// Use a frame enclosing `points` with at least `margin` to spare
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `points` is empty, any coordinate is not
    /// finite, or `margin` is not positive
    pub fn enclosing(mut self, points: &[Point], margin: f64) -> Result<Self> {
        let frame = Triangle::enclosing(points, margin).ok_or_else(|| {
            VoronoiError::InvalidConfig(format!(
                "cannot enclose {} points with margin {}",
                points.len(),
                margin
            ))
        })?;
        self.frame = Some(frame);
        Ok(self)
    }

    /// Set the tolerance for containment and duplicate-point tests
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if epsilon is not a positive finite number
    pub fn epsilon(mut self, epsilon: f64) -> Result<Self> {
        if epsilon <= 0.0 || !epsilon.is_finite() {
            return Err(VoronoiError::InvalidConfig(format!(
                "epsilon must be positive and finite (got {})",
                epsilon
            )));
        }
        self.epsilon = epsilon;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if no frame was set or the frame is degenerate
    pub fn build(self) -> Result<EngineConfig> {
        let frame = self
            .frame
            .ok_or_else(|| VoronoiError::InvalidConfig("no frame set".into()))?;
        if frame.is_degenerate(self.epsilon) {
            return Err(VoronoiError::InvalidConfig(format!(
                "frame {:?} is degenerate",
                frame.corners()
            )));
        }

        Ok(EngineConfig {
            frame,
            epsilon: self.epsilon,
        })
    }
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
