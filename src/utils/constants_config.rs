// src/utils/constants_config.rs
use std::time::Duration;

use crate::utils::{
    DEFAULT_BARNES_HUT_CONFIG,
    DEFAULT_FORCE_TREE_CONFIG,
    DEFAULT_LAYOUT_CONFIG,
    DEFAULT_RELAXER_CONFIG,
    errors::ForceTreeError
};

/// What the quadtree does with an element whose position lies outside the root bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfBoundsPolicy {
    /// Move the element onto the nearest point of the root rectangle.
    Clamp,
    /// Leave the element out of the tree.
    Reject,
}

/// Structural parameters shared by the spatial indexes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceTreeConfig {
    /// Depth below which quadtree leaves stop splitting and start bucketing.
    pub max_depth: u32,
    pub out_of_bounds: OutOfBoundsPolicy,
    /// Fan-out of a packed R-tree node.
    pub rtree_max_children: usize,
}

impl Default for ForceTreeConfig {
    fn default() -> Self {
        DEFAULT_FORCE_TREE_CONFIG
    }
}

impl ForceTreeConfig {
    /// Creates a configuration, falling back to the defaults for every `None`.
    ///
    /// # Example
    /// ```
    /// use rs_force_tree::utils::{ForceTreeConfig, OutOfBoundsPolicy};
    ///
    /// let config = ForceTreeConfig::new(Some(12), None, None);
    /// assert_eq!(config.max_depth, 12);
    /// assert_eq!(config.out_of_bounds, OutOfBoundsPolicy::Clamp);
    /// assert_eq!(config.rtree_max_children, 8);
    /// ```
    pub fn new(
        max_depth: Option<u32>,
        out_of_bounds: Option<OutOfBoundsPolicy>,
        rtree_max_children: Option<usize>,
    ) -> Self {
        let default = DEFAULT_FORCE_TREE_CONFIG;
        Self {
            max_depth: max_depth.unwrap_or(default.max_depth),
            out_of_bounds: out_of_bounds.unwrap_or(default.out_of_bounds),
            rtree_max_children: rtree_max_children.unwrap_or(default.rtree_max_children),
        }
    }

    pub fn validate(&self) -> Result<(), ForceTreeError> {
        if self.max_depth == 0 { return Err(ForceTreeError::InvalidMaxDepth(self.max_depth)); }
        if self.rtree_max_children < 2 {
            return Err(ForceTreeError::InvalidNodeCapacity(self.rtree_max_children));
        }
        Ok(())
    }
}

/// Accuracy and numeric guard of the Barnes-Hut traversal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarnesHutConfig {
    /// Opening angle. Smaller is more exact; `0.5..=1.0` is the usual range.
    pub theta: f64,
    /// Distances below this are clamped before evaluating a force law.
    pub min_distance: f64,
}

impl Default for BarnesHutConfig {
    fn default() -> Self {
        DEFAULT_BARNES_HUT_CONFIG
    }
}

impl BarnesHutConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    /// Returns an error if `theta` or `min_distance` is not strictly positive and finite.
    ///
    /// # Example
    /// ```
    /// use rs_force_tree::utils::{BarnesHutConfig, ForceTreeError};
    ///
    /// assert!(BarnesHutConfig::new(Some(0.5), None).is_ok());
    /// assert_eq!(BarnesHutConfig::new(Some(0.0), None), Err(ForceTreeError::InvalidTheta(0.0)));
    /// ```
    pub fn new(theta: Option<f64>, min_distance: Option<f64>) -> Result<Self, ForceTreeError> {
        let default = DEFAULT_BARNES_HUT_CONFIG;
        let config = Self {
            theta: theta.unwrap_or(default.theta),
            min_distance: min_distance.unwrap_or(default.min_distance),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ForceTreeError> {
        if !(self.theta > 0.0 && self.theta.is_finite()) {
            return Err(ForceTreeError::InvalidTheta(self.theta));
        }
        if !(self.min_distance > 0.0 && self.min_distance.is_finite()) {
            return Err(ForceTreeError::InvalidMinDistance(self.min_distance));
        }
        Ok(())
    }
}

/// Integration parameters for the layout loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub time_step: f64,
    /// Upper bound on how far a single element may travel in one step.
    pub max_displacement: f64,
    /// A step whose largest displacement falls below this counts as converged.
    pub convergence_threshold: f64,
    pub max_iterations: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        DEFAULT_LAYOUT_CONFIG
    }
}

impl LayoutConfig {
    pub fn new(
        time_step: Option<f64>,
        max_displacement: Option<f64>,
        convergence_threshold: Option<f64>,
        max_iterations: Option<usize>,
    ) -> Result<Self, ForceTreeError> {
        let default = DEFAULT_LAYOUT_CONFIG;
        let config = Self {
            time_step: time_step.unwrap_or(default.time_step),
            max_displacement: max_displacement.unwrap_or(default.max_displacement),
            convergence_threshold: convergence_threshold.unwrap_or(default.convergence_threshold),
            max_iterations: max_iterations.unwrap_or(default.max_iterations),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ForceTreeError> {
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(ForceTreeError::InvalidTimeStep(self.time_step));
        }
        Ok(())
    }
}

/// Pacing of the background relaxer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaxerConfig {
    pub sleep_between_steps: Duration,
    /// Wall-clock budget for `Relaxer::prerelax`.
    pub prerelax_duration: Duration,
    pub max_prerelax_steps: usize,
}

impl Default for RelaxerConfig {
    fn default() -> Self {
        DEFAULT_RELAXER_CONFIG
    }
}

impl RelaxerConfig {
    pub fn new(
        sleep_between_steps: Option<Duration>,
        prerelax_duration: Option<Duration>,
        max_prerelax_steps: Option<usize>,
    ) -> Self {
        let default = DEFAULT_RELAXER_CONFIG;
        Self {
            sleep_between_steps: sleep_between_steps.unwrap_or(default.sleep_between_steps),
            prerelax_duration: prerelax_duration.unwrap_or(default.prerelax_duration),
            max_prerelax_steps: max_prerelax_steps.unwrap_or(default.max_prerelax_steps),
        }
    }
}
