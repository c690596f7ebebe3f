use std::error::Error;
use std::fmt;

use crate::models::ElementId;

/// Represents errors that can occur while configuring or driving a spatial index.
///
/// Queries, rebuilds and force traversals never produce these; they only come out of
/// validating constructors and the relaxer's lifecycle methods.
#[derive(Debug, Clone, PartialEq)]
pub enum ForceTreeError {
    /// The layout bounds are negative, zero-sized or not finite.
    InvalidBounds { width: f64, height: f64 },
    /// The Barnes-Hut opening angle must be strictly positive and finite.
    InvalidTheta(f64),
    /// The quadtree depth cap must be at least one.
    InvalidMaxDepth(u32),
    /// An R-tree node must be able to hold at least two children.
    InvalidNodeCapacity(usize),
    /// The force law's minimum distance must be strictly positive.
    InvalidMinDistance(f64),
    /// The integration time step must be strictly positive.
    InvalidTimeStep(f64),
    /// The relaxer was started while already running.
    AlreadyRunning,
    /// The relaxer was stopped or paused while idle.
    NotRunning,
    /// The relaxer's background worker panicked.
    WorkerPanicked,
    /// The element is not known to the layout model.
    UnknownElement(ElementId),
}

impl fmt::Display for ForceTreeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ForceTreeError::InvalidBounds { width, height } => {
                write!(f, "Invalid layout bounds: {} x {}", width, height)
            }
            ForceTreeError::InvalidTheta(theta) => write!(f, "Invalid opening angle: {}", theta),
            ForceTreeError::InvalidMaxDepth(depth) => write!(f, "Invalid maximum depth: {}", depth),
            ForceTreeError::InvalidNodeCapacity(n) => write!(f, "Invalid node capacity: {}", n),
            ForceTreeError::InvalidMinDistance(d) => write!(f, "Invalid minimum distance: {}", d),
            ForceTreeError::InvalidTimeStep(dt) => write!(f, "Invalid time step: {}", dt),
            ForceTreeError::AlreadyRunning => write!(f, "Relaxer is already running"),
            ForceTreeError::NotRunning => write!(f, "Relaxer is not running"),
            ForceTreeError::WorkerPanicked => write!(f, "Relaxer worker thread panicked"),
            ForceTreeError::UnknownElement(id) => write!(f, "Unknown element: {}", id),
        }
    }
}

impl Error for ForceTreeError {}
