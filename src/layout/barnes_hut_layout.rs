use std::sync::Arc;

use log::{debug, trace};
use rayon::prelude::*;

use crate::layout::LayoutModel;
use crate::models::{ElementId, ForceObject, Point, Rectangle};
use crate::quadtree::{ForceLaw, QuadTree};
use crate::spatial::SharedIndex;
use crate::utils::{BarnesHutConfig, ForceTreeConfig, ForceTreeError, LayoutConfig};

/// Result of a single layout iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Converged,
}

/// An iterative layout that a [`Relaxer`](crate::layout::Relaxer) can drive.
pub trait LayoutAlgorithm {
    /// Runs one iteration. Once converged, further calls do nothing and keep returning
    /// [`StepOutcome::Converged`] until [`reset`](LayoutAlgorithm::reset).
    fn step(&mut self) -> StepOutcome;

    fn is_converged(&self) -> bool;

    /// Iterations run since construction or the last reset.
    fn iterations(&self) -> usize;

    fn reset(&mut self);
}

/// A force-directed layout whose only force is a caller-supplied pairwise law,
/// evaluated with the Barnes-Hut approximation.
///
/// Every step rebuilds and publishes the shared quadtree from the model's positions,
/// computes the force on each unlocked element in parallel against that snapshot, and
/// moves each element by `force * time_step`, limited to `max_displacement` and kept
/// inside the model's bounds. Pickers holding [`index`](BarnesHutLayout::index) query
/// the same snapshots the layout computes forces with.
///
/// # Examples
///
/// ```
/// use rs_force_tree::layout::{BarnesHutLayout, GraphLayout, LayoutAlgorithm, StepOutcome};
/// use rs_force_tree::models::Point;
/// use rs_force_tree::quadtree::InverseSquareRepulsion;
/// use rs_force_tree::utils::{BarnesHutConfig, ForceTreeConfig, LayoutConfig};
///
/// let mut model = GraphLayout::new(600.0, 600.0).unwrap();
/// let a = model.add_element(Point::new(290.0, 300.0));
/// let b = model.add_element(Point::new(310.0, 300.0));
///
/// let mut layout = BarnesHutLayout::new(
///     model,
///     InverseSquareRepulsion::new(4000.0, 1.0),
///     BarnesHutConfig::default(),
///     LayoutConfig::default(),
///     ForceTreeConfig::default(),
/// )
/// .unwrap();
///
/// assert_eq!(layout.step(), StepOutcome::Continue);
/// assert!(layout.model().position(a).unwrap().x < 290.0);
/// assert!(layout.model().position(b).unwrap().x > 310.0);
/// ```
pub struct BarnesHutLayout<M, F> {
    model: M,
    law: F,
    barnes_hut: BarnesHutConfig,
    config: LayoutConfig,
    index: Arc<SharedIndex<QuadTree>>,
    iterations: usize,
    converged: bool,
    last_max_displacement: f64,
}

impl<M, F> BarnesHutLayout<M, F>
where
    M: LayoutModel,
    F: ForceLaw + Sync,
{
    /// Validates the configurations and sizes the quadtree to the model's bounds.
    pub fn new(
        model: M,
        law: F,
        barnes_hut: BarnesHutConfig,
        config: LayoutConfig,
        tree_config: ForceTreeConfig,
    ) -> Result<Self, ForceTreeError> {
        barnes_hut.validate()?;
        config.validate()?;
        let (width, height) = model.bounds();
        let tree = QuadTree::new(width, height, tree_config)?;
        Ok(BarnesHutLayout {
            model,
            law,
            barnes_hut,
            config,
            index: Arc::new(SharedIndex::new(tree)),
            iterations: 0,
            converged: false,
            last_max_displacement: 0.0,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the model, e.g. to lock or drag elements between steps.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// The published quadtree, shared with pickers and renderers.
    pub fn index(&self) -> Arc<SharedIndex<QuadTree>> {
        Arc::clone(&self.index)
    }

    /// Largest distance any element moved during the last step.
    pub fn last_max_displacement(&self) -> f64 {
        self.last_max_displacement
    }

    fn compute_moves(&self, positions: &[(ElementId, Point)]) -> Vec<(ElementId, Point, f64)> {
        let movable: Vec<(ElementId, Point)> = positions
            .iter()
            .filter(|(element, _)| !self.model.is_locked(*element))
            .copied()
            .collect();

        let (width, height) = self.model.bounds();
        let area = Rectangle::new(0.0, 0.0, width, height);
        let snapshot = self.index.snapshot();
        let theta = self.barnes_hut.theta;
        let time_step = self.config.time_step;
        let max_displacement = self.config.max_displacement;
        let law = &self.law;

        movable
            .par_iter()
            .map(|&(element, position)| {
                let target = ForceObject::new_member(element, position);
                let force = snapshot.approximate_force(&target, theta, law);
                let next = area.clamp(position + (force * time_step).clamp_length(max_displacement));
                (element, next, next.distance(position))
            })
            .collect()
    }
}

impl<M, F> LayoutAlgorithm for BarnesHutLayout<M, F>
where
    M: LayoutModel,
    F: ForceLaw + Sync,
{
    fn step(&mut self) -> StepOutcome {
        if self.converged {
            return StepOutcome::Converged;
        }

        let positions = self.model.positions();
        self.index.rebuild(&positions);
        let moves = self.compute_moves(&positions);

        let mut max_displacement: f64 = 0.0;
        for (element, position, displacement) in moves {
            self.model.set_position(element, position);
            max_displacement = max_displacement.max(displacement);
        }
        self.last_max_displacement = max_displacement;
        self.iterations += 1;
        trace!("Layout step {}: max displacement {:.4}", self.iterations, max_displacement);

        if max_displacement < self.config.convergence_threshold
            || self.iterations >= self.config.max_iterations
        {
            self.converged = true;
            debug!(
                "Layout converged after {} iterations (max displacement {:.4})",
                self.iterations, max_displacement
            );
            return StepOutcome::Converged;
        }
        StepOutcome::Continue
    }

    fn is_converged(&self) -> bool {
        self.converged
    }

    fn iterations(&self) -> usize {
        self.iterations
    }

    fn reset(&mut self) {
        self.iterations = 0;
        self.converged = false;
        self.last_max_displacement = 0.0;
    }
}
