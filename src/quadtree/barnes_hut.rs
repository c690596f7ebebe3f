use rayon::prelude::*;

use crate::models::{ElementId, ForceObject, Point, Vector2};
use crate::quadtree::{QuadNode, QuadTree};
use crate::utils::BarnesHutConfig;

/// A pairwise force between a target and a source point mass.
///
/// `force` returns the force acting on `target` due to `mass` units located at `source`.
/// Implementations must stay finite when the two points coincide.
///
/// Any `Fn(Point, Point, u32) -> Vector2` is a force law, so ad hoc laws can be passed
/// as closures:
///
/// ```
/// use rs_force_tree::models::{Point, Vector2};
/// use rs_force_tree::quadtree::ForceLaw;
///
/// let attract = |target: Point, source: Point, mass: u32| (source - target) * f64::from(mass);
/// let f = attract.force(Point::new(0.0, 0.0), Point::new(2.0, 0.0), 3);
/// assert_eq!(f, Vector2::new(6.0, 0.0));
/// ```
pub trait ForceLaw {
    fn force(&self, target: Point, source: Point, mass: u32) -> Vector2;
}

impl<F> ForceLaw for F
where
    F: Fn(Point, Point, u32) -> Vector2,
{
    fn force(&self, target: Point, source: Point, mass: u32) -> Vector2 {
        self(target, source, mass)
    }
}

/// Coulomb-style repulsion: `strength * mass / d²`, pointing away from the source.
///
/// Distances below `min_distance` are raised to it, bounding the magnitude. Exactly
/// coincident points have no direction and exert no force.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseSquareRepulsion {
    pub strength: f64,
    pub min_distance: f64,
}

impl InverseSquareRepulsion {
    pub fn new(strength: f64, min_distance: f64) -> Self {
        debug_assert!(min_distance > 0.0, "min_distance must be positive, got {}", min_distance);
        InverseSquareRepulsion { strength, min_distance }
    }

    /// Takes the minimum distance from a Barnes-Hut configuration.
    pub fn from_config(strength: f64, config: &BarnesHutConfig) -> Self {
        Self::new(strength, config.min_distance)
    }
}

impl ForceLaw for InverseSquareRepulsion {
    fn force(&self, target: Point, source: Point, mass: u32) -> Vector2 {
        let offset = target - source;
        let distance = offset.length();
        if distance == 0.0 {
            return Vector2::ZERO;
        }
        let clamped = distance.max(self.min_distance);
        let magnitude = self.strength * f64::from(mass) / (clamped * clamped);
        offset * (magnitude / distance)
    }
}

/// Walks the tree for `target`, handing every mass the approximation applies to `apply`.
///
/// Leaves contribute their members one by one, minus the target itself. An internal
/// cell is replaced by its aggregate when `s / d < theta`, where `s` is the cell's
/// larger side and `d` the distance from its centroid to the target. A cell whose
/// rectangle covers the target is always opened.
fn visit_sources(
    node: &QuadNode,
    target: &ForceObject,
    theta: f64,
    apply: &mut impl FnMut(&ForceObject),
) {
    let Some(aggregate) = node.aggregate() else {
        return;
    };

    if node.is_leaf() {
        for member in node.members() {
            if target.element.is_some() && member.element == target.element {
                continue;
            }
            apply(member);
        }
        return;
    }

    let bounds = node.bounds();
    let d = aggregate.position.distance(target.position);
    if !bounds.contains(target.position) && bounds.max_side() < theta * d {
        apply(aggregate);
        return;
    }

    for child in node.children().iter().flatten() {
        visit_sources(child, target, theta, apply);
    }
}

impl QuadTree {
    /// Approximates the net force on `target` from every element in the tree.
    ///
    /// `theta` is the opening angle: `0` would open every cell and reproduce the exact
    /// pairwise sum, while the usual `0.5..=1.0` trades a bounded error for
    /// `O(log n)` work per target.
    ///
    /// # Arguments
    ///
    /// * `target` - The body receiving the force. If it carries an element id, that
    ///   element's own entry in the tree is skipped.
    /// * `theta` - Opening angle, strictly positive.
    /// * `law` - The pairwise force law.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_force_tree::models::{ElementId, ForceObject, Point};
    /// use rs_force_tree::quadtree::{InverseSquareRepulsion, QuadTree};
    /// use rs_force_tree::spatial::SpatialIndex;
    /// use rs_force_tree::utils::ForceTreeConfig;
    ///
    /// let mut tree = QuadTree::new(100.0, 100.0, ForceTreeConfig::default()).unwrap();
    /// tree.rebuild(&[
    ///     (ElementId(0), Point::new(40.0, 50.0)),
    ///     (ElementId(1), Point::new(60.0, 50.0)),
    ///     (ElementId(2), Point::new(50.0, 50.0)),
    /// ]);
    ///
    /// // The middle element is pushed equally from both sides.
    /// let target = ForceObject::new_member(ElementId(2), Point::new(50.0, 50.0));
    /// let force = tree.approximate_force(&target, 0.75, &InverseSquareRepulsion::new(100.0, 1.0));
    /// assert!(force.x.abs() < 1e-12);
    /// assert!(force.y.abs() < 1e-12);
    /// ```
    pub fn approximate_force<F: ForceLaw + ?Sized>(
        &self,
        target: &ForceObject,
        theta: f64,
        law: &F,
    ) -> Vector2 {
        debug_assert!(theta > 0.0, "theta must be positive, got {}", theta);
        let mut total = Vector2::ZERO;
        visit_sources(self.root(), target, theta, &mut |source| {
            total += law.force(target.position, source.position, source.mass);
        });
        total
    }

    /// Collects the masses `approximate_force` would apply for `target`.
    ///
    /// Each entry is either a single element or a cell aggregate; their masses sum to the
    /// number of elements other than the target.
    pub fn collect_approx_nodes(&self, target: &ForceObject, theta: f64) -> Vec<ForceObject> {
        let mut worklist = Vec::new();
        visit_sources(self.root(), target, theta, &mut |source| worklist.push(*source));
        worklist
    }

    /// Runs [`approximate_force`](QuadTree::approximate_force) for many targets on the
    /// rayon pool. The result is in the order of `targets`.
    pub fn approximate_forces<F>(&self, targets: &[ForceObject], theta: f64, law: &F) -> Vec<Vector2>
    where
        F: ForceLaw + Sync + ?Sized,
    {
        targets
            .par_iter()
            .map(|target| self.approximate_force(target, theta, law))
            .collect()
    }
}

/// The exact `O(n)` sum of `law` over `sources` acting on `target`, skipping the
/// target's own entry. Reference for measuring the approximation error.
pub fn exact_force<F: ForceLaw + ?Sized>(
    sources: &[(ElementId, Point)],
    target: &ForceObject,
    law: &F,
) -> Vector2 {
    let mut total = Vector2::ZERO;
    for &(element, position) in sources {
        if target.element == Some(element) {
            continue;
        }
        total += law.force(target.position, position, 1);
    }
    total
}
