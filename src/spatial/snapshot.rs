use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;

use crate::models::{ElementId, Point, Rectangle};
use crate::spatial::{LeafQuery, SpatialIndex};

/// Whether a cancellable rebuild made it to publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    Published,
    /// The cancel flag was raised; readers still see the previous snapshot.
    Abandoned,
}

/// A spatial index shared between one rebuilding thread and any number of readers.
///
/// Readers take an [`Arc`] snapshot and query it for as long as they like. A rebuild
/// builds a complete new index off to the side and then replaces the published one with
/// a single pointer swap, so a reader only ever sees a whole index, either the one from
/// before the rebuild or the one after it.
///
/// # Examples
///
/// ```
/// use rs_force_tree::models::{ElementId, Point};
/// use rs_force_tree::quadtree::QuadTree;
/// use rs_force_tree::spatial::{SharedIndex, SpatialIndex};
/// use rs_force_tree::utils::ForceTreeConfig;
///
/// let shared = SharedIndex::new(QuadTree::new(600.0, 600.0, ForceTreeConfig::default()).unwrap());
/// shared.rebuild(&[(ElementId(0), Point::new(10.0, 10.0))]);
///
/// let before = shared.snapshot();
/// shared.rebuild(&[(ElementId(1), Point::new(20.0, 20.0))]);
///
/// // The old snapshot is untouched by the second rebuild.
/// assert_eq!(before.closest_element(0.0, 0.0), Some(ElementId(0)));
/// assert_eq!(shared.closest_element(0.0, 0.0), Some(ElementId(1)));
/// ```
#[derive(Debug)]
pub struct SharedIndex<I> {
    current: RwLock<Arc<I>>,
    generation: AtomicU64,
}

impl<I: SpatialIndex> SharedIndex<I> {
    /// Publishes `index` as the first snapshot.
    pub fn new(index: I) -> Self {
        SharedIndex {
            current: RwLock::new(Arc::new(index)),
            generation: AtomicU64::new(0),
        }
    }

    /// The currently published index.
    pub fn snapshot(&self) -> Arc<I> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Number of snapshots published since construction.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Replaces the published index.
    pub fn publish(&self, index: I) {
        let elements = index.len();
        let next = Arc::new(index);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("Published index snapshot {} ({} elements)", generation, elements);
    }

    /// Builds a fresh index from `points` and publishes it.
    pub fn rebuild(&self, points: &[(ElementId, Point)]) {
        let mut next = self.snapshot().fresh();
        next.rebuild(points);
        self.publish(next);
    }

    /// Like [`rebuild`](SharedIndex::rebuild), but gives up without publishing if
    /// `cancel` is set before the new index is swapped in.
    pub fn rebuild_cancellable(&self, points: &[(ElementId, Point)], cancel: &AtomicBool) -> RebuildOutcome {
        if cancel.load(Ordering::Acquire) {
            debug!("Rebuild cancelled before it started");
            return RebuildOutcome::Abandoned;
        }
        let mut next = self.snapshot().fresh();
        next.rebuild(points);
        if cancel.load(Ordering::Acquire) {
            debug!("Rebuild of {} elements abandoned before publication", next.len());
            return RebuildOutcome::Abandoned;
        }
        self.publish(next);
        RebuildOutcome::Published
    }

    /// Publishes an empty index.
    pub fn clear(&self) {
        let empty = self.snapshot().fresh();
        self.publish(empty);
    }

    pub fn closest_element(&self, x: f64, y: f64) -> Option<ElementId> {
        self.snapshot().closest_element(x, y)
    }

    pub fn containing_leaf(&self, query: LeafQuery) -> Option<Rectangle> {
        self.snapshot().containing_leaf(query)
    }

    pub fn elements_within(&self, area: &Rectangle) -> Vec<ElementId> {
        self.snapshot().elements_within(area)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
