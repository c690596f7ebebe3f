use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{ElementId, Point, Rectangle};

/// What [`SpatialIndex::containing_leaf`] should locate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LeafQuery {
    /// The leaf cell that covers an arbitrary point, populated or not.
    Point(Point),
    /// The leaf cell that stores an indexed element.
    Element(ElementId),
}

impl From<Point> for LeafQuery {
    fn from(point: Point) -> Self {
        LeafQuery::Point(point)
    }
}

impl From<ElementId> for LeafQuery {
    fn from(element: ElementId) -> Self {
        LeafQuery::Element(element)
    }
}

/// A rebuildable index over element positions answering nearest-element and range
/// queries.
///
/// Implementations are chosen statically: code that needs an index is generic over
/// `I: SpatialIndex`. Every implementation must agree on the answer of
/// [`closest_element`](SpatialIndex::closest_element), including its tie-break: the
/// smaller squared distance wins. Of two elements at exactly the same distance, the one
/// with the smaller `x` wins, then the smaller `y`, then the smaller [`ElementId`].
///
/// # Examples
///
/// ```
/// use rs_force_tree::models::{ElementId, Point};
/// use rs_force_tree::quadtree::QuadTree;
/// use rs_force_tree::spatial::{RadiusScan, SpatialIndex};
/// use rs_force_tree::utils::ForceTreeConfig;
///
/// fn pick<I: SpatialIndex>(index: &mut I) -> Option<ElementId> {
///     index.rebuild(&[
///         (ElementId(0), Point::new(200.0, 100.0)),
///         (ElementId(1), Point::new(100.0, 200.0)),
///         (ElementId(2), Point::new(100.0, 100.0)),
///     ]);
///     index.closest_element(150.0, 150.0)
/// }
///
/// let mut tree = QuadTree::new(600.0, 600.0, ForceTreeConfig::default()).unwrap();
/// let mut scan = RadiusScan::new();
/// assert_eq!(pick(&mut tree), Some(ElementId(2)));
/// assert_eq!(pick(&mut scan), Some(ElementId(2)));
/// ```
pub trait SpatialIndex: Send + Sync {
    /// Discards the current contents and indexes `points` from scratch.
    ///
    /// If an element id occurs more than once, its last occurrence wins.
    fn rebuild(&mut self, points: &[(ElementId, Point)]);

    /// Empties the index.
    fn clear(&mut self);

    /// The indexed element nearest to `(x, y)`, or `None` if the index is empty.
    ///
    /// The query point does not have to lie inside the indexed area.
    fn closest_element(&self, x: f64, y: f64) -> Option<ElementId>;

    /// The cell that holds an element or covers a point.
    ///
    /// Returns `None` for an unknown element or a point outside the indexed area.
    fn containing_leaf(&self, query: LeafQuery) -> Option<Rectangle>;

    /// Every indexed element whose position lies inside `area`, ordered by id.
    fn elements_within(&self, area: &Rectangle) -> Vec<ElementId>;

    /// Number of indexed elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An empty index with the same configuration as `self`.
    fn fresh(&self) -> Self
    where
        Self: Sized;
}

/// One answer to a nearest-element search, ranked by [`Candidate::rank`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) distance: f64,
    pub(crate) position: Point,
    pub(crate) element: ElementId,
}

impl Candidate {
    #[inline]
    pub(crate) fn new(element: ElementId, position: Point, query: Point) -> Self {
        Candidate { distance: position.distance_squared(query), position, element }
    }

    /// Squared distance, then `x`, then `y`, then id.
    #[inline]
    pub(crate) fn rank(&self, other: &Candidate) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.position.x.total_cmp(&other.position.x))
            .then_with(|| self.position.y.total_cmp(&other.position.y))
            .then_with(|| self.element.cmp(&other.element))
    }
}

/// Strict "is `candidate` a better answer than `best`" for nearest-element searches.
#[inline]
pub(crate) fn is_closer(candidate: &Candidate, best: Option<&Candidate>) -> bool {
    best.map_or(true, |best| candidate.rank(best) == Ordering::Less)
}

/// Keeps the last position of every element id, in first-seen order.
///
/// Returns the surviving entries and the number of overwritten duplicates.
pub(crate) fn dedup_last_wins(points: &[(ElementId, Point)]) -> (Vec<(ElementId, Point)>, usize) {
    let mut slot_of = HashMap::with_capacity(points.len());
    let mut unique: Vec<(ElementId, Point)> = Vec::with_capacity(points.len());
    let mut duplicates = 0;
    for &(element, position) in points {
        match slot_of.get(&element) {
            Some(&slot) => {
                unique[slot] = (element, position);
                duplicates += 1;
            }
            None => {
                slot_of.insert(element, unique.len());
                unique.push((element, position));
            }
        }
    }
    (unique, duplicates)
}
