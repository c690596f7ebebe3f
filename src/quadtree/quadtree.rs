use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::models::{ElementId, ForceObject, Point, Quadrant, Rectangle};
use crate::spatial::{dedup_last_wins, is_closer, Candidate, LeafQuery, SpatialIndex};
use crate::utils::{ForceTreeConfig, ForceTreeError, OutOfBoundsPolicy};

/// One cell of a [`QuadTree`].
///
/// A node is a leaf while all four children are `None`. A leaf holds a bucket of members
/// that is either empty, a single element, a group of elements sharing one exact
/// position, or (at the depth cap) whatever ended up there. Internal nodes hold no
/// members of their own; their four children are allocated together when the node
/// splits.
///
/// `aggregate` is the mass-weighted centroid of everything at or below the node and is
/// `None` exactly when the subtree is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadNode {
    bounds: Rectangle,
    depth: u32,
    children: [Option<Box<QuadNode>>; 4],
    members: Vec<ForceObject>,
    aggregate: Option<ForceObject>,
}

impl QuadNode {
    fn new(bounds: Rectangle, depth: u32) -> Self {
        QuadNode {
            bounds,
            depth,
            children: [None, None, None, None],
            members: Vec::new(),
            aggregate: None,
        }
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn children(&self) -> &[Option<Box<QuadNode>>; 4] {
        &self.children
    }

    pub fn child(&self, quadrant: Quadrant) -> Option<&QuadNode> {
        self.children[quadrant.index()].as_deref()
    }

    /// The elements stored directly in this node. Always empty for internal nodes.
    pub fn members(&self) -> &[ForceObject] {
        &self.members
    }

    pub fn aggregate(&self) -> Option<&ForceObject> {
        self.aggregate.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub fn is_empty(&self) -> bool {
        self.aggregate.is_none()
    }

    fn insert(&mut self, member: ForceObject, max_depth: u32) {
        if self.is_leaf() {
            let coincident = self
                .members
                .first()
                .map_or(true, |existing| existing.position == member.position);
            if coincident {
                self.members.push(member);
            } else if self.depth >= max_depth {
                trace!(
                    "Bucketing {:?} at depth cap {} in {:?}",
                    member.element, self.depth, self.bounds
                );
                self.members.push(member);
            } else {
                self.split();
                self.route(member, max_depth);
            }
        } else {
            self.route(member, max_depth);
        }
        self.update_aggregate();
    }

    /// Turns a leaf into an internal node and re-homes its members.
    fn split(&mut self) {
        let depth = self.depth + 1;
        let cells = self.bounds.split();
        self.children = cells.map(|cell| Some(Box::new(QuadNode::new(cell, depth))));

        let existing = std::mem::take(&mut self.members);
        for member in existing {
            let quadrant = self.bounds.quadrant_of(member.position);
            if let Some(child) = self.children[quadrant.index()].as_mut() {
                child.members.push(member);
            }
        }
        for child in self.children.iter_mut().flatten() {
            child.update_aggregate();
        }
    }

    fn route(&mut self, member: ForceObject, max_depth: u32) {
        let quadrant = self.bounds.quadrant_of(member.position);
        if let Some(child) = self.children[quadrant.index()].as_mut() {
            child.insert(member, max_depth);
        }
    }

    fn update_aggregate(&mut self) {
        self.aggregate = if self.is_leaf() {
            ForceObject::aggregate_of(self.members.iter().copied())
        } else {
            ForceObject::aggregate_of(
                self.children
                    .iter()
                    .flatten()
                    .filter_map(|child| child.aggregate),
            )
        };
    }

    fn leaf_at(&self, point: Point) -> &QuadNode {
        let mut node = self;
        while let Some(child) = node.children[node.bounds.quadrant_of(point).index()].as_deref() {
            node = child;
        }
        node
    }

    fn nearest(&self, query: Point, best: &mut Option<Candidate>) {
        if self.is_leaf() {
            for member in &self.members {
                if let Some(element) = member.element {
                    let candidate = Candidate::new(element, member.position, query);
                    if is_closer(&candidate, best.as_ref()) {
                        *best = Some(candidate);
                    }
                }
            }
            return;
        }

        // Nearest cells first; the cell covering the query sorts to the front at distance 0.
        let mut order: Vec<(f64, &QuadNode)> = self
            .children
            .iter()
            .flatten()
            .filter(|child| !child.is_empty())
            .map(|child| (child.bounds.distance_squared_to(query), child.as_ref()))
            .collect();
        order.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Equal lower bounds are still visited: a tied element there may rank first.
        for (lower_bound, child) in order {
            if let Some(found) = best {
                if lower_bound > found.distance {
                    break;
                }
            }
            child.nearest(query, best);
        }
    }

    fn collect_within(&self, area: &Rectangle, found: &mut Vec<ElementId>) {
        if self.is_empty() || !self.bounds.intersects(area) {
            return;
        }
        found.extend(
            self.members
                .iter()
                .filter(|member| area.contains(member.position))
                .filter_map(|member| member.element),
        );
        for child in self.children.iter().flatten() {
            child.collect_within(area, found);
        }
    }

    fn visit<'a>(&'a self, visitor: &mut impl FnMut(&'a QuadNode)) {
        visitor(self);
        for child in self.children.iter().flatten() {
            child.visit(visitor);
        }
    }
}

/// A point-region quadtree over element positions.
///
/// The tree covers the fixed rectangle `(0, 0, width, height)`. Each leaf holds at most
/// one distinct position: inserting a second one splits the leaf into four equal
/// quadrants. Elements sharing an exact position share a leaf, and below
/// [`ForceTreeConfig::max_depth`] leaves stop splitting and simply collect points.
///
/// Every node keeps the weighted centroid of its subtree, which is what the Barnes-Hut
/// traversal in this module approximates distant cells with.
///
/// # Examples
///
/// ```
/// use rs_force_tree::models::{ElementId, Point, Quadrant};
/// use rs_force_tree::quadtree::QuadTree;
/// use rs_force_tree::spatial::SpatialIndex;
/// use rs_force_tree::utils::ForceTreeConfig;
///
/// let mut tree = QuadTree::new(600.0, 600.0, ForceTreeConfig::default()).unwrap();
/// tree.insert(ElementId(0), Point::new(100.0, 100.0));
/// tree.insert(ElementId(1), Point::new(500.0, 400.0));
///
/// let root = tree.root();
/// assert!(!root.is_leaf());
/// assert_eq!(root.aggregate().unwrap().mass, 2);
/// assert_eq!(root.aggregate().unwrap().position, Point::new(300.0, 250.0));
/// assert!(!root.child(Quadrant::NorthWest).unwrap().is_empty());
/// assert!(!root.child(Quadrant::SouthEast).unwrap().is_empty());
///
/// assert_eq!(tree.closest_element(450.0, 450.0), Some(ElementId(1)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuadTree {
    root: QuadNode,
    config: ForceTreeConfig,
    positions: HashMap<ElementId, Point>,
}

impl QuadTree {
    /// Creates an empty tree covering `(0, 0, width, height)`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBounds` unless both dimensions are positive and finite, and the
    /// configuration's own validation errors.
    pub fn new(width: f64, height: f64, config: ForceTreeConfig) -> Result<Self, ForceTreeError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(ForceTreeError::InvalidBounds { width, height });
        }
        let bounds = Rectangle::try_new(0.0, 0.0, width, height)?;
        config.validate()?;
        Ok(QuadTree {
            root: QuadNode::new(bounds, 0),
            config,
            positions: HashMap::new(),
        })
    }

    pub fn bounds(&self) -> Rectangle {
        self.root.bounds
    }

    pub fn config(&self) -> &ForceTreeConfig {
        &self.config
    }

    pub fn root(&self) -> &QuadNode {
        &self.root
    }

    /// Adds one element of unit mass.
    ///
    /// Positions outside the root are handled by the configured [`OutOfBoundsPolicy`].
    /// Returns `false` if the element was not inserted: it was rejected, its position is
    /// not finite, or it is already in the tree. Moving an element requires a
    /// [`rebuild`](SpatialIndex::rebuild).
    pub fn insert(&mut self, element: ElementId, position: Point) -> bool {
        if !position.is_finite() {
            warn!("Ignoring element {} with non-finite position {:?}", element, position);
            return false;
        }
        if self.positions.contains_key(&element) {
            warn!("Element {} is already indexed; rebuild to move it", element);
            return false;
        }

        let bounds = self.root.bounds;
        let position = if bounds.contains(position) {
            position
        } else {
            match self.config.out_of_bounds {
                OutOfBoundsPolicy::Clamp => {
                    let clamped = bounds.clamp(position);
                    warn!("Clamping element {} from {:?} to {:?}", element, position, clamped);
                    clamped
                }
                OutOfBoundsPolicy::Reject => {
                    warn!("Rejecting element {} outside {:?} at {:?}", element, bounds, position);
                    return false;
                }
            }
        };

        self.root
            .insert(ForceObject::new_member(element, position), self.config.max_depth);
        self.positions.insert(element, position);
        true
    }

    /// The position the tree stored for `element`, after any clamping.
    pub fn position_of(&self, element: ElementId) -> Option<Point> {
        self.positions.get(&element).copied()
    }

    /// Rectangles of every leaf, empty ones included, for drawing the subdivision.
    pub fn cells(&self) -> Vec<Rectangle> {
        let mut cells = Vec::new();
        self.root.visit(&mut |node| {
            if node.is_leaf() {
                cells.push(node.bounds);
            }
        });
        cells
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.root.visit(&mut |_| count += 1);
        count
    }

    /// Depth of the deepest node; the root is at depth 0.
    pub fn max_depth_reached(&self) -> u32 {
        let mut deepest = 0;
        self.root.visit(&mut |node| deepest = deepest.max(node.depth));
        deepest
    }
}

impl SpatialIndex for QuadTree {
    fn rebuild(&mut self, points: &[(ElementId, Point)]) {
        self.clear();
        let (unique, duplicates) = dedup_last_wins(points);
        if duplicates > 0 {
            warn!("Rebuild received {} duplicate element ids; keeping the last of each", duplicates);
        }
        for (element, position) in unique {
            self.insert(element, position);
        }
        debug!(
            "Rebuilt quadtree: {} elements, {} nodes, depth {}",
            self.positions.len(),
            self.node_count(),
            self.max_depth_reached()
        );
    }

    fn clear(&mut self) {
        self.root = QuadNode::new(self.root.bounds, 0);
        self.positions.clear();
    }

    fn closest_element(&self, x: f64, y: f64) -> Option<ElementId> {
        let mut best = None;
        self.root.nearest(Point::new(x, y), &mut best);
        best.map(|found| found.element)
    }

    fn containing_leaf(&self, query: LeafQuery) -> Option<Rectangle> {
        let point = match query {
            LeafQuery::Point(point) => {
                if !self.root.bounds.contains(point) {
                    return None;
                }
                point
            }
            LeafQuery::Element(element) => self.position_of(element)?,
        };
        Some(self.root.leaf_at(point).bounds)
    }

    fn elements_within(&self, area: &Rectangle) -> Vec<ElementId> {
        let mut found = Vec::new();
        self.root.collect_within(area, &mut found);
        found.sort_unstable();
        found
    }

    fn len(&self) -> usize {
        self.positions.len()
    }

    fn fresh(&self) -> Self {
        QuadTree {
            root: QuadNode::new(self.root.bounds, 0),
            config: self.config,
            positions: HashMap::new(),
        }
    }
}
