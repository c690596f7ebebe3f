use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use log::{debug, warn};

use crate::models::{ElementId, Point, Rectangle};
use crate::spatial::{dedup_last_wins, is_closer, Candidate, LeafQuery, SpatialIndex};
use crate::utils::{ForceTreeConfig, ForceTreeError};

#[derive(Debug, Clone, PartialEq)]
struct RNode {
    bbox: Rectangle,
    leaf: bool,
    children: Vec<RChild>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RChild {
    Node(usize),
    Item(ElementId, Point),
}

/// Heap entry for best-first search, ordered so that `BinaryHeap` pops the nearest first.
#[derive(Debug, Clone, Copy)]
struct Pending {
    distance: f64,
    node: usize,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// A bulk-loaded R-tree over element positions.
///
/// Every rebuild packs the points bottom-up with Sort-Tile-Recursive: sort by x, cut
/// into vertical slices, sort each slice by y, and group runs of
/// [`ForceTreeConfig::rtree_max_children`] into nodes; repeat on the node rectangles
/// until one root remains. Sibling rectangles may overlap, unlike quadtree cells.
///
/// Nodes live in a flat arena and refer to their children by index.
///
/// # Examples
///
/// ```
/// use rs_force_tree::models::{ElementId, Point};
/// use rs_force_tree::rtree::RTree;
/// use rs_force_tree::spatial::{LeafQuery, SpatialIndex};
/// use rs_force_tree::utils::ForceTreeConfig;
///
/// let mut tree = RTree::new(ForceTreeConfig::default()).unwrap();
/// let points: Vec<_> = (0..100)
///     .map(|i| (ElementId(i), Point::new((i % 10) as f64 * 10.0, (i / 10) as f64 * 10.0)))
///     .collect();
/// tree.rebuild(&points);
///
/// assert_eq!(tree.len(), 100);
/// assert_eq!(tree.closest_element(31.0, 42.0), Some(ElementId(43)));
///
/// let leaf = tree.containing_leaf(LeafQuery::Element(ElementId(43))).unwrap();
/// assert!(leaf.contains(Point::new(30.0, 40.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RTree {
    config: ForceTreeConfig,
    arena: Vec<RNode>,
    root: Option<usize>,
    leaf_of: HashMap<ElementId, usize>,
}

impl RTree {
    pub fn new(config: ForceTreeConfig) -> Result<Self, ForceTreeError> {
        config.validate()?;
        Ok(RTree {
            config,
            arena: Vec::new(),
            root: None,
            leaf_of: HashMap::new(),
        })
    }

    pub fn config(&self) -> &ForceTreeConfig {
        &self.config
    }

    /// Bounding rectangle of everything indexed.
    pub fn bounds(&self) -> Option<Rectangle> {
        self.root.map(|root| self.arena[root].bbox)
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Number of levels; `0` when empty, `1` when the root is a leaf.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(index) = current {
            height += 1;
            current = self.arena[index].children.iter().find_map(|child| match child {
                RChild::Node(next) => Some(*next),
                RChild::Item(..) => None,
            });
        }
        height
    }

    /// Rectangles of every leaf node.
    pub fn leaf_bounds(&self) -> Vec<Rectangle> {
        self.arena.iter().filter(|node| node.leaf).map(|node| node.bbox).collect()
    }

    fn child_bbox(&self, child: &RChild) -> Rectangle {
        match child {
            RChild::Node(index) => self.arena[*index].bbox,
            RChild::Item(_, position) => Rectangle::at_point(*position),
        }
    }

    /// Packs one level of entries into parent nodes and returns the parents as entries
    /// of the next level.
    fn pack_level(&mut self, mut entries: Vec<(Rectangle, RChild)>, leaf: bool) -> Vec<(Rectangle, RChild)> {
        let max_children = self.config.rtree_max_children;
        let node_count = entries.len().div_ceil(max_children);
        let mut slices = 1;
        while slices * slices < node_count {
            slices += 1;
        }
        let slice_len = max_children * node_count.div_ceil(slices);

        entries.sort_by(|a, b| a.0.center().x.total_cmp(&b.0.center().x));
        let mut parents = Vec::with_capacity(node_count);
        for slice in entries.chunks_mut(slice_len) {
            slice.sort_by(|a, b| a.0.center().y.total_cmp(&b.0.center().y));
            for group in slice.chunks(max_children) {
                let bbox = group
                    .iter()
                    .skip(1)
                    .fold(group[0].0, |acc, (rect, _)| acc.union(rect));
                let index = self.arena.len();
                let children: Vec<RChild> = group.iter().map(|(_, child)| *child).collect();
                if leaf {
                    for child in &children {
                        if let RChild::Item(element, _) = child {
                            self.leaf_of.insert(*element, index);
                        }
                    }
                }
                self.arena.push(RNode { bbox, leaf, children });
                parents.push((bbox, RChild::Node(index)));
            }
        }
        parents
    }

    fn leaf_covering(&self, node: usize, point: Point) -> Option<usize> {
        let current = &self.arena[node];
        if !current.bbox.contains(point) {
            return None;
        }
        if current.leaf {
            return Some(node);
        }
        current.children.iter().find_map(|child| match child {
            RChild::Node(index) => self.leaf_covering(*index, point),
            RChild::Item(..) => None,
        })
    }

    fn collect_within(&self, node: usize, area: &Rectangle, found: &mut Vec<ElementId>) {
        let current = &self.arena[node];
        if !current.bbox.intersects(area) {
            return;
        }
        for child in &current.children {
            match child {
                RChild::Node(index) => self.collect_within(*index, area, found),
                RChild::Item(element, position) => {
                    if area.contains(*position) {
                        found.push(*element);
                    }
                }
            }
        }
    }
}

impl SpatialIndex for RTree {
    fn rebuild(&mut self, points: &[(ElementId, Point)]) {
        self.clear();
        let (unique, duplicates) = dedup_last_wins(points);
        if duplicates > 0 {
            warn!("Rebuild received {} duplicate element ids; keeping the last of each", duplicates);
        }

        let items: Vec<(Rectangle, RChild)> = unique
            .into_iter()
            .filter(|(element, position)| {
                let finite = position.is_finite();
                if !finite {
                    warn!("Ignoring element {} with non-finite position {:?}", element, position);
                }
                finite
            })
            .map(|(element, position)| (Rectangle::at_point(position), RChild::Item(element, position)))
            .collect();
        if items.is_empty() {
            return;
        }

        let mut level = self.pack_level(items, true);
        while level.len() > 1 {
            if level.len() <= self.config.rtree_max_children {
                let bbox = level.iter().skip(1).fold(level[0].0, |acc, (rect, _)| acc.union(rect));
                let children = level.iter().map(|(_, child)| *child).collect();
                self.arena.push(RNode { bbox, leaf: false, children });
                level = vec![(bbox, RChild::Node(self.arena.len() - 1))];
            } else {
                level = self.pack_level(level, false);
            }
        }
        self.root = level.first().and_then(|(_, child)| match child {
            RChild::Node(index) => Some(*index),
            RChild::Item(..) => None,
        });

        debug!(
            "Rebuilt R-tree: {} elements, {} nodes, height {}",
            self.leaf_of.len(),
            self.arena.len(),
            self.height()
        );
    }

    fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.leaf_of.clear();
    }

    fn closest_element(&self, x: f64, y: f64) -> Option<ElementId> {
        let root = self.root?;
        let query = Point::new(x, y);
        let mut best: Option<Candidate> = None;
        let mut heap = BinaryHeap::new();
        heap.push(Pending { distance: self.arena[root].bbox.distance_squared_to(query), node: root });

        while let Some(Pending { distance, node }) = heap.pop() {
            if let Some(found) = best {
                if distance > found.distance {
                    break;
                }
            }
            for child in &self.arena[node].children {
                match child {
                    RChild::Item(element, position) => {
                        let candidate = Candidate::new(*element, *position, query);
                        if is_closer(&candidate, best.as_ref()) {
                            best = Some(candidate);
                        }
                    }
                    RChild::Node(index) => {
                        let lower_bound = self.child_bbox(child).distance_squared_to(query);
                        // Ties with the best distance stay in play for the position tie-break.
                        let worth_visiting = best.map_or(true, |found| lower_bound <= found.distance);
                        if worth_visiting {
                            heap.push(Pending { distance: lower_bound, node: *index });
                        }
                    }
                }
            }
        }
        best.map(|found| found.element)
    }

    fn containing_leaf(&self, query: LeafQuery) -> Option<Rectangle> {
        let leaf = match query {
            LeafQuery::Element(element) => *self.leaf_of.get(&element)?,
            LeafQuery::Point(point) => self.leaf_covering(self.root?, point)?,
        };
        Some(self.arena[leaf].bbox)
    }

    fn elements_within(&self, area: &Rectangle) -> Vec<ElementId> {
        let mut found = Vec::new();
        if let Some(root) = self.root {
            self.collect_within(root, area, &mut found);
        }
        found.sort_unstable();
        found
    }

    fn len(&self) -> usize {
        self.leaf_of.len()
    }

    fn fresh(&self) -> Self {
        RTree {
            config: self.config,
            arena: Vec::new(),
            root: None,
            leaf_of: HashMap::new(),
        }
    }
}
