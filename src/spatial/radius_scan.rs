use log::warn;

use crate::models::{ElementId, Point, Rectangle};
use crate::spatial::{dedup_last_wins, is_closer, Candidate, LeafQuery, SpatialIndex};

/// Brute-force index: every query checks every element.
///
/// `RadiusScan` is the reference the tree-based indexes are verified against, and it is
/// perfectly usable on its own for small layouts. With a `max_radius`, elements farther
/// than that from the query point are ignored, which is how pointer picking limits
/// itself to elements near the cursor.
///
/// Since it has no cells, each element is reported as its own zero-sized leaf.
///
/// # Examples
///
/// ```
/// use rs_force_tree::models::{ElementId, Point};
/// use rs_force_tree::spatial::{RadiusScan, SpatialIndex};
///
/// let mut scan = RadiusScan::with_max_radius(10.0);
/// scan.rebuild(&[(ElementId(0), Point::new(0.0, 0.0)), (ElementId(1), Point::new(50.0, 0.0))]);
///
/// assert_eq!(scan.closest_element(45.0, 0.0), Some(ElementId(1)));
/// assert_eq!(scan.closest_element(25.0, 0.0), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadiusScan {
    points: Vec<(ElementId, Point)>,
    max_radius: Option<f64>,
}

impl RadiusScan {
    /// An unbounded scan.
    pub fn new() -> Self {
        Self::default()
    }

    /// A scan that ignores elements farther than `max_radius` from the query.
    pub fn with_max_radius(max_radius: f64) -> Self {
        RadiusScan { points: Vec::new(), max_radius: Some(max_radius) }
    }

    pub fn max_radius(&self) -> Option<f64> {
        self.max_radius
    }

    /// The element nearest to `(x, y)` within `radius`, regardless of `max_radius`.
    pub fn closest_within(&self, x: f64, y: f64, radius: f64) -> Option<ElementId> {
        let query = Point::new(x, y);
        let limit = radius * radius;
        let mut best: Option<Candidate> = None;
        for &(element, position) in &self.points {
            let candidate = Candidate::new(element, position, query);
            if candidate.distance <= limit && is_closer(&candidate, best.as_ref()) {
                best = Some(candidate);
            }
        }
        best.map(|found| found.element)
    }

    pub fn points(&self) -> &[(ElementId, Point)] {
        &self.points
    }
}

impl SpatialIndex for RadiusScan {
    fn rebuild(&mut self, points: &[(ElementId, Point)]) {
        let (unique, duplicates) = dedup_last_wins(points);
        if duplicates > 0 {
            warn!("Rebuild received {} duplicate element ids; keeping the last of each", duplicates);
        }
        self.points = unique
            .into_iter()
            .filter(|(element, position)| {
                let finite = position.is_finite();
                if !finite {
                    warn!("Ignoring element {} with non-finite position {:?}", element, position);
                }
                finite
            })
            .collect();
    }

    fn clear(&mut self) {
        self.points.clear();
    }

    fn closest_element(&self, x: f64, y: f64) -> Option<ElementId> {
        self.closest_within(x, y, self.max_radius.unwrap_or(f64::INFINITY))
    }

    fn containing_leaf(&self, query: LeafQuery) -> Option<Rectangle> {
        let position = match query {
            LeafQuery::Element(element) => {
                self.points.iter().find(|(id, _)| *id == element).map(|&(_, p)| p)
            }
            LeafQuery::Point(point) => {
                self.points.iter().find(|(_, p)| *p == point).map(|&(_, p)| p)
            }
        };
        position.map(Rectangle::at_point)
    }

    fn elements_within(&self, area: &Rectangle) -> Vec<ElementId> {
        let mut found: Vec<ElementId> = self
            .points
            .iter()
            .filter(|(_, position)| area.contains(*position))
            .map(|&(element, _)| element)
            .collect();
        found.sort_unstable();
        found
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn fresh(&self) -> Self {
        RadiusScan { points: Vec::new(), max_radius: self.max_radius }
    }
}
