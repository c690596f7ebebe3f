use log::warn;
use rand::Rng;

use crate::models::{ElementId, Point, Rectangle};
use crate::utils::ForceTreeError;

/// The layout state a force-directed loop reads and writes.
///
/// Locks only affect integration: locked elements are still indexed and still push
/// their neighbours, but the loop never moves them.
pub trait LayoutModel {
    /// Current position of every element.
    fn positions(&self) -> Vec<(ElementId, Point)>;

    /// Declared `(width, height)` of the layout area.
    fn bounds(&self) -> (f64, f64);

    fn is_locked(&self, element: ElementId) -> bool;

    fn set_position(&mut self, element: ElementId, position: Point);
}

/// An in-memory [`LayoutModel`] whose element ids are dense indices.
///
/// # Examples
///
/// ```
/// use rs_force_tree::layout::{GraphLayout, LayoutModel};
/// use rs_force_tree::models::Point;
///
/// let mut layout = GraphLayout::new(600.0, 400.0).unwrap();
/// let a = layout.add_element(Point::new(10.0, 10.0));
/// let b = layout.add_element(Point::new(20.0, 20.0));
///
/// layout.lock(b).unwrap();
/// assert!(!layout.is_locked(a));
/// assert!(layout.is_locked(b));
///
/// layout.set_global_lock(true);
/// assert!(layout.is_locked(a));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GraphLayout {
    width: f64,
    height: f64,
    positions: Vec<Point>,
    locked: Vec<bool>,
    global_lock: bool,
}

impl GraphLayout {
    pub fn new(width: f64, height: f64) -> Result<Self, ForceTreeError> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(ForceTreeError::InvalidBounds { width, height });
        }
        Ok(GraphLayout {
            width,
            height,
            positions: Vec::new(),
            locked: Vec::new(),
            global_lock: false,
        })
    }

    /// A layout of `count` elements placed uniformly at random inside the bounds.
    pub fn with_random_positions<R: Rng>(
        count: usize,
        width: f64,
        height: f64,
        rng: &mut R,
    ) -> Result<Self, ForceTreeError> {
        let mut layout = Self::new(width, height)?;
        for _ in 0..count {
            let position = Point::new(rng.random_range(0.0..width), rng.random_range(0.0..height));
            layout.add_element(position);
        }
        Ok(layout)
    }

    pub fn area(&self) -> Rectangle {
        Rectangle::new(0.0, 0.0, self.width, self.height)
    }

    pub fn add_element(&mut self, position: Point) -> ElementId {
        let id = ElementId(self.positions.len());
        self.positions.push(position);
        self.locked.push(false);
        id
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, element: ElementId) -> Option<Point> {
        self.positions.get(element.index()).copied()
    }

    /// Moves an element, failing for ids this layout never handed out.
    pub fn try_set_position(&mut self, element: ElementId, position: Point) -> Result<(), ForceTreeError> {
        let slot = self
            .positions
            .get_mut(element.index())
            .ok_or(ForceTreeError::UnknownElement(element))?;
        *slot = position;
        Ok(())
    }

    pub fn lock(&mut self, element: ElementId) -> Result<(), ForceTreeError> {
        self.set_locked(element, true)
    }

    pub fn unlock(&mut self, element: ElementId) -> Result<(), ForceTreeError> {
        self.set_locked(element, false)
    }

    fn set_locked(&mut self, element: ElementId, locked: bool) -> Result<(), ForceTreeError> {
        let slot = self
            .locked
            .get_mut(element.index())
            .ok_or(ForceTreeError::UnknownElement(element))?;
        *slot = locked;
        Ok(())
    }

    /// Freezes or releases every element at once, independent of per-element locks.
    pub fn set_global_lock(&mut self, locked: bool) {
        self.global_lock = locked;
    }

    pub fn is_globally_locked(&self) -> bool {
        self.global_lock
    }
}

impl LayoutModel for GraphLayout {
    fn positions(&self) -> Vec<(ElementId, Point)> {
        self.positions
            .iter()
            .enumerate()
            .map(|(index, position)| (ElementId(index), *position))
            .collect()
    }

    fn bounds(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn is_locked(&self, element: ElementId) -> bool {
        self.global_lock || self.locked.get(element.index()).copied().unwrap_or(false)
    }

    fn set_position(&mut self, element: ElementId, position: Point) {
        if let Err(err) = self.try_set_position(element, position) {
            warn!("{}", err);
        }
    }
}
