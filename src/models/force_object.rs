use crate::models::{ElementId, Point};

/// A point mass seen by the Barnes-Hut traversal.
///
/// A `ForceObject` is either a single element (`mass == 1`, `element` set) or the
/// aggregate of a quadtree cell: the mean position of every element below it, with the
/// element count as its mass.
///
/// # Examples
///
/// ```
/// use rs_force_tree::models::{ElementId, ForceObject, Point};
///
/// let a = ForceObject::new_member(ElementId(0), Point::new(0.0, 0.0));
/// let b = ForceObject::new_member(ElementId(1), Point::new(10.0, 0.0));
/// let c = ForceObject::new_member(ElementId(2), Point::new(20.0, 30.0));
///
/// let aggregate = ForceObject::aggregate_of([a, b, c]).unwrap();
/// assert_eq!(aggregate.mass, 3);
/// assert_eq!(aggregate.position, Point::new(10.0, 10.0));
/// assert_eq!(aggregate.element, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceObject {
    pub element: Option<ElementId>,
    pub position: Point,
    pub mass: u32,
}

impl ForceObject {
    /// A single element of unit mass.
    pub fn new_member(element: ElementId, position: Point) -> Self {
        ForceObject { element: Some(element), position, mass: 1 }
    }

    /// An object with no identity, used to sample the force field at an arbitrary point.
    pub fn anonymous(position: Point) -> Self {
        ForceObject { element: None, position, mass: 1 }
    }

    /// Combines point masses into their mass-weighted centroid.
    ///
    /// Returns `None` for an empty input. The result keeps an element id only when it
    /// stands for exactly one element.
    pub fn aggregate_of<I>(objects: I) -> Option<ForceObject>
    where
        I: IntoIterator<Item = ForceObject>,
    {
        let mut mass = 0u32;
        let mut count = 0usize;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut first = None;
        for object in objects {
            let weight = f64::from(object.mass);
            sum_x += object.position.x * weight;
            sum_y += object.position.y * weight;
            mass += object.mass;
            count += 1;
            first.get_or_insert(object);
        }
        if mass == 0 {
            return None;
        }
        if count == 1 && mass == 1 {
            return first;
        }

        let total = f64::from(mass);
        Some(ForceObject {
            element: None,
            position: Point::new(sum_x / total, sum_y / total),
            mass,
        })
    }
}
