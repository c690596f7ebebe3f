use crate::models::Point;
use crate::utils::ForceTreeError;

/// One of the four cells produced by [`Rectangle::split`].
///
/// Layout space has `y` growing downward, so the northern cells are the ones with the
/// smaller `y` coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// An axis-aligned rectangle given by its top-left corner and its size.
///
/// `contains` and `intersects` are closed on every edge. The four cells produced by
/// [`Rectangle::split`] therefore share their edges, and [`Rectangle::quadrant_of`] is
/// what decides which cell owns a point lying on a split line: the eastern or southern
/// one.
///
/// # Examples
///
/// ```
/// use rs_force_tree::models::{Point, Quadrant, Rectangle};
///
/// let bounds = Rectangle::new(0.0, 0.0, 600.0, 600.0);
/// let [nw, ne, sw, se] = bounds.split();
///
/// assert_eq!(nw, Rectangle::new(0.0, 0.0, 300.0, 300.0));
/// assert_eq!(se, Rectangle::new(300.0, 300.0, 300.0, 300.0));
/// assert!(ne.contains(Point::new(450.0, 10.0)));
/// assert!(sw.contains(Point::new(10.0, 450.0)));
///
/// // The split point itself is owned by the south-east cell.
/// assert_eq!(bounds.quadrant_of(Point::new(300.0, 300.0)), Quadrant::SouthEast);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    /// Creates a rectangle. Negative dimensions are a programming error.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        debug_assert!(width >= 0.0 && height >= 0.0, "negative rectangle size {} x {}", width, height);
        Rectangle { x, y, width, height }
    }

    /// Creates a rectangle, rejecting negative or non-finite dimensions.
    pub fn try_new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, ForceTreeError> {
        let valid = width >= 0.0 && height >= 0.0 && width.is_finite() && height.is_finite();
        if !valid || !x.is_finite() || !y.is_finite() {
            return Err(ForceTreeError::InvalidBounds { width, height });
        }
        Ok(Rectangle { x, y, width, height })
    }

    /// A zero-sized rectangle located at `p`.
    pub fn at_point(p: Point) -> Self {
        Rectangle { x: p.x, y: p.y, width: 0.0, height: 0.0 }
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// The larger of width and height, used as the cell size in the opening-angle test.
    #[inline]
    pub fn max_side(&self) -> f64 {
        self.width.max(self.height)
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.max_x() && p.y >= self.y && p.y <= self.max_y()
    }

    #[inline]
    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.x <= other.max_x()
            && other.x <= self.max_x()
            && self.y <= other.max_y()
            && other.y <= self.max_y()
    }

    /// Splits the rectangle at its centre into `[NW, NE, SW, SE]`, indexed by
    /// [`Quadrant::index`].
    pub fn split(&self) -> [Rectangle; 4] {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        let mid_x = self.x + half_w;
        let mid_y = self.y + half_h;
        [
            Rectangle { x: self.x, y: self.y, width: half_w, height: half_h },
            Rectangle { x: mid_x, y: self.y, width: self.width - half_w, height: half_h },
            Rectangle { x: self.x, y: mid_y, width: half_w, height: self.height - half_h },
            Rectangle { x: mid_x, y: mid_y, width: self.width - half_w, height: self.height - half_h },
        ]
    }

    /// The quadrant that owns `p`. Points west of or above the centre line go to the
    /// western or northern cells; points on a centre line go east or south.
    #[inline]
    pub fn quadrant_of(&self, p: Point) -> Quadrant {
        let center = self.center();
        match (p.x < center.x, p.y < center.y) {
            (true, true) => Quadrant::NorthWest,
            (false, true) => Quadrant::NorthEast,
            (true, false) => Quadrant::SouthWest,
            (false, false) => Quadrant::SouthEast,
        }
    }

    /// Squared distance from `p` to the nearest point of the rectangle; `0.0` inside.
    ///
    /// This is the lower bound used to prune subtrees during nearest-element search.
    #[inline]
    pub fn distance_squared_to(&self, p: Point) -> f64 {
        let dx = if p.x < self.x {
            self.x - p.x
        } else if p.x > self.max_x() {
            p.x - self.max_x()
        } else {
            0.0
        };
        let dy = if p.y < self.y {
            self.y - p.y
        } else if p.y > self.max_y() {
            p.y - self.max_y()
        } else {
            0.0
        };
        dx * dx + dy * dy
    }

    /// The nearest point of the rectangle to `p`.
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(p.x.clamp(self.x, self.max_x()), p.y.clamp(self.y, self.max_y()))
    }

    /// The smallest rectangle covering both.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rectangle {
            x,
            y,
            width: self.max_x().max(other.max_x()) - x,
            height: self.max_y().max(other.max_y()) - y,
        }
    }

    /// Grows the rectangle to include `p`.
    pub fn expand_to(&self, p: Point) -> Rectangle {
        self.union(&Rectangle::at_point(p))
    }
}
