use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A position in layout space.
///
/// Layout space is screen-like: `x` grows to the right and `y` grows downward.
///
/// # Examples
///
/// ```
/// use rs_force_tree::models::Point;
///
/// let a = Point::new(100.0, 100.0);
/// let b = Point::new(103.0, 104.0);
///
/// assert_eq!(a.distance_squared(b), 25.0);
/// assert_eq!(a.distance(b), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Squared Euclidean distance. Prefer this for comparisons; it avoids the root.
    #[inline]
    pub fn distance_squared(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A 2-D force or displacement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y }
    }

    #[inline]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Returns this vector shortened to at most `max_length`, keeping its direction.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_force_tree::models::Vector2;
    ///
    /// let v = Vector2::new(30.0, 40.0).clamp_length(5.0);
    /// assert_eq!(v, Vector2::new(3.0, 4.0));
    ///
    /// // Short vectors are left alone.
    /// assert_eq!(Vector2::new(1.0, 0.0).clamp_length(5.0), Vector2::new(1.0, 0.0));
    /// ```
    pub fn clamp_length(self, max_length: f64) -> Vector2 {
        let length = self.length();
        if length > max_length && length > 0.0 {
            self * (max_length / length)
        } else {
            self
        }
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl Add<Vector2> for Point {
    type Output = Point;

    fn add(self, rhs: Vector2) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// `a - b` is the vector pointing from `b` to `a`.
impl Sub for Point {
    type Output = Vector2;

    fn sub(self, rhs: Point) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from(coordinates: (f64, f64)) -> Self {
        Point::new(coordinates.0, coordinates.1)
    }
}
