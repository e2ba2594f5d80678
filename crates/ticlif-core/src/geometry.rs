#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! [`Point`] is the only vector type in ticlif. It is used both for absolute
//! cell positions (origin at the top-left, 0-indexed) and for sizes measured
//! in cells. Arithmetic is component-wise and accepts another `Point`, an
//! `(i32, i32)` tuple, or a scalar that is broadcast to both components.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Integer 2-D vector used for positions and sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Column (or width).
    pub x: i32,
    /// Row (or height).
    pub y: i32,
}

impl Point {
    /// The origin / empty size.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Build a size from terminal dimensions (columns, rows).
    #[inline]
    pub const fn from_cells(columns: u16, rows: u16) -> Self {
        Self::new(columns as i32, rows as i32)
    }

    /// Component-wise minimum.
    #[inline]
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    #[inline]
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Clamp each component to `0..=other - 1`, treating `self` as a position
    /// and `size` as the extent it must fit in.
    ///
    /// Axes with a zero (or negative) extent pin the component to 0.
    #[must_use]
    pub fn clamp_within(self, size: Self) -> Self {
        let clamp = |value: i32, extent: i32| {
            if extent <= 0 {
                0
            } else {
                value.clamp(0, extent - 1)
            }
        };
        Self::new(clamp(self.x, size.x), clamp(self.y, size.y))
    }

    /// Whether this position lies inside a region of the given size anchored
    /// at the origin.
    #[inline]
    pub const fn is_within(self, size: Self) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < size.x && self.y < size.y
    }

    /// Whether either component is negative.
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.x < 0 || self.y < 0
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for (i32, i32) {
    fn from(point: Point) -> Self {
        (point.x, point.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Add<(i32, i32)> for Point {
    type Output = Point;

    fn add(self, (x, y): (i32, i32)) -> Point {
        Point::new(self.x + x, self.y + y)
    }
}

impl Add<i32> for Point {
    type Output = Point;

    fn add(self, rhs: i32) -> Point {
        Point::new(self.x + rhs, self.y + rhs)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Sub<(i32, i32)> for Point {
    type Output = Point;

    fn sub(self, (x, y): (i32, i32)) -> Point {
        Point::new(self.x - x, self.y - y)
    }
}

impl Sub<i32> for Point {
    type Output = Point;

    fn sub(self, rhs: i32) -> Point {
        Point::new(self.x - rhs, self.y - rhs)
    }
}

impl<T> AddAssign<T> for Point
where
    Point: Add<T, Output = Point>,
{
    fn add_assign(&mut self, rhs: T) {
        *self = *self + rhs;
    }
}

impl<T> SubAssign<T> for Point
where
    Point: Sub<T, Output = Point>,
{
    fn sub_assign(&mut self, rhs: T) {
        *self = *self - rhs;
    }
}
