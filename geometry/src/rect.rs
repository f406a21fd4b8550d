use std::ops::{Add, Sub};

use crate::{Contains, Point, Size, Vector};

/// A basic rectangle representation. Meant to be sorted and with finite values only.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub const ZERO: Self = Self {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    #[must_use]
    pub fn new(origin: impl Into<Point>, size: impl Into<Size>) -> Self {
        (origin.into(), size.into()).into()
    }

    pub fn is_empty(&self) -> bool {
        // We write it as the NOT of a non-empty rect, so we will return true if any values
        // are NaN.
        !(self.left < self.right && self.top < self.bottom)
    }

    pub fn size(&self) -> Size {
        (self.right - self.left, self.bottom - self.top).into()
    }

    pub fn origin(&self) -> Point {
        (self.left, self.top).into()
    }

    pub fn center(&self) -> Point {
        (
            self.left * 0.5 + self.right * 0.5,
            self.top * 0.5 + self.bottom * 0.5,
        )
            .into()
    }

    /// Returns a clockwise quad starting at left / top.
    pub fn to_quad(&self) -> [Point; 4] {
        [
            (self.left, self.top).into(),
            (self.right, self.top).into(),
            (self.right, self.bottom).into(),
            (self.left, self.bottom).into(),
        ]
    }

    #[must_use]
    pub fn with_outset(&self, d: impl Into<Vector>) -> Self {
        let d = d.into();
        (
            self.left - d.x,
            self.top - d.y,
            self.right + d.x,
            self.bottom + d.y,
        )
            .into()
    }

    /// Overlap on both axes simultaneously (the standard AABB test).
    pub fn intersects(&self, other: impl Into<Self>) -> bool {
        let other = other.into();
        let l = self.left.max(other.left);
        let r = self.right.min(other.right);
        let t = self.top.max(other.top);
        let b = self.bottom.min(other.bottom);
        l < r && t < b
    }
}

impl From<(f64, f64, f64, f64)> for Rect {
    fn from((left, top, right, bottom): (f64, f64, f64, f64)) -> Self {
        (Point::new(left, top), Point::new(right, bottom)).into()
    }
}

impl From<(Point, Size)> for Rect {
    fn from((origin, size): (Point, Size)) -> Self {
        let rb = origin + size;
        (origin, rb).into()
    }
}

impl From<(Point, Point)> for Rect {
    fn from((origin, end): (Point, Point)) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            right: end.x,
            bottom: end.y,
        }
    }
}

impl Add<Vector> for Rect {
    type Output = Self;

    fn add(self, d: Vector) -> Self::Output {
        Self {
            left: self.left + d.x,
            top: self.top + d.y,
            right: self.right + d.x,
            bottom: self.bottom + d.y,
        }
    }
}

impl Sub<Vector> for Rect {
    type Output = Self;

    fn sub(self, d: Vector) -> Self::Output {
        Self {
            left: self.left - d.x,
            top: self.top - d.y,
            right: self.right - d.x,
            bottom: self.bottom - d.y,
        }
    }
}

impl Contains<Point> for Rect {
    fn contains(&self, p: Point) -> bool {
        self.contains(&p)
    }
}

impl Contains<&Point> for Rect {
    fn contains(&self, p: &Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }
}

impl Contains<&Rect> for Rect {
    fn contains(&self, r: &Rect) -> bool {
        !r.is_empty()
            && !self.is_empty()
            && self.left <= r.left
            && self.top <= r.top
            && self.right >= r.right
            && self.bottom >= r.bottom
    }
}
