//! Geometry primitives for database coordinates and placement regions.
//!
//! The chip database works in integer units ([`Point`], [`Rect`]). The
//! placement engine works in single precision on a [`Region`], which is
//! halved repeatedly during quadrisection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer point in database units.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: i64,
    /// Y coordinate.
    pub y: i64,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned integer rectangle in database units.
///
/// A rectangle is valid only when it has positive width and height; rows or
/// core boxes that are missing from a design are represented by invalid
/// rectangles and skipped during region derivation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Lower-left X.
    pub llx: i64,
    /// Lower-left Y.
    pub lly: i64,
    /// Upper-right X.
    pub urx: i64,
    /// Upper-right Y.
    pub ury: i64,
}

impl Rect {
    /// Creates a rectangle from its corners.
    pub fn new(llx: i64, lly: i64, urx: i64, ury: i64) -> Self {
        Self { llx, lly, urx, ury }
    }

    /// Returns the width (`urx - llx`).
    pub fn width(&self) -> i64 {
        self.urx - self.llx
    }

    /// Returns the height (`ury - lly`).
    pub fn height(&self) -> i64 {
        self.ury - self.lly
    }

    /// Returns whether the rectangle has positive extent on both axes.
    pub fn is_valid(&self) -> bool {
        self.urx > self.llx && self.ury > self.lly
    }

    /// Returns the centre of the rectangle in single precision.
    pub fn center(&self) -> (f32, f32) {
        (
            self.llx as f32 + self.width() as f32 / 2.0,
            self.lly as f32 + self.height() as f32 / 2.0,
        )
    }

    /// Returns the smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            llx: self.llx.min(other.llx),
            lly: self.lly.min(other.lly),
            urx: self.urx.max(other.urx),
            ury: self.ury.max(other.ury),
        }
    }

    /// Returns the bounding box of a point set, or `None` for fewer than two points.
    pub fn bounding(points: &[Point]) -> Option<Rect> {
        if points.len() < 2 {
            return None;
        }
        let first = points[0];
        let mut bbox = Rect::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            bbox.llx = bbox.llx.min(p.x);
            bbox.lly = bbox.lly.min(p.y);
            bbox.urx = bbox.urx.max(p.x);
            bbox.ury = bbox.ury.max(p.y);
        }
        Some(bbox)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) - ({}, {})", self.llx, self.lly, self.urx, self.ury)
    }
}

/// A single-precision placement region.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Region {
    /// Lower-left X.
    pub llx: f32,
    /// Lower-left Y.
    pub lly: f32,
    /// Upper-right X.
    pub urx: f32,
    /// Upper-right Y.
    pub ury: f32,
}

impl Region {
    /// Creates a region from its corners.
    pub fn new(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        Self { llx, lly, urx, ury }
    }

    /// Returns the width.
    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    /// Returns the height.
    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }

    /// Returns the centre point.
    pub fn center(&self) -> (f32, f32) {
        (
            self.llx + self.width() / 2.0,
            self.lly + self.height() / 2.0,
        )
    }

    /// Clamps a point into the region.
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (x.max(self.llx).min(self.urx), y.max(self.lly).min(self.ury))
    }

    /// Returns whether the point lies inside the region (edges inclusive).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.llx && x <= self.urx && y >= self.lly && y <= self.ury
    }

    /// Splits the region at its horizontal midpoint into (left, right).
    pub fn split_x(&self) -> (Region, Region) {
        let mid = self.llx + self.width() / 2.0;
        (
            Region::new(self.llx, self.lly, mid, self.ury),
            Region::new(mid, self.lly, self.urx, self.ury),
        )
    }

    /// Splits the region at its vertical midpoint into (bottom, top).
    pub fn split_y(&self) -> (Region, Region) {
        let mid = self.lly + self.height() / 2.0;
        (
            Region::new(self.llx, self.lly, self.urx, mid),
            Region::new(self.llx, mid, self.urx, self.ury),
        )
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Region::new(
            rect.llx as f32,
            rect.lly as f32,
            rect.urx as f32,
            rect.ury as f32,
        )
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) - ({}, {})", self.llx, self.lly, self.urx, self.ury)
    }
}
