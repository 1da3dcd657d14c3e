use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::math::{
    point::Point,
    segment::Segment,
};

/// The axis-aligned bounding rectangle every segment must lie strictly
/// inside. `lo` is the bottom-left corner, `hi` the top-right.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize)]
pub struct Rect {
    lo: Point,
    hi: Point,
}

impl Display for Rect {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "[{} - {}]", self.lo, self.hi)
    }
}

impl Rect {
    /// Returns `None` for an empty or inverted rectangle.
    pub fn new(lo: Point, hi: Point) -> Option<Self> {
        (lo.x < hi.x && lo.y < hi.y).then_some(Rect { lo, hi })
    }

    pub const fn lo(&self) -> Point {
        self.lo
    }

    pub const fn hi(&self) -> Point {
        self.hi
    }

    pub const fn contains_strict(&self, p: Point) -> bool {
        self.lo.x < p.x && p.x < self.hi.x && self.lo.y < p.y && p.y < self.hi.y
    }

    /// The top edge as a segment, usable as a trapezoid's `top`.
    pub fn top_wall(&self) -> Segment {
        Segment::from_ordered(Point::new(self.lo.x, self.hi.y), self.hi)
    }

    /// The bottom edge as a segment, usable as a trapezoid's `bottom`.
    pub fn bottom_wall(&self) -> Segment {
        Segment::from_ordered(self.lo, Point::new(self.hi.x, self.lo.y))
    }
}
