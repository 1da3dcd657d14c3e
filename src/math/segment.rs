use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use thiserror::Error;

use crate::math::point::{Coord, Point, QueryPoint};

// The widest predicate multiplies three coordinate-sized factors and sums a
// pair of such products, so i128 intermediates never overflow.
const_assert!(3 * Coord::BITS + 8 <= i128::BITS);

/// Where a point lies relative to a segment's supporting line.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    Above,
    On,
    Below,
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("segment endpoints share x = {0}, vertical segments are not accepted")]
pub struct VerticalSegment(pub Coord);

/// A non-vertical input segment, stored left endpoint first.
///
/// `p.x < q.x` always holds; the constructor swaps the endpoints when they
/// arrive right-to-left and refuses verticals outright.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
pub struct Segment {
    p: Point,
    q: Point,
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{} -> {}", self.p, self.q)
    }
}

impl Segment {
    pub fn new(a: Point, b: Point) -> Result<Self, VerticalSegment> {
        if a.x == b.x {
            return Err(VerticalSegment(a.x));
        }
        let (p, q) = if a.x < b.x { (a, b) } else { (b, a) };
        Ok(Segment { p, q })
    }

    /// Constructor for segments already known to run left to right, used for
    /// the bounding-rectangle walls.
    pub(crate) fn from_ordered(p: Point, q: Point) -> Self {
        debug_assert!(p.x < q.x);
        Segment { p, q }
    }

    /// Left endpoint.
    pub const fn p(&self) -> Point {
        self.p
    }

    /// Right endpoint.
    pub const fn q(&self) -> Point {
        self.q
    }

    pub fn has_endpoint(&self, pt: Point) -> bool {
        self.p == pt || self.q == pt
    }

    const fn dx(&self) -> i64 {
        self.q.x as i64 - self.p.x as i64
    }

    const fn dy(&self) -> i64 {
        self.q.y as i64 - self.p.y as i64
    }

    /// Height of the segment at abscissa `x` by linear interpolation.
    /// Meaningful for `p.x <= x <= q.x`.
    pub fn y_at(&self, x: f64) -> f64 {
        self.p.y as f64 + (x - self.p.x as f64) * self.dy() as f64 / self.dx() as f64
    }

    /// Exact side of `pt` relative to this segment's supporting line, via the
    /// orientation determinant `(q.x-p.x)(pt.y-p.y) - (q.y-p.y)(pt.x-p.x)`.
    /// No division, so integer inputs never misclassify.
    pub fn side_of(&self, pt: Point) -> Side {
        let det = self.dx() as i128 * (pt.y as i64 - self.p.y as i64) as i128
            - self.dy() as i128 * (pt.x as i64 - self.p.x as i64) as i128;
        match det.cmp(&0) {
            Ordering::Greater => Side::Above,
            Ordering::Equal => Side::On,
            Ordering::Less => Side::Below,
        }
    }

    /// `f64` analogue of [`side_of`][Self::side_of] for prompt queries.
    pub fn side_of_query(&self, pt: QueryPoint) -> Side {
        let det = self.dx() as f64 * (pt.y - self.p.y as f64)
            - self.dy() as f64 * (pt.x - self.p.x as f64);
        if det > 0.0 {
            Side::Above
        } else if det < 0.0 {
            Side::Below
        } else {
            Side::On
        }
    }

    /// Compares this segment's height against `other`'s at abscissa `x`,
    /// exactly, by cross-multiplying the interpolation fractions.
    ///
    /// Both heights are taken on the supporting lines, so the caller is
    /// responsible for `x` being inside the spans it cares about.
    pub fn cmp_y_at(&self, other: &Segment, x: Coord) -> Ordering {
        // y(x) = (p.y * dx + (x - p.x) * dy) / dx with dx > 0, so the
        // comparison survives cross-multiplication unchanged.
        let num_a = self.p.y as i128 * self.dx() as i128
            + (x as i64 - self.p.x as i64) as i128 * self.dy() as i128;
        let num_b = other.p.y as i128 * other.dx() as i128
            + (x as i64 - other.p.x as i64) as i128 * other.dy() as i128;
        (num_a * other.dx() as i128).cmp(&(num_b * self.dx() as i128))
    }

    /// Compares slopes exactly. Used to disambiguate a segment leaving a
    /// point that lies on another segment.
    pub fn slope_cmp(&self, other: &Segment) -> Ordering {
        (self.dy() as i128 * other.dx() as i128).cmp(&(other.dy() as i128 * self.dx() as i128))
    }
}
