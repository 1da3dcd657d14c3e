use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Coordinate type for segment endpoints. Input files carry integers; all
/// construction-time predicates stay exact by widening from this type.
pub type Coord = i32;

/// A segment endpoint or bounding-rectangle corner.
///
/// The derived `Ord` is lexicographic by `x`, then `y`, which is the
/// comparison used everywhere two endpoints are ordered or tested for
/// identity.
#[derive(Debug, Copy, Clone, Default)]
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Point {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Point { x, y }
    }
}

/// A query point as typed at the prompt. Queries are evaluated in `f64`;
/// exact arithmetic is reserved for construction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QueryPoint {
    pub x: f64,
    pub y: f64,
}

impl QueryPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        QueryPoint { x, y }
    }
}

impl From<Point> for QueryPoint {
    fn from(p: Point) -> Self {
        QueryPoint::new(p.x as f64, p.y as f64)
    }
}

impl Display for QueryPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Point::new(1, 5), Point::new(2, 0) ; "smaller x wins")]
    #[test_case(Point::new(3, 1), Point::new(3, 2) ; "equal x falls back to y")]
    #[test_case(Point::new(-4, 9), Point::new(-3, -9) ; "negative coordinates")]
    fn point_order_is_lexicographic(a: Point, b: Point) {
        assert!(a < b);
        assert!(b > a);
    }

    #[test]
    fn display_matches_input_notation() {
        assert_eq!(Point::new(10, 50).to_string(), "(10, 50)");
        assert_eq!(QueryPoint::new(0.5, -2.0).to_string(), "(0.5, -2)");
    }
}
