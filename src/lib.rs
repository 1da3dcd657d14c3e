//! Incremental trapezoidal-map construction and planar point location.
//!
//! Non-crossing segments inside an axis-aligned rectangle are inserted one at
//! a time; the map keeps the decomposition into trapezoids and a search DAG
//! answering "which trapezoid contains this point" in expected logarithmic
//! time.

pub mod dag;
pub mod export;
pub mod input;
pub mod insert;
pub mod map;
pub mod math;
mod typed_ix;

pub use export::{AdjacencyMatrix, Name, NameClass, PointRegistry};
pub use input::{Scene, load_scene_from_file, parse_scene};
pub use insert::InsertError;
pub use map::{NodePath, SegId, TrapIx, Trapezoid, TrapezoidalMap};
pub use math::{Coord, Point, QueryPoint, Rect, Segment, Side};
pub use typed_ix::TypedIx;
