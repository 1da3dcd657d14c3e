//! Deterministic naming of points, segments and trapezoids, and the
//! adjacency-matrix dump of the completed search structure.
//!
//! Everything here reads the finished map; nothing mutates it.

use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
    io::Write,
    num::NonZero,
};

use enum_iterator::Sequence;
use enum_map::{Enum, EnumMap};
use itertools::Itertools;
use new_zealand::nz;
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use crate::{
    dag::{Node, NodeIx, NodeKind},
    map::{TrapIx, TrapezoidalMap},
    math::Point,
};

/// The four name families, in matrix section order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[derive(Sequence, Enum)]
pub enum NameClass {
    LeftPoint,
    RightPoint,
    Segment,
    Trapezoid,
}

impl NameClass {
    pub const fn prefix(self) -> &'static str {
        match self {
            NameClass::LeftPoint => "P",
            NameClass::RightPoint => "Q",
            NameClass::Segment => "S",
            NameClass::Trapezoid => "T",
        }
    }
}

/// A stable node name such as `P1`, `Q2`, `S1` or `T4`. Indices are
/// zero-based internally and render one-based like the input numbering.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Name {
    pub class: NameClass,
    pub index: usize,
}

impl Name {
    pub const fn new(class: NameClass, index: usize) -> Self {
        Name { class, index }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}{}", self.class.prefix(), self.index + 1)
    }
}

/// First-come naming of segment endpoints. A point shared between segments
/// keeps the name of its first appearance, so re-inserting an endpoint never
/// mints a second name.
#[derive(Clone, Debug, Default)]
pub struct PointRegistry {
    names: HashMap<Point, Name>,
    counts: EnumMap<NameClass, usize>,
}

impl PointRegistry {
    pub(crate) fn register_left(&mut self, pt: Point) {
        self.register(pt, NameClass::LeftPoint);
    }

    pub(crate) fn register_right(&mut self, pt: Point) {
        self.register(pt, NameClass::RightPoint);
    }

    fn register(&mut self, pt: Point, class: NameClass) {
        if !self.names.contains_key(&pt) {
            let index = self.counts[class];
            self.counts[class] += 1;
            self.names.insert(pt, Name::new(class, index));
        }
    }

    pub fn name_of(&self, pt: Point) -> Option<Name> {
        self.names.get(&pt).copied()
    }

    pub fn count(&self, class: NameClass) -> usize {
        self.counts[class]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The square adjacency matrix of the named search structure: entry
/// `(row, col)` is 1 iff the node named by `col` has a child named by `row`.
#[derive(Clone, Debug)]
pub struct AdjacencyMatrix {
    labels: Vec<Name>,
    cells: Vec<Vec<u8>>,
}

impl AdjacencyMatrix {
    pub fn dim(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[Name] {
        &self.labels
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    pub fn row_sum(&self, row: usize) -> usize {
        self.cells[row].iter().map(|&c| c as usize).sum()
    }

    pub fn col_sum(&self, col: usize) -> usize {
        self.cells.iter().map(|row| row[col] as usize).sum()
    }

    /// One text row per matrix row, entries space-separated and closed by the
    /// row sum; the final line carries the column sums and the grand total.
    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        let mut total = 0;
        for (row, cells) in self.cells.iter().enumerate() {
            let sum = self.row_sum(row);
            total += sum;
            writeln!(w, "{} {sum}", cells.iter().join(" "))?;
        }
        let col_sums = (0..self.dim()).map(|col| self.col_sum(col)).join(" ");
        writeln!(w, "{col_sums} {total}")
    }
}

impl TrapezoidalMap {
    /// Snapshot of the search structure with nodes collapsed to their names.
    ///
    /// Every subdivision node carrying the same segment collapses into the
    /// one graph node named after it, and duplicate edges collapse with them;
    /// the matrix is binary.
    pub fn name_graph(&self) -> DiGraph<Name, ()> {
        let trap_names = self.trap_name_table();
        let mut graph = DiGraph::new();
        let mut indices: HashMap<Name, NodeIndex> = HashMap::new();
        for ix in self.dag().reachable() {
            let from = name_index(&mut graph, &mut indices, self.node_name(ix, &trap_names));
            for child in self.dag().children(ix) {
                let to = name_index(&mut graph, &mut indices, self.node_name(child, &trap_names));
                graph.update_edge(from, to, ());
            }
        }
        graph
    }

    /// The adjacency matrix over all names, sections ordered P, Q, S, T.
    pub fn adjacency_matrix(&self) -> AdjacencyMatrix {
        let mut counts: EnumMap<NameClass, usize> = EnumMap::default();
        counts[NameClass::LeftPoint] = self.points().count(NameClass::LeftPoint);
        counts[NameClass::RightPoint] = self.points().count(NameClass::RightPoint);
        counts[NameClass::Segment] = self.segments().len();
        counts[NameClass::Trapezoid] = self.live_trapezoids().len();

        let mut offsets: EnumMap<NameClass, usize> = EnumMap::default();
        let mut dim = 0;
        for class in enum_iterator::all::<NameClass>() {
            offsets[class] = dim;
            dim += counts[class];
        }
        let slot = |name: Name| offsets[name.class] + name.index;

        let labels = enum_iterator::all::<NameClass>()
            .flat_map(|class| (0..counts[class]).map(move |i| Name::new(class, i)))
            .collect();

        let mut cells = vec![vec![0u8; dim]; dim];
        let graph = self.name_graph();
        for edge in graph.edge_references() {
            let parent = graph[edge.source()];
            let child = graph[edge.target()];
            cells[slot(child)][slot(parent)] = 1;
        }
        AdjacencyMatrix { labels, cells }
    }

    /// Writes the adjacency matrix straight to `w`.
    pub fn export_adjacency<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        self.adjacency_matrix().write_to(w)
    }

    /// Occurrence counts of the node kinds reachable from the root, the
    /// shape of the structure in one line of logging.
    pub fn node_stats(&self) -> HashMap<NodeKind, NonZero<usize>> {
        /// Used only for this one folding operation; the addition simply
        /// panics on overflow since the arena itself is indexed by usize.
        fn increment(n: &mut NonZero<usize>) {
            *n = n.checked_add(1).unwrap();
        }

        self.dag().reachable().into_iter().fold(HashMap::new(), |mut map, ix| {
            map.entry(self.dag().get(ix).kind()).and_modify(increment).or_insert(nz!(1));
            map
        })
    }

    pub(crate) fn node_name(&self, ix: NodeIx, trap_names: &HashMap<TrapIx, Name>) -> Name {
        match self.dag().get(ix) {
            Node::X { point, .. } => {
                self.points().name_of(point).expect("x-node holds an unregistered endpoint")
            }
            Node::Y { segment, .. } => Name::new(NameClass::Segment, segment.get()),
            Node::Leaf { trap } => trap_names[&trap],
            Node::Sentinel => unreachable!("sentinel reachable from the root"),
        }
    }
}

fn name_index(
    graph: &mut DiGraph<Name, ()>,
    indices: &mut HashMap<Name, NodeIndex>,
    name: Name,
) -> NodeIndex {
    *indices.entry(name).or_insert_with(|| graph.add_node(name))
}

#[cfg(test)]
mod tests {
    use assertables::{assert_all, assert_len_eq_x};

    use super::*;
    use crate::{
        map::TrapezoidalMap,
        math::{Coord, QueryPoint, Rect, Segment},
    };

    fn unit_box() -> Rect {
        Rect::new(Point::new(0, 0), Point::new(100, 100)).unwrap()
    }

    fn seg(x1: Coord, y1: Coord, x2: Coord, y2: Coord) -> Segment {
        Segment::new(Point::new(x1, y1), Point::new(x2, y2)).unwrap()
    }

    fn render(matrix: &AdjacencyMatrix) -> String {
        let mut out = Vec::new();
        matrix.write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_map_dumps_a_single_zero() {
        let map = TrapezoidalMap::new(unit_box());
        let matrix = map.adjacency_matrix();
        assert_eq!(matrix.dim(), 1);
        assert_eq!(matrix.get(0, 0), 0);
        assert_eq!(render(&matrix), "0 0\n0 0\n");
    }

    #[test]
    fn one_segment_matrix_has_interior_columns_summing_to_two() {
        let mut map = TrapezoidalMap::new(unit_box());
        map.insert(seg(10, 50, 90, 50)).unwrap();

        let matrix = map.adjacency_matrix();
        // P1, Q1, S1 and four trapezoids.
        assert_eq!(matrix.dim(), 7);
        let (interior, leaves): (Vec<_>, Vec<_>) = (0..matrix.dim())
            .partition(|&col| matrix.labels()[col].class != NameClass::Trapezoid);
        assert_len_eq_x!(interior.clone(), 3);
        assert_all!(interior.iter(), |&col| matrix.col_sum(col) == 2);
        assert_all!(leaves.iter(), |&col| matrix.col_sum(col) == 0);
    }

    #[test]
    fn matrix_rows_carry_their_sums() {
        let mut map = TrapezoidalMap::new(unit_box());
        map.insert(seg(10, 50, 90, 50)).unwrap();

        let text = render(&map.adjacency_matrix());
        let lines: Vec<&str> = text.lines().collect();
        assert_len_eq_x!(lines.clone(), 8);
        assert_all!(lines.iter(), |line: &&str| line.split_whitespace().count() == 8);
        // Grand total: three interior nodes with two children each.
        assert!(lines[7].ends_with(" 6"));
    }

    #[test]
    fn names_render_one_based_by_class() {
        assert_eq!(Name::new(NameClass::LeftPoint, 0).to_string(), "P1");
        assert_eq!(Name::new(NameClass::RightPoint, 1).to_string(), "Q2");
        assert_eq!(Name::new(NameClass::Segment, 2).to_string(), "S3");
        assert_eq!(Name::new(NameClass::Trapezoid, 3).to_string(), "T4");
    }

    #[test]
    fn registry_names_points_first_come_first_served() {
        let mut registry = PointRegistry::default();
        registry.register_left(Point::new(1, 1));
        registry.register_right(Point::new(2, 2));
        registry.register_left(Point::new(2, 2));
        registry.register_left(Point::new(3, 3));

        assert_eq!(registry.name_of(Point::new(1, 1)).unwrap().to_string(), "P1");
        assert_eq!(registry.name_of(Point::new(2, 2)).unwrap().to_string(), "Q1");
        assert_eq!(registry.name_of(Point::new(3, 3)).unwrap().to_string(), "P2");
        assert_eq!(registry.count(NameClass::LeftPoint), 2);
        assert_eq!(registry.count(NameClass::RightPoint), 1);
    }

    #[test]
    fn path_ends_at_the_located_leaf() {
        let mut map = TrapezoidalMap::new(unit_box());
        map.insert(seg(10, 50, 90, 50)).unwrap();

        let pt = QueryPoint::new(50.0, 75.0);
        let path = map.path_to(pt);
        let names = map.trap_name_table();
        assert_eq!(path.last().copied(), Some(names[&map.locate(pt)]));
        // The walk starts at the x-node for the left endpoint.
        assert_eq!(path.first().unwrap().to_string(), "P1");
        assert_eq!(path.to_string(), "P1 -> Q1 -> S1 -> T2");
    }

    #[test]
    fn node_stats_count_reachable_kinds() {
        let mut map = TrapezoidalMap::new(unit_box());
        map.insert(seg(10, 50, 90, 50)).unwrap();

        let stats = map.node_stats();
        assert_eq!(stats[&NodeKind::X].get(), 2);
        assert_eq!(stats[&NodeKind::Y].get(), 1);
        assert_eq!(stats[&NodeKind::Leaf].get(), 4);
        assert!(!stats.contains_key(&NodeKind::Sentinel));
    }

    #[test]
    fn merged_leaf_appears_once_in_the_name_graph() {
        let mut map = TrapezoidalMap::new(unit_box());
        for s in [seg(30, 20, 70, 20), seg(10, 10, 90, 60)] {
            map.insert(s).unwrap();
        }

        let graph = map.name_graph();
        // One graph node per name even though S2 labels several subdivision
        // nodes and the merged trapezoid sits under all of them.
        assert_eq!(graph.node_count(), map.adjacency_matrix().dim());
    }
}
