//! Trapezoid map state and the read-only query surface.

use std::{collections::HashMap, fmt::{Display, Formatter}};

use anyhow::bail;
use derive_more::{Deref, DerefMut, From};
use itertools::Itertools;
use petgraph::{algo::is_cyclic_directed, graph::DiGraph};

use crate::{
    dag::{Dag, Node, NodeIx},
    export::{Name, NameClass, PointRegistry},
    math::{Point, QueryPoint, Rect, Segment, Side},
    typed_ix::TypedIx,
};

pub type TrapIx = TypedIx<Trapezoid>;
pub type SegId = TypedIx<Segment>;

/// One cell of the decomposition.
///
/// `top` and `bottom` hold the full supporting segments (input segment or
/// bounding wall), not the clipped pieces; two cells bounded by the same
/// segment compare equal on that side. Neighbor links cross the vertical
/// walls: when a wall has a single neighbor both slots hold it, and `None`
/// appears only against the bounding rectangle.
///
/// A cell is never resized or reused. Splitting allocates fresh cells and the
/// old one simply becomes unreachable from the search structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trapezoid {
    pub(crate) left_p: Point,
    pub(crate) right_p: Point,
    pub(crate) top: Segment,
    pub(crate) bottom: Segment,
    pub(crate) upper_left: Option<TrapIx>,
    pub(crate) lower_left: Option<TrapIx>,
    pub(crate) upper_right: Option<TrapIx>,
    pub(crate) lower_right: Option<TrapIx>,
    pub(crate) leaf: NodeIx,
}

impl Trapezoid {
    pub fn left_p(&self) -> Point {
        self.left_p
    }

    pub fn right_p(&self) -> Point {
        self.right_p
    }

    pub fn top(&self) -> &Segment {
        &self.top
    }

    pub fn bottom(&self) -> &Segment {
        &self.bottom
    }

    /// The leaf node referencing this trapezoid.
    pub fn leaf(&self) -> NodeIx {
        self.leaf
    }

    pub fn upper_right(&self) -> Option<TrapIx> {
        self.upper_right
    }

    pub fn lower_right(&self) -> Option<TrapIx> {
        self.lower_right
    }

    /// True if the query point lies strictly between the four boundaries.
    pub fn contains_query(&self, pt: QueryPoint) -> bool {
        self.left_p.x as f64 <= pt.x
            && pt.x <= self.right_p.x as f64
            && self.top.y_at(pt.x) > pt.y
            && self.bottom.y_at(pt.x) < pt.y
    }
}

/// The root-to-leaf node names visited by a query.
#[derive(Debug, Clone, PartialEq, Eq, From, Deref, DerefMut)]
pub struct NodePath(Vec<Name>);

impl Display for NodePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0.iter().join(" -> "))
    }
}

/// The trapezoidal decomposition of a bounding rectangle plus its search
/// structure. Built one segment at a time with
/// [`insert`][TrapezoidalMap::insert]; queried with
/// [`locate`][TrapezoidalMap::locate] once construction is done.
#[derive(Debug, Clone)]
pub struct TrapezoidalMap {
    pub(crate) bbox: Rect,
    pub(crate) dag: Dag,
    pub(crate) traps: Vec<Trapezoid>,
    pub(crate) segments: Vec<Segment>,
    pub(crate) points: PointRegistry,
}

impl TrapezoidalMap {
    /// A map holding the single trapezoid that is the whole rectangle.
    pub fn new(bbox: Rect) -> Self {
        let mut dag = Dag::default();
        let root = dag.root();
        let initial = Trapezoid {
            left_p: bbox.lo(),
            right_p: bbox.hi(),
            top: bbox.top_wall(),
            bottom: bbox.bottom_wall(),
            upper_left: None,
            lower_left: None,
            upper_right: None,
            lower_right: None,
            leaf: root,
        };
        dag.set(root, Node::Leaf { trap: TrapIx::from_usize(0) });
        TrapezoidalMap {
            bbox,
            dag,
            traps: vec![initial],
            segments: Vec::new(),
            points: PointRegistry::default(),
        }
    }

    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, id: SegId) -> &Segment {
        &self.segments[id.get()]
    }

    pub fn trapezoid(&self, ix: TrapIx) -> &Trapezoid {
        &self.traps[ix.get()]
    }

    pub fn points(&self) -> &PointRegistry {
        &self.points
    }

    pub(crate) fn trap(&self, ix: TrapIx) -> &Trapezoid {
        &self.traps[ix.get()]
    }

    pub(crate) fn trap_mut(&mut self, ix: TrapIx) -> &mut Trapezoid {
        &mut self.traps[ix.get()]
    }

    /// Which trapezoid contains the query point. Total on the rectangle;
    /// ties route left at x-nodes and above at y-nodes.
    pub fn locate(&self, pt: QueryPoint) -> TrapIx {
        let mut ix = self.dag.root();
        loop {
            match self.dag.get(ix) {
                Node::X { point, left, right } => {
                    ix = if pt.x > point.x as f64 { right } else { left };
                }
                Node::Y { segment, above, below } => {
                    ix = match self.segment(segment).side_of_query(pt) {
                        Side::Below => below,
                        Side::Above | Side::On => above,
                    };
                }
                Node::Leaf { trap } => return trap,
                Node::Sentinel => unreachable!("sentinel reachable from the root"),
            }
        }
    }

    /// The node names visited on the way to the containing trapezoid, root
    /// first. The final name is the leaf's.
    pub fn path_to(&self, pt: QueryPoint) -> NodePath {
        let trap_names = self.trap_name_table();
        let mut path = Vec::new();
        let mut ix = self.dag.root();
        loop {
            match self.dag.get(ix) {
                Node::X { point, left, right } => {
                    path.push(
                        self.points
                            .name_of(point)
                            .expect("x-node holds an unregistered endpoint"),
                    );
                    ix = if pt.x > point.x as f64 { right } else { left };
                }
                Node::Y { segment, above, below } => {
                    path.push(Name::new(NameClass::Segment, segment.get()));
                    ix = match self.segment(segment).side_of_query(pt) {
                        Side::Below => below,
                        Side::Above | Side::On => above,
                    };
                }
                Node::Leaf { trap } => {
                    path.push(trap_names[&trap]);
                    return NodePath::from(path);
                }
                Node::Sentinel => unreachable!("sentinel reachable from the root"),
            }
        }
    }

    /// Reachable trapezoids in first-seen search-structure order. This is the
    /// order the export names them in.
    pub fn live_trapezoids(&self) -> Vec<TrapIx> {
        self.dag
            .reachable()
            .into_iter()
            .filter_map(|ix| match self.dag.get(ix) {
                Node::Leaf { trap } => Some(trap),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn trap_name_table(&self) -> HashMap<TrapIx, Name> {
        self.live_trapezoids()
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t, Name::new(NameClass::Trapezoid, i)))
            .collect()
    }

    /// Structural self-check: the search structure is acyclic, leaves and
    /// trapezoids agree on each other, every live trapezoid is geometrically
    /// sane and its neighbor links point at live trapezoids.
    pub fn validate(&self) -> anyhow::Result<()> {
        let reachable = self.dag.reachable();

        let mut graph: DiGraph<NodeIx, ()> = DiGraph::new();
        let gix: HashMap<NodeIx, _> =
            reachable.iter().map(|&ix| (ix, graph.add_node(ix))).collect();
        for &ix in &reachable {
            for child in self.dag.children(ix) {
                graph.add_edge(gix[&ix], gix[&child], ());
            }
        }
        if is_cyclic_directed(&graph) {
            bail!("search structure contains a cycle");
        }

        let live = self.live_trapezoids();
        for &ix in &reachable {
            if let Node::Sentinel = self.dag.get(ix) {
                bail!("sentinel node {ix:?} is reachable from the root");
            }
            if let Node::Leaf { trap } = self.dag.get(ix)
                && self.trap(trap).leaf != ix
            {
                bail!("leaf {ix:?} and trapezoid {trap:?} disagree on each other");
            }
        }

        for &t_ix in &live {
            let t = self.trap(t_ix);
            if t.left_p.x >= t.right_p.x {
                bail!("trapezoid {t_ix:?} has an empty x-range");
            }
            for x in [t.left_p.x, t.right_p.x] {
                if t.top.cmp_y_at(&t.bottom, x) == std::cmp::Ordering::Less {
                    bail!("trapezoid {t_ix:?} has its top below its bottom at x = {x}");
                }
            }
            if t.top.cmp_y_at(&t.bottom, t.left_p.x) == std::cmp::Ordering::Equal
                && t.top.cmp_y_at(&t.bottom, t.right_p.x) == std::cmp::Ordering::Equal
            {
                bail!("trapezoid {t_ix:?} is degenerate");
            }
            for link in [t.upper_left, t.lower_left, t.upper_right, t.lower_right] {
                if let Some(n) = link
                    && !live.contains(&n)
                {
                    bail!("trapezoid {t_ix:?} links to dead trapezoid {n:?}");
                }
            }
        }

        Ok(())
    }
}
