//! The point-location search structure: a rooted DAG of x-nodes, y-nodes and
//! trapezoid leaves held in an arena.
//!
//! Children are handles, never owning references, so a leaf can sit under any
//! number of parents. Replacing a leaf with a subgraph overwrites the leaf's
//! own slot with the subgraph's root, which retargets every inbound edge at
//! once without parent bookkeeping. Nodes orphaned this way stay in the arena
//! unreachable from the root.

use std::mem;

use derive_more::IsVariant;

use crate::{
    map::{SegId, TrapIx},
    math::Point,
    typed_ix::TypedIx,
};

pub type NodeIx = TypedIx<Node>;

/// One node of the search structure.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[derive(IsVariant)]
pub enum Node {
    /// Branches on the query's x against a segment endpoint. Equal x routes
    /// left, so an endpoint counts as "on or left of" its own vertical.
    X { point: Point, left: NodeIx, right: NodeIx },
    /// Branches on the query's side of a segment. A query exactly on the
    /// segment routes above.
    Y { segment: SegId, above: NodeIx, below: NodeIx },
    /// Terminal: the trapezoid containing the query.
    Leaf { trap: TrapIx },
    /// Placeholder occupying a slot whose contents are being rewritten. Never
    /// reachable from the root between mutations.
    Sentinel,
}

/// Discriminant-only view of [`Node`], used for statistics and logging.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    X,
    Y,
    Leaf,
    Sentinel,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            NodeKind::X => "x-node",
            NodeKind::Y => "y-node",
            NodeKind::Leaf => "leaf",
            NodeKind::Sentinel => "sentinel",
        };
        write!(f, "{label}")
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::X { .. } => NodeKind::X,
            Node::Y { .. } => NodeKind::Y,
            Node::Leaf { .. } => NodeKind::Leaf,
            Node::Sentinel => NodeKind::Sentinel,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dag {
    nodes: Vec<Node>,
}

impl Default for Dag {
    /// A fresh structure holds a sentinel root; the owner installs the
    /// initial leaf with [`set`][Self::set].
    fn default() -> Self {
        Dag { nodes: vec![Node::Sentinel] }
    }
}

impl Dag {
    /// The root never moves: rewrites overwrite slots in place.
    pub fn root(&self) -> NodeIx {
        NodeIx::from_usize(0)
    }

    pub fn get(&self, ix: NodeIx) -> Node {
        self.nodes[ix.get()]
    }

    pub fn alloc(&mut self, node: Node) -> NodeIx {
        let ix = NodeIx::from_usize(self.nodes.len());
        self.nodes.push(node);
        ix
    }

    /// Takes a slot's contents, leaving a sentinel behind. Pairs with
    /// [`set`][Self::set] around a rewrite.
    pub fn take(&mut self, ix: NodeIx) -> Node {
        mem::replace(&mut self.nodes[ix.get()], Node::Sentinel)
    }

    pub fn set(&mut self, ix: NodeIx, node: Node) {
        self.nodes[ix.get()] = node;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIx, Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, &n)| (NodeIx::from_usize(i), n))
    }

    /// Children of a node, in deterministic order: left/right for x-nodes,
    /// above/below for y-nodes.
    pub fn children(&self, ix: NodeIx) -> impl Iterator<Item = NodeIx> {
        let pair = match self.get(ix) {
            Node::X { left, right, .. } => Some((left, right)),
            Node::Y { above, below, .. } => Some((above, below)),
            Node::Leaf { .. } | Node::Sentinel => None,
        };
        pair.into_iter().flat_map(|(a, b)| [a, b])
    }

    /// Preorder walk over the nodes reachable from the root, visiting shared
    /// subgraphs once.
    pub fn reachable(&self) -> Vec<NodeIx> {
        let mut seen = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(ix) = stack.pop() {
            if mem::replace(&mut seen[ix.get()], true) {
                continue;
            }
            order.push(ix);
            // Push in reverse so the first child is visited first.
            let children: Vec<_> = self.children(ix).collect();
            for child in children.into_iter().rev() {
                stack.push(child);
            }
        }
        order
    }
}
