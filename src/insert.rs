//! Incremental insertion: locating the left endpoint, walking the chain of
//! crossed trapezoids, splitting and merging, and rewriting the search
//! structure in place.

use std::cmp::Ordering;

use log::{debug, trace};
use thiserror::Error;

use crate::{
    dag::{Node, NodeIx},
    map::{SegId, TrapIx, Trapezoid, TrapezoidalMap},
    math::{Coord, Point, Segment, Side},
};

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum InsertError {
    #[error("endpoint {0} lies outside the bounding rectangle")]
    OutOfBounds(Point),
    #[error("segment would cross existing geometry at {0}")]
    Crossing(Point),
}

impl TrapezoidalMap {
    /// Integrates one segment into the map and the search structure.
    ///
    /// All checks run before the first mutation, so a refused segment leaves
    /// the map exactly as it was.
    pub fn insert(&mut self, seg: Segment) -> Result<SegId, InsertError> {
        for pt in [seg.p(), seg.q()] {
            if !self.bbox.contains_strict(pt) {
                return Err(InsertError::OutOfBounds(pt));
            }
        }
        let start = self.locate_left_endpoint(&seg)?;
        let chain = self.collect_chain(&seg, start)?;
        self.validate_chain(&seg, &chain)?;

        let sid = SegId::from_usize(self.segments.len());
        self.segments.push(seg);
        self.points.register_left(seg.p());
        self.points.register_right(seg.q());
        debug!(
            target: "insert",
            "S{}: {} crosses {} trapezoid(s)",
            sid.get() + 1,
            seg,
            chain.len()
        );
        self.split_chain(sid, &chain);
        Ok(sid)
    }

    /// Locates the trapezoid the new segment starts in. This is the query
    /// walk with insertion tie-breaks: the segment continues to the right of
    /// its left endpoint, so an exact x match routes right, and a left
    /// endpoint lying on a y-node's segment is resolved by slope.
    fn locate_left_endpoint(&self, s: &Segment) -> Result<TrapIx, InsertError> {
        let p = s.p();
        let mut ix = self.dag.root();
        loop {
            match self.dag.get(ix) {
                Node::X { point, left, right } => {
                    ix = if p.x < point.x { left } else { right };
                }
                Node::Y { segment, above, below } => {
                    let e = *self.segment(segment);
                    ix = match e.side_of(p) {
                        Side::Above => above,
                        Side::Below => below,
                        Side::On => self.route_along(s, &e, above, below)?,
                    };
                }
                Node::Leaf { trap } => return Ok(trap),
                Node::Sentinel => unreachable!("sentinel reachable from the root"),
            }
        }
    }

    /// The new segment's left endpoint sits on `e`'s supporting line. Legal
    /// only at `e`'s endpoints (shared vertices) or beyond `e`'s span; the
    /// walk then continues on the side the new segment leaves towards.
    fn route_along(
        &self,
        s: &Segment,
        e: &Segment,
        above: NodeIx,
        below: NodeIx,
    ) -> Result<NodeIx, InsertError> {
        let p = s.p();
        if p == e.p() {
            match s.slope_cmp(e) {
                Ordering::Greater => Ok(above),
                Ordering::Less => Ok(below),
                // Same slope out of the same endpoint: the segments overlap.
                Ordering::Equal => Err(InsertError::Crossing(p)),
            }
        } else if p == e.q() {
            match s.slope_cmp(e) {
                Ordering::Greater | Ordering::Equal => Ok(above),
                Ordering::Less => Ok(below),
            }
        } else if e.p().x < p.x && p.x < e.q().x {
            // T-junction: the endpoint lands in the interior of e.
            Err(InsertError::Crossing(p))
        } else {
            // On the extension beyond e's span; same convention as a query.
            Ok(above)
        }
    }

    /// Walks right from the starting trapezoid, following the neighbor the
    /// segment exits into, until a wall at or past the right endpoint.
    fn collect_chain(&self, s: &Segment, start: TrapIx) -> Result<Vec<TrapIx>, InsertError> {
        let mut chain = vec![start];
        let mut t = start;
        while self.trap(t).right_p.x < s.q().x {
            let rp = self.trap(t).right_p;
            let next = match s.side_of(rp) {
                // The segment passes above the wall point, so it exits
                // through the upper part of the wall.
                Side::Below => self.trap(t).upper_right,
                Side::Above => self.trap(t).lower_right,
                Side::On => return Err(InsertError::Crossing(rp)),
            };
            t = next.expect("chain walk ran off the bounding rectangle");
            chain.push(t);
        }
        Ok(chain)
    }

    /// Rejects a segment that would leave any crossed trapezoid through its
    /// top or bottom. Checked exactly at both clipped slab edges; touching is
    /// only allowed where the segments share an endpoint.
    fn validate_chain(&self, s: &Segment, chain: &[TrapIx]) -> Result<(), InsertError> {
        for &t_ix in chain {
            let t = self.trap(t_ix);
            let xl = t.left_p.x.max(s.p().x);
            let xr = t.right_p.x.min(s.q().x);
            for x in [xl, xr] {
                match s.cmp_y_at(&t.top, x) {
                    Ordering::Less => {}
                    Ordering::Equal if shares_endpoint_at(s, &t.top, x) => {}
                    _ => return Err(InsertError::Crossing(nearest_input_point(s, t, x))),
                }
                match s.cmp_y_at(&t.bottom, x) {
                    Ordering::Greater => {}
                    Ordering::Equal if shares_endpoint_at(s, &t.bottom, x) => {}
                    _ => return Err(InsertError::Crossing(nearest_input_point(s, t, x))),
                }
            }
        }
        Ok(())
    }

    /// Splits every trapezoid the segment crosses and rewrites the search
    /// structure. One upper and one lower piece stay open while walls keep
    /// cutting only the other side of the segment; that is exactly the
    /// merging of sub-pieces sharing the same top and bottom.
    fn split_chain(&mut self, sid: SegId, chain: &[TrapIx]) {
        let s = *self.segment(sid);
        let p = s.p();
        let q = s.q();
        let first = chain[0];
        let last = chain[chain.len() - 1];

        let first_old = self.trap(first).clone();
        let last_old = self.trap(last).clone();
        let has_left_cap = p.x > first_old.left_p.x;
        let has_right_cap = q.x < last_old.right_p.x;

        let mut cur_u = self.alloc_trap(p, first_old.top, s);
        let mut cur_l = self.alloc_trap(p, s, first_old.bottom);
        let mut pieces = Vec::with_capacity(chain.len());

        // Left cap, or attachment straight onto the old left wall.
        let left_cap = if has_left_cap {
            let cap = self.alloc_trap(first_old.left_p, first_old.top, first_old.bottom);
            {
                let t = self.trap_mut(cap);
                t.right_p = p;
                t.upper_left = first_old.upper_left;
                t.lower_left = first_old.lower_left;
                t.upper_right = Some(cur_u);
                t.lower_right = Some(cur_l);
            }
            self.relink_right_links(first_old.upper_left, first, cap);
            self.relink_right_links(first_old.lower_left, first, cap);
            for piece in [cur_u, cur_l] {
                let t = self.trap_mut(piece);
                t.upper_left = Some(cap);
                t.lower_left = Some(cap);
            }
            Some(cap)
        } else {
            {
                let t = self.trap_mut(cur_u);
                t.upper_left = first_old.upper_left;
                t.lower_left = first_old.upper_left;
            }
            {
                let t = self.trap_mut(cur_l);
                t.upper_left = first_old.lower_left;
                t.lower_left = first_old.lower_left;
            }
            self.split_relink_left_neighbor(first_old.upper_left, first, cur_u, cur_l, &s);
            if first_old.lower_left != first_old.upper_left {
                self.split_relink_left_neighbor(first_old.lower_left, first, cur_u, cur_l, &s);
            }
            None
        };
        pieces.push((cur_u, cur_l));

        // Interior walls. The wall through a point below the segment no
        // longer reaches above it, so only the lower piece closes there, and
        // symmetrically for a point above.
        for win in chain.windows(2) {
            let (ti, tnext) = (win[0], win[1]);
            let ti_old = self.trap(ti).clone();
            let tnext_old = self.trap(tnext).clone();
            let rp = ti_old.right_p;
            match s.side_of(rp) {
                Side::Below => {
                    trace!(target: "insert", "closing lower piece at {rp}");
                    self.trap_mut(cur_l).right_p = rp;
                    let new_l = self.alloc_trap(rp, s, tnext_old.bottom);
                    debug_assert_eq!(self.trap(cur_u).top, tnext_old.top);

                    self.trap_mut(cur_l).upper_right = Some(new_l);
                    if ti_old.lower_right != ti_old.upper_right {
                        self.trap_mut(cur_l).lower_right = ti_old.lower_right;
                        self.relink_left_links(ti_old.lower_right, ti, cur_l);
                    } else {
                        self.trap_mut(cur_l).lower_right = Some(new_l);
                    }

                    self.trap_mut(new_l).upper_left = Some(cur_l);
                    if tnext_old.lower_left != Some(ti) {
                        self.trap_mut(new_l).lower_left = tnext_old.lower_left;
                        self.relink_right_links(tnext_old.lower_left, tnext, new_l);
                    } else {
                        self.trap_mut(new_l).lower_left = Some(cur_l);
                    }
                    cur_l = new_l;
                }
                Side::Above => {
                    trace!(target: "insert", "closing upper piece at {rp}");
                    self.trap_mut(cur_u).right_p = rp;
                    let new_u = self.alloc_trap(rp, tnext_old.top, s);
                    debug_assert_eq!(self.trap(cur_l).bottom, tnext_old.bottom);

                    self.trap_mut(cur_u).lower_right = Some(new_u);
                    if ti_old.upper_right != ti_old.lower_right {
                        self.trap_mut(cur_u).upper_right = ti_old.upper_right;
                        self.relink_left_links(ti_old.upper_right, ti, cur_u);
                    } else {
                        self.trap_mut(cur_u).upper_right = Some(new_u);
                    }

                    self.trap_mut(new_u).lower_left = Some(cur_u);
                    if tnext_old.upper_left != Some(ti) {
                        self.trap_mut(new_u).upper_left = tnext_old.upper_left;
                        self.relink_right_links(tnext_old.upper_left, tnext, new_u);
                    } else {
                        self.trap_mut(new_u).upper_left = Some(cur_u);
                    }
                    cur_u = new_u;
                }
                Side::On => unreachable!("chain walk validated all wall points off the segment"),
            }
            pieces.push((cur_u, cur_l));
        }

        // Right cap, mirroring the left.
        self.trap_mut(cur_u).right_p = q;
        self.trap_mut(cur_l).right_p = q;
        let right_cap = if has_right_cap {
            let cap = self.alloc_trap(q, last_old.top, last_old.bottom);
            {
                let t = self.trap_mut(cap);
                t.right_p = last_old.right_p;
                t.upper_right = last_old.upper_right;
                t.lower_right = last_old.lower_right;
                t.upper_left = Some(cur_u);
                t.lower_left = Some(cur_l);
            }
            self.relink_left_links(last_old.upper_right, last, cap);
            self.relink_left_links(last_old.lower_right, last, cap);
            for piece in [cur_u, cur_l] {
                let t = self.trap_mut(piece);
                t.upper_right = Some(cap);
                t.lower_right = Some(cap);
            }
            Some(cap)
        } else {
            {
                let t = self.trap_mut(cur_u);
                t.upper_right = last_old.upper_right;
                t.lower_right = last_old.upper_right;
            }
            {
                let t = self.trap_mut(cur_l);
                t.upper_right = last_old.lower_right;
                t.lower_right = last_old.lower_right;
            }
            self.split_relink_right_neighbor(last_old.upper_right, last, cur_u, cur_l, &s);
            if last_old.lower_right != last_old.upper_right {
                self.split_relink_right_neighbor(last_old.lower_right, last, cur_u, cur_l, &s);
            }
            None
        };

        // Search-structure rewrite: every crossed leaf becomes y(s) over its
        // pieces, wrapped by an x-node at each capped end. Writing into the
        // old leaf's slot retargets all of its parents at once.
        for (i, (&t_ix, &(upper, lower))) in chain.iter().zip(pieces.iter()).enumerate() {
            let mut node = Node::Y {
                segment: sid,
                above: self.trap(upper).leaf,
                below: self.trap(lower).leaf,
            };
            if i == chain.len() - 1
                && let Some(cap) = right_cap
            {
                let inner = self.dag.alloc(node);
                node = Node::X { point: q, left: inner, right: self.trap(cap).leaf };
            }
            if i == 0
                && let Some(cap) = left_cap
            {
                let inner = self.dag.alloc(node);
                node = Node::X { point: p, left: self.trap(cap).leaf, right: inner };
            }
            let slot = self.trap(t_ix).leaf;
            self.dag.take(slot);
            self.dag.set(slot, node);
        }
    }

    /// A fresh trapezoid with a fresh leaf. Neighbor links and the right
    /// point are wired up by the caller.
    fn alloc_trap(&mut self, left_p: Point, top: Segment, bottom: Segment) -> TrapIx {
        let ix = TrapIx::from_usize(self.traps.len());
        let leaf = self.dag.alloc(Node::Leaf { trap: ix });
        self.traps.push(Trapezoid {
            left_p,
            right_p: left_p,
            top,
            bottom,
            upper_left: None,
            lower_left: None,
            upper_right: None,
            lower_right: None,
            leaf,
        });
        ix
    }

    fn relink_right_links(&mut self, nb: Option<TrapIx>, old: TrapIx, new: TrapIx) {
        let Some(nb) = nb else { return };
        let t = self.trap_mut(nb);
        if t.upper_right == Some(old) {
            t.upper_right = Some(new);
        }
        if t.lower_right == Some(old) {
            t.lower_right = Some(new);
        }
    }

    fn relink_left_links(&mut self, nb: Option<TrapIx>, old: TrapIx, new: TrapIx) {
        let Some(nb) = nb else { return };
        let t = self.trap_mut(nb);
        if t.upper_left == Some(old) {
            t.upper_left = Some(new);
        }
        if t.lower_left == Some(old) {
            t.lower_left = Some(new);
        }
    }

    /// Retargets a surviving neighbor left of a wall whose right side was
    /// split by `s` into `upper` and `lower`. Each matching link picks the
    /// piece on its own side of `s` at the wall.
    fn split_relink_left_neighbor(
        &mut self,
        nb: Option<TrapIx>,
        old: TrapIx,
        upper: TrapIx,
        lower: TrapIx,
        s: &Segment,
    ) {
        let Some(nb) = nb else { return };
        let wall_x = self.trap(nb).right_p.x;
        let top = self.trap(nb).top;
        let bottom = self.trap(nb).bottom;
        let t = self.trap_mut(nb);
        if t.upper_right == Some(old) {
            t.upper_right =
                Some(if s.cmp_y_at(&top, wall_x) == Ordering::Less { upper } else { lower });
        }
        if t.lower_right == Some(old) {
            t.lower_right =
                Some(if s.cmp_y_at(&bottom, wall_x) == Ordering::Greater { lower } else { upper });
        }
    }

    /// Mirror of [`split_relink_left_neighbor`][Self::split_relink_left_neighbor]
    /// for a neighbor right of the wall.
    fn split_relink_right_neighbor(
        &mut self,
        nb: Option<TrapIx>,
        old: TrapIx,
        upper: TrapIx,
        lower: TrapIx,
        s: &Segment,
    ) {
        let Some(nb) = nb else { return };
        let wall_x = self.trap(nb).left_p.x;
        let top = self.trap(nb).top;
        let bottom = self.trap(nb).bottom;
        let t = self.trap_mut(nb);
        if t.upper_left == Some(old) {
            t.upper_left =
                Some(if s.cmp_y_at(&top, wall_x) == Ordering::Less { upper } else { lower });
        }
        if t.lower_left == Some(old) {
            t.lower_left =
                Some(if s.cmp_y_at(&bottom, wall_x) == Ordering::Greater { lower } else { upper });
        }
    }
}

fn shares_endpoint_at(s: &Segment, boundary: &Segment, x: Coord) -> bool {
    (x == s.p().x && boundary.has_endpoint(s.p()))
        || (x == s.q().x && boundary.has_endpoint(s.q()))
}

/// The input point closest to a violation found at abscissa `x`; used to
/// report where a crossing was detected.
fn nearest_input_point(s: &Segment, t: &Trapezoid, x: Coord) -> Point {
    if x == s.p().x {
        s.p()
    } else if x == s.q().x {
        s.q()
    } else if x == t.left_p.x {
        t.left_p
    } else {
        t.right_p
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use assertables::{assert_all, assert_len_eq_x};
    use test_case::test_case;

    use super::*;
    use crate::math::{QueryPoint, Rect};

    fn unit_box() -> Rect {
        Rect::new(Point::new(0, 0), Point::new(100, 100)).unwrap()
    }

    fn seg(x1: Coord, y1: Coord, x2: Coord, y2: Coord) -> Segment {
        Segment::new(Point::new(x1, y1), Point::new(x2, y2)).unwrap()
    }

    fn map_with(segs: &[Segment]) -> TrapezoidalMap {
        let mut map = TrapezoidalMap::new(unit_box());
        for s in segs {
            map.insert(*s).unwrap();
        }
        map.validate().unwrap();
        map
    }

    #[test]
    fn one_segment_splits_the_rectangle_into_four() {
        let horizontal = seg(10, 50, 90, 50);
        let map = map_with(&[horizontal]);
        assert_len_eq_x!(map.live_trapezoids(), 4);

        let upper = map.locate(QueryPoint::new(50.0, 75.0));
        let lower = map.locate(QueryPoint::new(50.0, 25.0));
        let left = map.locate(QueryPoint::new(5.0, 50.0));
        let right = map.locate(QueryPoint::new(95.0, 50.0));
        let distinct: HashSet<_> = [upper, lower, left, right].into();
        assert_len_eq_x!(distinct, 4);

        assert_eq!(map.trapezoid(upper).bottom(), &horizontal);
        assert_eq!(map.trapezoid(lower).top(), &horizontal);
        assert_eq!(map.trapezoid(left).right_p(), Point::new(10, 50));
        assert_eq!(map.trapezoid(right).left_p(), Point::new(90, 50));
    }

    #[test]
    fn query_tie_breaks_route_left_and_above() {
        let map = map_with(&[seg(10, 50, 90, 50)]);
        let upper = map.locate(QueryPoint::new(50.0, 75.0));
        let left = map.locate(QueryPoint::new(5.0, 50.0));

        // Exactly on the segment: above wins.
        assert_eq!(map.locate(QueryPoint::new(50.0, 50.0)), upper);
        // Exactly on an endpoint's vertical: left wins.
        assert_eq!(map.locate(QueryPoint::new(10.0, 75.0)), left);
    }

    #[test_case(seg(0, 50, 90, 50) ; "endpoint on the left wall")]
    #[test_case(seg(10, 50, 90, 100) ; "endpoint on the top wall")]
    #[test_case(seg(-5, 50, 90, 50) ; "endpoint outside")]
    fn out_of_bounds_endpoints_are_refused(s: Segment) {
        let mut map = TrapezoidalMap::new(unit_box());
        assert!(matches!(map.insert(s).unwrap_err(), InsertError::OutOfBounds(_)));
        assert_len_eq_x!(map.live_trapezoids(), 1);
    }

    #[test]
    fn crossing_segment_is_refused_and_the_map_is_unchanged() {
        let mut map = map_with(&[seg(20, 50, 80, 50)]);
        let traps_before = map.live_trapezoids();
        let nodes_before = map.dag().len();

        let err = map.insert(seg(40, 20, 60, 80)).unwrap_err();
        assert!(matches!(err, InsertError::Crossing(_)));
        assert_eq!(map.live_trapezoids(), traps_before);
        assert_eq!(map.dag().len(), nodes_before);
        assert_len_eq_x!(map.segments(), 1);

        // The non-crossing replacement lies entirely inside the upper slab.
        map.insert(seg(40, 60, 60, 80)).unwrap();
        map.validate().unwrap();
        assert_len_eq_x!(map.live_trapezoids(), 7);
    }

    #[test_case(seg(50, 50, 70, 90) ; "left endpoint in the interior")]
    #[test_case(seg(30, 90, 50, 50) ; "right endpoint in the interior")]
    fn t_junctions_are_refused(s: Segment) {
        let mut map = map_with(&[seg(20, 50, 80, 50)]);
        assert!(matches!(map.insert(s).unwrap_err(), InsertError::Crossing(_)));
        map.validate().unwrap();
        assert_len_eq_x!(map.live_trapezoids(), 4);
    }

    #[test]
    fn overlapping_collinear_segments_are_refused() {
        let mut map = map_with(&[seg(20, 50, 50, 50)]);
        let err = map.insert(seg(20, 50, 80, 50)).unwrap_err();
        assert!(matches!(err, InsertError::Crossing(_)));
    }

    #[test]
    fn collinear_continuation_is_accepted() {
        let mut map = map_with(&[seg(20, 50, 50, 50)]);
        map.insert(seg(50, 50, 80, 50)).unwrap();
        map.validate().unwrap();
        // The shared endpoint is not registered twice.
        assert_eq!(map.points().len(), 3);
    }

    #[test]
    fn long_segment_merges_pieces_across_slabs() {
        let shorts = [seg(20, 40, 30, 60), seg(40, 40, 50, 60), seg(60, 40, 70, 60)];
        let mut map = map_with(&shorts);
        assert_len_eq_x!(map.live_trapezoids(), 10);

        let horizontal = seg(10, 30, 90, 30);
        map.insert(horizontal).unwrap();
        map.validate().unwrap();

        // 7 crossed trapezoids become 8 pieces plus the two end caps.
        let live = map.live_trapezoids();
        assert_len_eq_x!(live.clone(), 13);
        let below: Vec<_> =
            live.iter().filter(|&&t| map.trapezoid(t).top() == &horizontal).collect();
        let above: Vec<_> =
            live.iter().filter(|&&t| map.trapezoid(t).bottom() == &horizontal).collect();
        // Everything below the long segment merges into a single piece.
        assert_len_eq_x!(below.clone(), 1);
        assert_len_eq_x!(above, 7);

        let merged = *below[0];
        assert_eq!(map.trapezoid(merged).left_p(), Point::new(10, 30));
        assert_eq!(map.trapezoid(merged).right_p(), Point::new(90, 30));
    }

    #[test]
    fn crossing_through_the_short_segments_is_refused() {
        let shorts = [seg(20, 40, 30, 60), seg(40, 40, 50, 60), seg(60, 40, 70, 60)];
        let mut map = map_with(&shorts);
        // At y = 50 the long horizontal intersects every short segment.
        let err = map.insert(seg(10, 50, 90, 50)).unwrap_err();
        assert!(matches!(err, InsertError::Crossing(_)));
        map.validate().unwrap();
        assert_len_eq_x!(map.live_trapezoids(), 10);
    }

    #[test]
    fn shared_endpoint_reuses_the_canonical_x_node() {
        let mut map = map_with(&[seg(20, 50, 50, 50)]);
        map.insert(seg(50, 50, 80, 70)).unwrap();
        map.validate().unwrap();

        // The shared point keeps its first name and appears once.
        let shared = Point::new(50, 50);
        assert_eq!(map.points().name_of(shared).unwrap().to_string(), "Q1");
        assert_eq!(map.points().len(), 3);

        // No shadow x-node was created for the second insertion.
        let x_nodes_at_shared = map
            .dag()
            .reachable()
            .into_iter()
            .filter(|&ix| matches!(map.dag().get(ix), Node::X { point, .. } if point == shared))
            .count();
        assert_eq!(x_nodes_at_shared, 1);
    }

    #[test]
    fn two_segments_fanning_from_one_endpoint() {
        let mut map = map_with(&[seg(20, 50, 80, 50)]);
        map.insert(seg(20, 50, 60, 80)).unwrap();
        map.validate().unwrap();

        assert_eq!(map.points().name_of(Point::new(20, 50)).unwrap().to_string(), "P1");
        let between = map.locate(QueryPoint::new(40.0, 60.0));
        let t = map.trapezoid(between);
        assert_eq!(t.top(), &seg(20, 50, 60, 80));
        assert_eq!(t.bottom(), &seg(20, 50, 80, 50));
    }

    #[test]
    fn arrangement_is_insertion_order_independent() {
        let segs =
            [seg(20, 40, 30, 60), seg(40, 40, 50, 60), seg(60, 40, 70, 60), seg(10, 30, 90, 30)];
        let forward = map_with(&segs);
        let mut reversed = segs;
        reversed.reverse();
        let backward = map_with(&reversed);

        let probes: Vec<QueryPoint> = (0..10)
            .flat_map(|i| {
                [10, 35, 55, 90]
                    .into_iter()
                    .map(move |y| QueryPoint::new(5.0 + 10.0 * i as f64, y as f64))
            })
            .collect();
        assert_all!(probes.iter(), |pt: &QueryPoint| {
            let a = forward.trapezoid(forward.locate(*pt));
            let b = backward.trapezoid(backward.locate(*pt));
            a.contains_query(*pt)
                && (a.left_p(), a.right_p(), a.top(), a.bottom())
                    == (b.left_p(), b.right_p(), b.top(), b.bottom())
        });
    }

    #[test]
    fn crossed_walls_are_truncated_at_the_new_segment() {
        // A diagonal passing above an existing low segment. The walls through
        // the low segment's endpoints used to reach the top of the rectangle;
        // after the insertion their upward bullets stop at the diagonal, so
        // the whole region above it is one merged trapezoid.
        let diagonal = seg(10, 10, 90, 60);
        let mut map = map_with(&[seg(30, 20, 70, 20)]);
        map.insert(diagonal).unwrap();
        map.validate().unwrap();

        // Chain of 3 becomes 4 pieces plus two end caps.
        assert_len_eq_x!(map.live_trapezoids(), 7);
        let above = map.locate(QueryPoint::new(50.0, 50.0));
        let t = map.trapezoid(above);
        assert_eq!(t.bottom(), &diagonal);
        assert_eq!(t.left_p(), Point::new(10, 10));
        assert_eq!(t.right_p(), Point::new(90, 60));
    }
}
