//! Connectors: branch switching over already-cut material.
//!
//! Moves between slices must stay inside the union of finished slice
//! balls. Parent-to-child handovers get a smooth biarc chord; everything
//! else is routed through ancestor ball centres via the least common
//! ancestor of the two slices, shortcutting straight to the target as
//! soon as the direct segment is provably covered.

use crate::slice::{Ball, Slice};
use pocketkit_core::{ArcOrLine, Biarc, Bounds, Point, RotationDir, SpatialIndex};
use std::collections::HashMap;

/// Finished slices plus the spatial index over their balls.
pub struct SliceStore {
    pub slices: Vec<Slice>,
    index: SpatialIndex,
}

impl SliceStore {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            slices: Vec::new(),
            index: SpatialIndex::new(bounds, 8, 8),
        }
    }

    /// Adds a finished slice to the arena and the ready index.
    pub fn insert(&mut self, slice: Slice) -> usize {
        let id = self.slices.len();
        self.index.insert(id, &slice.ball.bounds());
        self.slices.push(slice);
        id
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Balls of finished slices near `ball`, id order, `exclude` omitted.
    pub fn colliders_near(&self, ball: &Ball, exclude: usize) -> Vec<Ball> {
        let mut ids = self.index.query(&ball.bounds());
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter()
            .filter(|&i| i != exclude)
            .map(|i| self.slices[i].ball)
            .collect()
    }

    /// Balls whose boxes meet the segment `a`..`b`.
    fn balls_along(&self, a: Point, b: Point) -> Vec<Ball> {
        let rect = Bounds::new(
            a.x.min(b.x),
            a.y.min(b.y),
            a.x.max(b.x),
            a.y.max(b.y),
        );
        let mut ids = self.index.query(&rect);
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter().map(|i| self.slices[i].ball).collect()
    }
}

/// Decides whether the straight segment `a`..`b` stays inside the union
/// of the collider balls.
pub fn may_shortcut(a: Point, b: Point, colliders: &[Ball], tol: f64) -> bool {
    // One ball swallowing both endpoints settles it.
    for ball in colliders {
        if ball.contains(a, tol) && ball.contains(b, tol) {
            return true;
        }
    }

    let ab = b - a;
    let len = ab.length();
    if len < tol {
        return !colliders.is_empty() && colliders.iter().any(|c| c.contains(a, tol));
    }
    let u = ab * (1.0 / len);

    // Ray/ball crossings keyed by distance from `a`; each crossing toggles
    // that ball's membership in the running inside-set.
    let mut events: Vec<(f64, usize)> = Vec::new();
    let mut inside = vec![false; colliders.len()];
    let mut inside_count = 0usize;
    for (i, ball) in colliders.iter().enumerate() {
        if ball.contains(a, tol) {
            inside[i] = true;
            inside_count += 1;
        }
        let f = a - ball.center;
        let qb = 2.0 * f.dot(u);
        let qc = f.dot(f) - ball.radius * ball.radius;
        let disc = qb * qb - 4.0 * qc;
        if disc <= 0.0 {
            continue;
        }
        let sq = disc.sqrt();
        for s in [(-qb - sq) / 2.0, (-qb + sq) / 2.0] {
            if s > tol && s < len - tol {
                events.push((s, i));
            }
        }
    }

    if inside_count == 0 {
        return false;
    }

    events.sort_by(|x, y| {
        x.0.partial_cmp(&y.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(x.1.cmp(&y.1))
    });

    // Coincident crossings (within tol) toggle together before the
    // emptiness check, so the verdict is independent of collider order.
    let mut k = 0;
    while k < events.len() {
        let here = events[k].0;
        while k < events.len() && events[k].0 - here <= tol {
            let i = events[k].1;
            if inside[i] {
                inside[i] = false;
                inside_count -= 1;
            } else {
                inside[i] = true;
                inside_count += 1;
            }
            k += 1;
        }
        if inside_count == 0 && here < len - tol {
            return false;
        }
    }
    true
}

/// Index-backed overload: fetches candidate balls around the segment
/// before running the sweep.
pub fn may_shortcut_indexed(a: Point, b: Point, store: &SliceStore, tol: f64) -> bool {
    may_shortcut(a, b, &store.balls_along(a, b), tol)
}

/// Tangent of the cutting motion where a slice meets `p` on its ball.
fn slice_tangent_at(slice: &Slice, p: Point) -> Point {
    let normal = (p - slice.ball.center).unit();
    match slice.dir() {
        RotationDir::Ccw => normal.left_normal(),
        RotationDir::Cw => -normal.left_normal(),
    }
}

/// Smooth biarc chord between two slices' hand-over points.
pub fn smooth_chord(src: &Slice, src_pt: Point, dst: &Slice, dst_pt: Point) -> Vec<ArcOrLine> {
    let biarc = Biarc::new(
        src_pt,
        slice_tangent_at(src, src_pt),
        dst_pt,
        slice_tangent_at(dst, dst_pt),
    );
    vec![biarc.first, biarc.second]
}

/// Routes the cutter from slice `src` to the (possibly not yet stored)
/// slice `dst`.
///
/// `dst_anchor` is dst's nearest stored relative: its parent for a fresh
/// slice, or its own id when dst itself is stored (return to base).
/// Point overrides default to `src.End` and `dst.Start`.
pub fn switch_branch(
    store: &SliceStore,
    src: usize,
    dst: &Slice,
    dst_anchor: Option<usize>,
    dst_in_store: Option<usize>,
    src_pt: Option<Point>,
    dst_pt: Option<Point>,
    tol: f64,
) -> Vec<ArcOrLine> {
    let src_slice = &store.slices[src];
    let from = src_pt
        .or_else(|| src_slice.end())
        .unwrap_or(src_slice.ball.center);
    let to = dst_pt.or_else(|| dst.start()).unwrap_or(dst.ball.center);

    if dst.parent == Some(src) {
        return smooth_chord(src_slice, from, dst, to);
    }

    // Least common ancestor in the slice parent chain.
    let src_chain = ancestor_chain(store, Some(src));
    let dst_chain = ancestor_chain(store, dst_anchor);
    let dst_pos: HashMap<usize, usize> = dst_chain
        .iter()
        .enumerate()
        .map(|(pos, &id)| (id, pos))
        .collect();
    let lca = src_chain
        .iter()
        .enumerate()
        .find_map(|(ia, id)| dst_pos.get(id).map(|&ib| (ia, ib)));

    let mut route = vec![from];
    if let Some((ia, ib)) = lca {
        let mut mids: Vec<usize> = src_chain[1..=ia].to_vec();
        mids.extend(dst_chain[..ib].iter().rev());
        for mid in mids {
            if Some(mid) == dst_in_store {
                continue;
            }
            let here = *route.last().unwrap();
            if may_shortcut_indexed(here, to, store, tol) {
                break;
            }
            route.push(store.slices[mid].ball.center);
        }
    }
    route.push(to);

    route
        .windows(2)
        .filter(|w| w[0].distance_to(&w[1]) > tol)
        .map(|w| ArcOrLine::Line { p1: w[0], p2: w[1] })
        .collect()
}

/// Slice id followed by its ancestors up to the root.
fn ancestor_chain(store: &SliceStore, from: Option<usize>) -> Vec<usize> {
    let mut chain = Vec::new();
    let mut cur = from;
    while let Some(id) = cur {
        chain.push(id);
        cur = store.slices[id].parent;
    }
    chain
}
