//! Medial tree construction.
//!
//! Filtered MAT segments are pooled by quantised endpoint, then grown
//! greedily into a rooted tree of corridor branches. Branches live in an
//! arena and reference each other by index; pruned subtrees are simply
//! unlinked and never visited again.

use crate::params::ClearingParams;
use crate::path::PathItem;
use crate::region::Region;
use pocketkit_core::Point;
use std::collections::HashMap;
use tracing::warn;

/// One corridor of the medial tree.
#[derive(Debug)]
pub struct Branch {
    /// Polyline of medial points, start to end.
    pub curve: Vec<Point>,
    /// Cumulative arc length per curve point.
    cum_len: Vec<f64>,
    pub parent: Option<usize>,
    /// Children ordered by ascending subtree curve length.
    pub children: Vec<usize>,
    /// Slice ids placed along the curve, in cut order.
    pub slices: Vec<usize>,
    /// Connector leading into the first slice (non-root branches only).
    pub entry: Option<PathItem>,
    /// Total curve length of this branch and everything below it.
    pub deep_dist: f64,
}

impl Branch {
    fn seeded(curve: Vec<Point>, parent: Option<usize>) -> Self {
        Self {
            curve,
            cum_len: Vec::new(),
            parent,
            children: Vec::new(),
            slices: Vec::new(),
            entry: None,
            deep_dist: 0.0,
        }
    }

    pub fn start(&self) -> Point {
        self.curve[0]
    }

    pub fn end(&self) -> Point {
        *self.curve.last().unwrap()
    }

    pub fn length(&self) -> f64 {
        self.cum_len.last().copied().unwrap_or(0.0)
    }

    /// Point at normalized arc-length parameter `u` in `[0, 1]`.
    pub fn point_at(&self, u: f64) -> Point {
        let total = self.length();
        if total <= 0.0 || self.curve.len() < 2 {
            return self.curve[0];
        }
        let target = u.clamp(0.0, 1.0) * total;
        let i = match self
            .cum_len
            .binary_search_by(|l| l.partial_cmp(&target).unwrap())
        {
            Ok(i) => i,
            Err(i) => i,
        };
        if i == 0 {
            return self.curve[0];
        }
        if i >= self.curve.len() {
            return self.end();
        }
        let seg_len = self.cum_len[i] - self.cum_len[i - 1];
        if seg_len <= 0.0 {
            return self.curve[i];
        }
        let t = (target - self.cum_len[i - 1]) / seg_len;
        self.curve[i - 1].lerp(self.curve[i], t)
    }

    fn rebuild_cum_len(&mut self) {
        self.cum_len.clear();
        let mut acc = 0.0;
        self.cum_len.push(0.0);
        for w in self.curve.windows(2) {
            acc += w[0].distance_to(&w[1]);
            self.cum_len.push(acc);
        }
    }
}

/// The rooted tree of medial corridors.
#[derive(Debug)]
pub struct MedialTree {
    pub branches: Vec<Branch>,
    pub root: usize,
}

impl MedialTree {
    /// Branch ids in depth-first cut order (children short-first).
    pub fn traversal_order(&self) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            // Reverse so the shortest child is popped first.
            for &c in self.branches[id].children.iter().rev() {
                stack.push(c);
            }
        }
        order
    }
}

#[derive(Debug, Clone, Copy)]
struct PoolEntry {
    seg: usize,
    /// Which endpoint of the segment is registered here.
    far_is_b: bool,
}

/// Pool of MAT segments keyed by quantised endpoint coordinates.
///
/// An endpoint is registered only when it clears the passability
/// threshold; sealed endpoints leave their segment unreachable from that
/// side.
pub struct SegmentPool {
    segs: Vec<(Point, Point)>,
    alive: Vec<bool>,
    map: HashMap<(i64, i64), Vec<PoolEntry>>,
    cell: f64,
    /// Registered endpoints with their inscribed-circle radii.
    endpoints: Vec<(Point, f64)>,
}

impl SegmentPool {
    pub fn new(segments: &[(Point, Point)], region: &Region, params: &ClearingParams) -> Self {
        let min_mic = params.min_passable_mic();
        let cell = params.general_tolerance;
        let mut pool = Self {
            segs: segments.to_vec(),
            alive: vec![true; segments.len()],
            map: HashMap::new(),
            cell,
            endpoints: Vec::new(),
        };
        for (i, (a, b)) in segments.iter().enumerate() {
            for (p, far_is_b) in [(*a, true), (*b, false)] {
                let mic = region.mic_radius(p);
                if mic >= min_mic {
                    pool.map
                        .entry(pool_key(p, cell))
                        .or_default()
                        .push(PoolEntry { seg: i, far_is_b });
                    pool.endpoints.push((p, mic));
                }
            }
        }
        pool
    }

    /// Registered (passable) endpoints with their MIC radii.
    pub fn endpoints(&self) -> &[(Point, f64)] {
        &self.endpoints
    }

    /// Removes every live segment incident to `p` from the pool and
    /// returns their far endpoints, ordered by segment id.
    pub fn pull_follow_points(&mut self, p: Point) -> Vec<Point> {
        let (kx, ky) = pool_key(p, self.cell);
        let mut pulled: Vec<(usize, Point)> = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(entries) = self.map.get(&(kx + dx, ky + dy)) else {
                    continue;
                };
                for e in entries {
                    if !self.alive[e.seg] {
                        continue;
                    }
                    let (a, b) = self.segs[e.seg];
                    let (near, far) = if e.far_is_b { (a, b) } else { (b, a) };
                    if near.nearly_equals(p, self.cell) {
                        pulled.push((e.seg, far));
                    }
                }
            }
        }
        pulled.sort_by_key(|(seg, _)| *seg);
        pulled.dedup_by_key(|(seg, _)| *seg);
        for (seg, _) in &pulled {
            self.alive[*seg] = false;
        }
        pulled.into_iter().map(|(_, far)| far).collect()
    }
}

fn pool_key(p: Point, cell: f64) -> (i64, i64) {
    ((p.x / cell).round() as i64, (p.y / cell).round() as i64)
}

/// Connects filtered MAT segments into a rooted tree.
///
/// Returns None when no admissible root exists (empty MAT, unusable
/// start point, or nothing passable).
pub fn build_tree(
    segments: &[(Point, Point)],
    region: &Region,
    params: &ClearingParams,
) -> Option<MedialTree> {
    if segments.is_empty() {
        warn!("no medial axis segments inside the pocket");
        return None;
    }
    let mut pool = SegmentPool::new(segments, region, params);
    if pool.endpoints().is_empty() {
        warn!("every medial corridor is below the passable width");
        return None;
    }

    let seed = match params.startpoint {
        Some(sp) => {
            if !region.contains(sp) {
                warn!("startpoint is outside the pocket");
                return None;
            }
            if region.mic_radius(sp) < params.min_passable_mic() {
                warn!("startpoint sits in an impassably narrow channel");
                return None;
            }
            let mut candidates: Vec<(f64, Point)> = pool
                .endpoints()
                .iter()
                .map(|(p, _)| (sp.distance_to(p), *p))
                .collect();
            candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            let reachable = candidates
                .iter()
                .find(|(_, p)| !region.segment_crosses_boundary(sp, *p));
            match reachable {
                Some((_, p)) => vec![sp, *p],
                None => {
                    warn!("startpoint cannot reach the medial axis in a straight cut");
                    return None;
                }
            }
        }
        None => {
            // Deepest pocket point: passable endpoint of maximum MIC.
            let best = pool
                .endpoints()
                .iter()
                .enumerate()
                .max_by(|(ia, (_, ra)), (ib, (_, rb))| {
                    ra.partial_cmp(rb)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then(ib.cmp(ia))
                })
                .map(|(_, (p, _))| *p)?;
            vec![best]
        }
    };

    let mut branches = vec![Branch::seeded(seed, None)];
    grow(&mut branches, 0, &mut pool);

    if branches[0].curve.len() < 2 && branches[0].children.is_empty() {
        warn!("medial axis has no traversable corridors from the root");
        return None;
    }

    finalize(&mut branches, 0, params.general_tolerance);
    Some(MedialTree { branches, root: 0 })
}

/// Greedy growth: linear continuations extend the current curve, forks
/// spawn one child per follower.
fn grow(branches: &mut Vec<Branch>, id: usize, pool: &mut SegmentPool) {
    loop {
        let end = branches[id].end();
        let mut followers = pool.pull_follow_points(end);
        match followers.len() {
            0 => break,
            1 => {
                branches[id].curve.push(followers.pop().unwrap());
            }
            _ => {
                for f in followers {
                    branches.push(Branch::seeded(vec![end, f], Some(id)));
                    let child = branches.len() - 1;
                    branches[id].children.push(child);
                    grow(branches, child, pool);
                }
                break;
            }
        }
    }
}

/// Bottom-up pass: prunes dust subtrees, sorts children short-first and
/// fills in cumulative lengths and deep distances.
fn finalize(branches: &mut Vec<Branch>, id: usize, tol: f64) -> f64 {
    let children = branches[id].children.clone();
    let mut kept: Vec<(usize, f64)> = Vec::new();
    for c in children {
        let dd = finalize(branches, c, tol);
        if dd > tol {
            kept.push((c, dd));
        }
    }
    kept.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    branches[id].children = kept.iter().map(|(c, _)| *c).collect();
    branches[id].rebuild_cum_len();
    let deep = branches[id].length() + kept.iter().map(|(_, dd)| dd).sum::<f64>();
    branches[id].deep_dist = deep;
    deep
}
