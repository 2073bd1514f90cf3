//! Slices: single arcing cuts with bounded radial engagement.
//!
//! A slice is the arc a cutter sweeps around an inscribed circle. Its
//! engagement is measured against previously cut material: first as the
//! radial overshoot beyond the parent ball, then refined by subtracting
//! every other finished ball that already covers part of the sweep.

use pocketkit_core::{arc::angle_norm, Arc, Bounds, Point, RotationDir};
use std::f64::consts::TAU;

/// An inscribed circle: the disc a slice clears.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub center: Point,
    pub radius: f64,
}

impl Ball {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, p: Point, tol: f64) -> bool {
        self.center.distance_to(&p) <= self.radius + tol
    }

    /// Positive gap between two ball hulls; negative when they overlap or
    /// one contains the other.
    pub fn distance_to(&self, other: &Ball) -> f64 {
        self.center.distance_to(&other.center) - self.radius - other.radius
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }
}

/// A partial annular cut along the medial axis.
#[derive(Debug, Clone)]
pub struct Slice {
    pub ball: Ball,
    /// Predecessor in the cut tree; None only for the root slice.
    pub parent: Option<usize>,
    /// Cutting arcs in travel order; more than one after refinement.
    pub segments: Vec<Arc>,
    /// Peak radial engagement against previously cut material.
    pub max_engagement: f64,
    /// Signed ball-to-ball distance to the parent.
    pub dist: f64,
}

impl Slice {
    /// Full-circle root slice.
    pub fn root(center: Point, radius: f64, dir: RotationDir) -> Self {
        Self {
            ball: Ball::new(center, radius),
            parent: None,
            segments: vec![Arc::full_circle(center, radius, 0.0, dir)],
            max_engagement: 0.0,
            dist: 0.0,
        }
    }

    /// Tentative slice against the parent ball only.
    ///
    /// The cut arc spans the part of the new circle outside the parent,
    /// swept in `dir`; engagement is the radial overshoot `d + r - rp`.
    /// Non-intersecting balls leave the slice empty with engagement 0.
    pub fn tentative(
        parent: usize,
        parent_ball: &Ball,
        center: Point,
        radius: f64,
        dir: RotationDir,
    ) -> Self {
        let d = parent_ball.center.distance_to(&center);
        let rp = parent_ball.radius;
        let mut slice = Self {
            ball: Ball::new(center, radius),
            parent: Some(parent),
            segments: Vec::new(),
            max_engagement: 0.0,
            dist: d - radius - rp,
        };

        if d < f64::EPSILON || d >= rp + radius || d <= (rp - radius).abs() {
            return slice;
        }

        // Circle-circle intersection.
        let a = (d * d + rp * rp - radius * radius) / (2.0 * d);
        let h2 = rp * rp - a * a;
        if h2 <= 0.0 {
            return slice;
        }
        let h = h2.sqrt();
        let axis = (center - parent_ball.center) * (1.0 / d);
        let base = parent_ball.center + axis * a;
        let off = axis.left_normal() * h;
        let (i1, i2) = (base + off, base - off);

        let mut arc = Arc::from_center_endpoints(center, i1, i2, dir);
        if parent_ball.contains(arc.point_at(0.5), 0.0) {
            arc = Arc::from_center_endpoints(center, i2, i1, dir);
        }
        slice.segments = vec![arc];
        slice.max_engagement = d + radius - rp;
        slice
    }

    /// Tool entry point of the cut.
    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(|a| a.start_point())
    }

    /// Tool exit point of the cut.
    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(|a| a.end_point())
    }

    /// Rotation direction of the cut.
    pub fn dir(&self) -> RotationDir {
        self.segments
            .first()
            .map(|a| a.dir())
            .unwrap_or(RotationDir::Cw)
    }

    /// Subtracts `colliders` (finished nearby balls) from the sweep, splits
    /// it into surviving sub-arcs and re-derives the peak engagement
    /// against the whole prior-ball union. A slice split into several
    /// segments gets its engagement derated by `derating_k`; a fully
    /// covered slice reports engagement 0.
    pub fn refine(&mut self, parent_ball: &Ball, colliders: &[Ball], derating_k: f64) {
        let Some(&arc) = self.segments.first() else {
            return;
        };
        let c = self.ball.center;
        let r = self.ball.radius;
        let total = arc.sweep.abs();

        let mut covered: Vec<(f64, f64)> = Vec::new();
        for ball in colliders {
            let dd = c.distance_to(&ball.center);
            if dd >= r + ball.radius {
                continue;
            }
            if ball.radius >= dd + r {
                // The whole circle was cut before we got here.
                self.segments.clear();
                self.max_engagement = 0.0;
                return;
            }
            if dd < f64::EPSILON {
                continue;
            }
            let cos_half = (dd * dd + r * r - ball.radius * ball.radius) / (2.0 * dd * r);
            if cos_half >= 1.0 {
                continue;
            }
            let half = cos_half.clamp(-1.0, 1.0).acos();
            let u_mid = angle_to_sweep_param(&arc, (ball.center - c).angle());
            push_wrapped(&mut covered, u_mid - half, u_mid + half, total);
        }

        let survivors = subtract_intervals(total, &mut covered);
        if survivors.is_empty() {
            self.segments.clear();
            self.max_engagement = 0.0;
            return;
        }

        let sign = if arc.sweep >= 0.0 { 1.0 } else { -1.0 };
        self.segments = survivors
            .iter()
            .map(|&(u0, u1)| {
                Arc::new(c, r, arc.start_angle + sign * u0, sign * (u1 - u0))
            })
            .collect();

        self.max_engagement = self.sampled_engagement(parent_ball, colliders);
        if self.segments.len() > 1 {
            self.max_engagement *= derating_k;
        }
    }

    /// Peak engagement over the surviving sweep, sampled against the union
    /// of the parent ball and the colliders.
    fn sampled_engagement(&self, parent_ball: &Ball, colliders: &[Ball]) -> f64 {
        let mut peak: f64 = 0.0;
        for arc in &self.segments {
            let n = ((arc.sweep.abs() / (TAU / 180.0)).ceil() as usize).max(2);
            for i in 0..=n {
                let p = arc.point_at(i as f64 / n as f64);
                let mut clearance = p.distance_to(&parent_ball.center) - parent_ball.radius;
                for b in colliders {
                    clearance = clearance.min(p.distance_to(&b.center) - b.radius);
                }
                peak = peak.max(clearance);
            }
        }
        peak
    }
}

/// Angle -> travel parameter on `arc`'s circle, in `[0, 2*pi)` measured
/// along the arc's direction from its start.
fn angle_to_sweep_param(arc: &Arc, angle: f64) -> f64 {
    if arc.sweep >= 0.0 {
        angle_norm(angle - arc.start_angle)
    } else {
        angle_norm(arc.start_angle - angle)
    }
}

/// Records the wrapped interval `[lo, hi]` (circle parameter space)
/// clipped to the sweep `[0, total]`.
fn push_wrapped(covered: &mut Vec<(f64, f64)>, lo: f64, hi: f64, total: f64) {
    let width = hi - lo;
    if width <= 0.0 {
        return;
    }
    let start = lo.rem_euclid(TAU);
    let pieces = if start + width <= TAU {
        vec![(start, start + width)]
    } else {
        vec![(start, TAU), (0.0, start + width - TAU)]
    };
    for (a, b) in pieces {
        let a = a.max(0.0);
        let b = b.min(total);
        if b - a > 1e-12 {
            covered.push((a, b));
        }
    }
}

/// Complement of the merged `covered` intervals within `[0, total]`.
fn subtract_intervals(total: f64, covered: &mut Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    covered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let mut survivors = Vec::new();
    let mut cursor = 0.0;
    for &(a, b) in covered.iter() {
        if a > cursor + 1e-12 {
            survivors.push((cursor, a));
        }
        cursor = cursor.max(b);
    }
    if total > cursor + 1e-12 {
        survivors.push((cursor, total));
    }
    survivors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tentative_engagement_matches_overshoot() {
        let parent = Ball::new(Point::new(0.0, 0.0), 3.0);
        let s = Slice::tentative(0, &parent, Point::new(2.0, 0.0), 2.5, RotationDir::Cw);
        // d + r - rp = 2 + 2.5 - 3
        assert!((s.max_engagement - 1.5).abs() < 1e-12);
        assert!(s.dist < 0.0);
        assert_eq!(s.segments.len(), 1);
    }

    #[test]
    fn test_tentative_disjoint_and_contained() {
        let parent = Ball::new(Point::new(0.0, 0.0), 3.0);
        let far = Slice::tentative(0, &parent, Point::new(10.0, 0.0), 2.0, RotationDir::Cw);
        assert_eq!(far.max_engagement, 0.0);
        assert!(far.dist > 0.0);
        assert!(far.segments.is_empty());

        let inside = Slice::tentative(0, &parent, Point::new(0.5, 0.0), 1.0, RotationDir::Cw);
        assert_eq!(inside.max_engagement, 0.0);
        assert!(inside.dist < 0.0);
    }

    #[test]
    fn test_cut_arc_lies_outside_parent() {
        let parent = Ball::new(Point::new(0.0, 0.0), 3.0);
        let s = Slice::tentative(0, &parent, Point::new(2.0, 0.0), 2.5, RotationDir::Ccw);
        let arc = s.segments[0];
        for i in 1..10 {
            let p = arc.point_at(i as f64 / 10.0);
            assert!(
                p.distance_to(&parent.center) >= parent.radius - 1e-6,
                "cut point {:?} strays inside the parent ball",
                p
            );
        }
    }

    #[test]
    fn test_refine_without_colliders_keeps_single_arc() {
        let parent = Ball::new(Point::new(0.0, 0.0), 3.0);
        let mut s = Slice::tentative(0, &parent, Point::new(2.0, 0.0), 2.5, RotationDir::Cw);
        let before = s.max_engagement;
        s.refine(&parent, &[], 0.5);
        assert_eq!(s.segments.len(), 1);
        assert!((s.max_engagement - before).abs() < 1e-3);
    }

    #[test]
    fn test_refine_splits_and_derates() {
        let parent = Ball::new(Point::new(0.0, 0.0), 3.0);
        let mut s = Slice::tentative(0, &parent, Point::new(2.0, 0.0), 2.5, RotationDir::Cw);
        // A collider sitting right on the far side of the new circle cuts
        // the sweep in two.
        let collider = Ball::new(Point::new(4.5, 0.0), 1.0);
        s.refine(&parent, &[collider], 0.5);
        assert!(s.segments.len() > 1);
        // Split cut engages gentler than the raw overshoot.
        assert!(s.max_engagement < 1.5);
    }

    #[test]
    fn test_refine_fully_covered_reports_zero() {
        let parent = Ball::new(Point::new(0.0, 0.0), 3.0);
        let mut s = Slice::tentative(0, &parent, Point::new(2.0, 0.0), 2.5, RotationDir::Cw);
        let blanket = Ball::new(Point::new(2.0, 0.0), 10.0);
        s.refine(&parent, &[blanket], 0.5);
        assert_eq!(s.max_engagement, 0.0);
        assert!(s.segments.is_empty());
    }

    #[test]
    fn test_interval_subtraction() {
        let mut covered = vec![(1.0, 2.0), (0.2, 0.6)];
        let survivors = subtract_intervals(3.0, &mut covered);
        assert_eq!(survivors.len(), 3);
        assert!((survivors[0].0 - 0.0).abs() < 1e-12 && (survivors[0].1 - 0.2).abs() < 1e-12);
        assert!((survivors[1].0 - 0.6).abs() < 1e-12 && (survivors[1].1 - 1.0).abs() < 1e-12);
        assert!((survivors[2].0 - 2.0).abs() < 1e-12 && (survivors[2].1 - 3.0).abs() < 1e-12);
    }
}
