//! Cubic spline sampling with arc-fit post-processing.
//!
//! Hosts hand boundaries over as Bezier or Hermite splines; the clearing
//! pipeline wants polylines and arcs. Sampling subdivides to a flatness
//! tolerance, and `fit_arcs` greedily replaces sample runs with arcs.

use crate::arc::{Arc, RotationDir};
use crate::biarc::ArcOrLine;
use crate::point::{point_segment_distance, Point};

const MAX_SUBDIV_DEPTH: u32 = 24;

/// Samples a cubic Bezier to a chordal flatness of `tol`.
pub fn sample_cubic_bezier(p0: Point, p1: Point, p2: Point, p3: Point, tol: f64) -> Vec<Point> {
    let mut out = vec![p0];
    subdivide(p0, p1, p2, p3, tol.max(f64::EPSILON), 0, &mut out);
    out
}

/// Samples a cubic Hermite span (endpoints + tangent vectors) to `tol`.
pub fn sample_hermite(p0: Point, m0: Point, p1: Point, m1: Point, tol: f64) -> Vec<Point> {
    sample_cubic_bezier(p0, p0 + m0 * (1.0 / 3.0), p1 - m1 * (1.0 / 3.0), p1, tol)
}

fn subdivide(p0: Point, p1: Point, p2: Point, p3: Point, tol: f64, depth: u32, out: &mut Vec<Point>) {
    let flat = point_segment_distance(p1, p0, p3).max(point_segment_distance(p2, p0, p3));
    if flat <= tol || depth >= MAX_SUBDIV_DEPTH {
        out.push(p3);
        return;
    }
    // de Casteljau split at t = 1/2
    let q0 = p0.lerp(p1, 0.5);
    let q1 = p1.lerp(p2, 0.5);
    let q2 = p2.lerp(p3, 0.5);
    let r0 = q0.lerp(q1, 0.5);
    let r1 = q1.lerp(q2, 0.5);
    let s = r0.lerp(r1, 0.5);
    subdivide(p0, q0, r0, s, tol, depth + 1, out);
    subdivide(s, r1, q2, p3, tol, depth + 1, out);
}

/// Greedily fits arcs (falling back to lines) over a point run so that
/// every sample stays within `tol` of the fitted primitive.
pub fn fit_arcs(points: &[Point], tol: f64) -> Vec<ArcOrLine> {
    let mut out = Vec::new();
    if points.len() < 2 {
        return out;
    }
    let mut i = 0;
    while i + 1 < points.len() {
        let mut best: Option<(usize, ArcOrLine)> = None;
        let mut j = i + 2;
        while j < points.len() {
            match fit_one(&points[i..=j], tol) {
                Some(prim) => {
                    best = Some((j, prim));
                    j += 1;
                }
                None => break,
            }
        }
        match best {
            Some((end, prim)) => {
                out.push(prim);
                i = end;
            }
            None => {
                out.push(ArcOrLine::Line {
                    p1: points[i],
                    p2: points[i + 1],
                });
                i += 1;
            }
        }
    }
    out
}

/// Fits one arc (or line) through `run`, or None when some sample strays
/// beyond `tol`.
fn fit_one(run: &[Point], tol: f64) -> Option<ArcOrLine> {
    let a = run[0];
    let b = run[run.len() / 2];
    let c = run[run.len() - 1];
    match circumcenter(a, b, c) {
        None => {
            // Collinear pivot points: accept as a line if the whole run agrees.
            for p in run {
                if point_segment_distance(*p, a, c) > tol {
                    return None;
                }
            }
            Some(ArcOrLine::Line { p1: a, p2: c })
        }
        Some(center) => {
            let radius = center.distance_to(&a);
            let dir = if (b - a).cross(c - b) > 0.0 {
                RotationDir::Ccw
            } else {
                RotationDir::Cw
            };
            let arc = Arc::from_center_endpoints(center, a, c, dir);
            for p in run {
                if (p.distance_to(&center) - radius).abs() > tol {
                    return None;
                }
                if !arc.contains_angle((*p - center).angle(), 1e-6) {
                    return None;
                }
            }
            Some(ArcOrLine::Arc(arc))
        }
    }
}

fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-12 {
        return None;
    }
    let a2 = a.dot(a);
    let b2 = b.dot(b);
    let c2 = c.dot(c);
    Some(Point::new(
        (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    ))
}
