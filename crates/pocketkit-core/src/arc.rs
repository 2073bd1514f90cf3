//! Circular arcs.
//!
//! Arcs are stored as centre, radius, start angle and a signed sweep:
//! positive sweeps run counter-clockwise, negative sweeps clockwise.

use crate::point::Point;
use crate::spatial_index::Bounds;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Rotation direction of an arc or cutting move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationDir {
    Cw,
    Ccw,
}

impl RotationDir {
    /// The opposite direction.
    pub fn reversed(self) -> RotationDir {
        match self {
            RotationDir::Cw => RotationDir::Ccw,
            RotationDir::Ccw => RotationDir::Cw,
        }
    }
}

/// Normalizes an angle into `[0, 2*pi)`.
pub fn angle_norm(a: f64) -> f64 {
    let r = a % TAU;
    if r < 0.0 {
        r + TAU
    } else {
        r
    }
}

/// A circular arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    /// Signed sweep in radians; positive is counter-clockwise.
    pub sweep: f64,
}

impl Arc {
    pub fn new(center: Point, radius: f64, start_angle: f64, sweep: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            sweep,
        }
    }

    /// Arc spanning from `start` to `end` around `center` in direction `dir`.
    ///
    /// Coincident endpoints produce a full circle.
    pub fn from_center_endpoints(center: Point, start: Point, end: Point, dir: RotationDir) -> Self {
        let radius = center.distance_to(&start);
        let a0 = (start - center).angle();
        let a1 = (end - center).angle();
        let ccw_delta = angle_norm(a1 - a0);
        let sweep = match dir {
            RotationDir::Ccw => {
                if ccw_delta < 1e-12 {
                    TAU
                } else {
                    ccw_delta
                }
            }
            RotationDir::Cw => {
                let cw_delta = angle_norm(a0 - a1);
                if cw_delta < 1e-12 {
                    -TAU
                } else {
                    -cw_delta
                }
            }
        };
        Self::new(center, radius, a0, sweep)
    }

    /// A full circle starting (and ending) at `start_angle`.
    pub fn full_circle(center: Point, radius: f64, start_angle: f64, dir: RotationDir) -> Self {
        let sweep = match dir {
            RotationDir::Ccw => TAU,
            RotationDir::Cw => -TAU,
        };
        Self::new(center, radius, start_angle, sweep)
    }

    pub fn dir(&self) -> RotationDir {
        if self.sweep >= 0.0 {
            RotationDir::Ccw
        } else {
            RotationDir::Cw
        }
    }

    /// Point on the arc at angle `angle` (not necessarily inside the sweep).
    pub fn point_at_angle(&self, angle: f64) -> Point {
        self.center + Point::new(angle.cos(), angle.sin()) * self.radius
    }

    /// Point at fraction `t` in `[0, 1]` along the sweep.
    pub fn point_at(&self, t: f64) -> Point {
        self.point_at_angle(self.start_angle + self.sweep * t)
    }

    pub fn start_point(&self) -> Point {
        self.point_at(0.0)
    }

    pub fn end_point(&self) -> Point {
        self.point_at(1.0)
    }

    /// Unit tangent at fraction `t`, pointing along the direction of travel.
    pub fn tangent_at(&self, t: f64) -> Point {
        let a = self.start_angle + self.sweep * t;
        let radial = Point::new(a.cos(), a.sin());
        if self.sweep >= 0.0 {
            radial.left_normal()
        } else {
            -radial.left_normal()
        }
    }

    pub fn length(&self) -> f64 {
        self.sweep.abs() * self.radius
    }

    /// True when `angle` falls inside the swept interval (inclusive, `tol` radians slack).
    pub fn contains_angle(&self, angle: f64, tol: f64) -> bool {
        let rel = if self.sweep >= 0.0 {
            angle_norm(angle - self.start_angle)
        } else {
            angle_norm(self.start_angle - angle)
        };
        rel <= self.sweep.abs() + tol || rel >= TAU - tol
    }

    /// Axis-aligned bounding box including interior axis extrema.
    pub fn bounds(&self) -> Bounds {
        let s = self.start_point();
        let e = self.end_point();
        let mut b = Bounds::new(s.x.min(e.x), s.y.min(e.y), s.x.max(e.x), s.y.max(e.y));
        // Quadrant crossings inside the sweep extend the box.
        for k in 0..4 {
            let a = k as f64 * PI / 2.0;
            if self.contains_angle(a, 1e-12) {
                let p = self.point_at_angle(a);
                b = b.including_point(p.x, p.y);
            }
        }
        b
    }

    /// Nearest point on the arc to `p`.
    pub fn nearest_point(&self, p: Point) -> Point {
        let v = p - self.center;
        if v.length() > f64::EPSILON {
            let a = v.angle();
            if self.contains_angle(a, 1e-12) {
                return self.point_at_angle(a);
            }
        }
        let s = self.start_point();
        let e = self.end_point();
        if p.distance_to(&s) <= p.distance_to(&e) {
            s
        } else {
            e
        }
    }

    /// Intersections of the arc with the segment `a`..`b`.
    pub fn line_intersections(&self, a: Point, b: Point) -> Vec<Point> {
        let mut out = Vec::new();
        let d = b - a;
        let f = a - self.center;
        let qa = d.dot(d);
        if qa < f64::EPSILON {
            return out;
        }
        let qb = 2.0 * f.dot(d);
        let qc = f.dot(f) - self.radius * self.radius;
        let disc = qb * qb - 4.0 * qa * qc;
        if disc < 0.0 {
            return out;
        }
        let sq = disc.sqrt();
        for t in [(-qb - sq) / (2.0 * qa), (-qb + sq) / (2.0 * qa)] {
            if !(0.0..=1.0).contains(&t) {
                continue;
            }
            let p = a + d * t;
            if self.contains_angle((p - self.center).angle(), 1e-9) {
                out.push(p);
            }
        }
        out.dedup_by(|x, y| x.nearly_equals(*y, 1e-12));
        out
    }

    /// Polyline approximation with chordal error at most `tol`.
    /// Always includes both endpoints.
    pub fn tessellate(&self, tol: f64) -> Vec<Point> {
        let max_step = if self.radius > tol && tol > 0.0 {
            (2.0 * (1.0 - tol / self.radius).acos()).min(PI / 4.0)
        } else {
            PI / 4.0
        };
        let n = (self.sweep.abs() / max_step).ceil().max(1.0) as usize;
        (0..=n)
            .map(|i| self.point_at(i as f64 / n as f64))
            .collect()
    }
}
