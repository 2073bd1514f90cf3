//! Biarc construction after Ryan Juckett.
//!
//! Given two endpoints with unit tangents, produces two circular arcs
//! that are tangent-continuous at a shared junction point. Either half
//! degenerates to a straight segment when its centre is at infinity.

use crate::arc::{Arc, RotationDir};
use crate::point::Point;
use serde::{Deserialize, Serialize};

/// One half of a biarc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArcOrLine {
    Arc(Arc),
    Line { p1: Point, p2: Point },
}

impl ArcOrLine {
    pub fn start_point(&self) -> Point {
        match self {
            ArcOrLine::Arc(a) => a.start_point(),
            ArcOrLine::Line { p1, .. } => *p1,
        }
    }

    pub fn end_point(&self) -> Point {
        match self {
            ArcOrLine::Arc(a) => a.end_point(),
            ArcOrLine::Line { p2, .. } => *p2,
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            ArcOrLine::Arc(a) => a.length(),
            ArcOrLine::Line { p1, p2 } => p1.distance_to(p2),
        }
    }

    /// Unit tangent at the start, along the direction of travel.
    pub fn start_tangent(&self) -> Point {
        match self {
            ArcOrLine::Arc(a) => a.tangent_at(0.0),
            ArcOrLine::Line { p1, p2 } => (*p2 - *p1).unit(),
        }
    }

    /// Unit tangent at the end, along the direction of travel.
    pub fn end_tangent(&self) -> Point {
        match self {
            ArcOrLine::Arc(a) => a.tangent_at(1.0),
            ArcOrLine::Line { p1, p2 } => (*p2 - *p1).unit(),
        }
    }
}

/// A pair of tangent-continuous arcs joining two point/tangent pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Biarc {
    pub first: ArcOrLine,
    pub second: ArcOrLine,
    pub junction: Point,
}

impl Biarc {
    /// Constructs the biarc from `p1` (unit tangent `t1`) to `p2` (unit tangent `t2`).
    pub fn new(p1: Point, t1: Point, p2: Point, t2: Point) -> Self {
        let v = p2 - p1;
        let t = t1 + t2;
        let denom = 2.0 * (1.0 - t1.dot(t2));

        let d2 = if denom.abs() < f64::EPSILON {
            // Equal tangents: the symmetric solution has no finite d2.
            let alt = 4.0 * v.dot(t2);
            if alt.abs() < f64::EPSILON {
                // Fully degenerate: a straight move covers it.
                let junction = p1.lerp(p2, 0.5);
                return Self {
                    first: ArcOrLine::Line { p1, p2: junction },
                    second: ArcOrLine::Line { p1: junction, p2 },
                    junction,
                };
            }
            v.dot(v) / alt
        } else {
            let vt = v.dot(t);
            (-vt + (vt * vt + denom * v.dot(v)).sqrt()) / denom
        };

        let junction = (p1 + p2 + (t1 - t2) * d2) * 0.5;
        Self {
            first: half_arc(p1, t1, junction, false),
            second: half_arc(p2, t2, junction, true),
            junction,
        }
    }

    pub fn p1(&self) -> Point {
        self.first.start_point()
    }

    pub fn p2(&self) -> Point {
        self.second.end_point()
    }

    pub fn length(&self) -> f64 {
        self.first.length() + self.second.length()
    }
}

/// Arc through `p` (tangent `t`) and the junction `pm`.
///
/// When `reverse` is set, `p` is the exit point and the arc runs `pm` -> `p`.
fn half_arc(p: Point, t: Point, pm: Point, reverse: bool) -> ArcOrLine {
    let chord = pm - p;
    if chord.length() < f64::EPSILON {
        return ArcOrLine::Line { p1: p, p2: pm };
    }
    let n = t.left_normal();
    let denom = 2.0 * n.dot(chord);
    if denom.abs() < f64::EPSILON {
        // Chord parallel to the tangent: straight segment.
        let (p1, p2) = if reverse { (pm, p) } else { (p, pm) };
        return ArcOrLine::Line { p1, p2 };
    }
    let s = chord.dot(chord) / denom;
    let center = p + n * s;
    let dir = if (p - center).cross(t) > 0.0 {
        RotationDir::Ccw
    } else {
        RotationDir::Cw
    };
    let arc = if reverse {
        Arc::from_center_endpoints(center, pm, p, dir)
    } else {
        Arc::from_center_endpoints(center, p, pm, dir)
    };
    ArcOrLine::Arc(arc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_tangent(actual: Point, expected: Point) {
        let angle = actual.unit().cross(expected.unit()).asin().abs();
        assert!(angle <= 1e-9, "tangent off by {} rad", angle);
        assert!(actual.dot(expected) > 0.0, "tangent flipped");
    }

    #[test]
    fn test_biarc_interpolates_endpoints_and_tangents() {
        let p1 = Point::new(0.0, 0.0);
        let t1 = Point::new(1.0, 0.0);
        let p2 = Point::new(10.0, 4.0);
        let t2 = Point::new(0.0, 1.0);
        let b = Biarc::new(p1, t1, p2, t2);

        assert!(b.p1().nearly_equals(p1, 1e-9));
        assert!(b.p2().nearly_equals(p2, 1e-9));
        assert!(b.first.end_point().nearly_equals(b.junction, 1e-9));
        assert!(b.second.start_point().nearly_equals(b.junction, 1e-9));
        assert_tangent(b.first.start_tangent(), t1);
        assert_tangent(b.second.end_tangent(), t2);
        // Tangent continuity at the junction.
        assert_tangent(b.first.end_tangent(), b.second.start_tangent());
    }

    #[test]
    fn test_equal_tangents_collinear_degenerates_to_line() {
        let b = Biarc::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(1.0, 0.0),
        );
        assert!(matches!(b.first, ArcOrLine::Line { .. }));
        assert!(matches!(b.second, ArcOrLine::Line { .. }));
        assert!(b.junction.nearly_equals(Point::new(5.0, 0.0), 1e-9));
        assert!((b.length() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_equal_tangents_offset_produces_s_curve() {
        let b = Biarc::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(1.0, 0.0),
        );
        let (first, second) = match (b.first, b.second) {
            (ArcOrLine::Arc(a), ArcOrLine::Arc(c)) => (a, c),
            other => panic!("expected two arcs, got {:?}", other),
        };
        // Opposite rotation directions make the S shape.
        assert_ne!(first.dir(), second.dir());
        assert!(b.p2().nearly_equals(Point::new(10.0, 5.0), 1e-9));
    }
}
