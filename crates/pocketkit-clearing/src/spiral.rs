//! Flat Archimedean entry spiral.
//!
//! The entry cut winds out from the root slice centre with a constant
//! radial pitch until it lands exactly on the requested start point, so
//! the first slice takes over tangentially.

use pocketkit_core::{Point, RotationDir};
use std::f64::consts::TAU;

/// Spiral polyline from `center` out to `start`, one `pitch` of radial
/// growth per revolution, sampled to chordal tolerance `tol`.
pub fn archimedean(
    center: Point,
    start: Point,
    pitch: f64,
    dir: RotationDir,
    tol: f64,
) -> Vec<Point> {
    let r_max = center.distance_to(&start);
    if r_max <= tol || pitch <= 0.0 {
        return vec![center, start];
    }
    let end_angle = (start - center).angle();
    let phi_total = TAU * r_max / pitch;

    let theta = |phi: f64| match dir {
        RotationDir::Ccw => end_angle - (phi_total - phi),
        RotationDir::Cw => end_angle + (phi_total - phi),
    };

    let mut pts = vec![center];
    let mut phi = 0.0;
    while phi < phi_total {
        let r = pitch * phi / TAU;
        if r > tol {
            let a = theta(phi);
            pts.push(center + Point::new(a.cos(), a.sin()) * r);
        }
        // Finer steps as the radius grows to hold the chord error.
        let step = if r > 2.0 * tol {
            (2.0 * (1.0 - tol / r).acos()).min(TAU / 8.0)
        } else {
            TAU / 8.0
        };
        phi += step;
    }
    pts.push(start);
    pts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spiral_ends_on_start_point() {
        let center = Point::new(5.0, 5.0);
        let start = Point::new(8.0, 5.0);
        let pts = archimedean(center, start, 0.8, RotationDir::Cw, 1e-3);
        assert!(pts[0].nearly_equals(center, 1e-12));
        assert!(pts.last().unwrap().nearly_equals(start, 1e-12));
    }

    #[test]
    fn test_spiral_radius_grows_monotonically() {
        let center = Point::new(0.0, 0.0);
        let start = Point::new(4.0, 0.0);
        let pts = archimedean(center, start, 1.0, RotationDir::Ccw, 1e-3);
        let mut last_r = 0.0;
        for p in &pts {
            let r = center.distance_to(p);
            assert!(r + 1e-9 >= last_r, "radius shrank from {} to {}", last_r, r);
            last_r = r;
        }
        assert!((last_r - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_spiral_pitch_between_revolutions() {
        let center = Point::new(0.0, 0.0);
        let start = Point::new(5.0, 0.0);
        let pitch = 1.0;
        let pts = archimedean(center, start, pitch, RotationDir::Cw, 1e-4);
        // Walk the spiral and measure radial growth across one revolution
        // by comparing points at nearly equal polar angles.
        let probe = pts[pts.len() / 2];
        let probe_r = center.distance_to(&probe);
        let probe_a = (probe - center).angle();
        let next_rev = pts.iter().find(|p| {
            let r = center.distance_to(p);
            r > probe_r + 0.5 * pitch
                && ((**p - center).angle() - probe_a).abs() < 0.1
        });
        if let Some(p) = next_rev {
            let dr = center.distance_to(p) - probe_r;
            assert!((dr - pitch).abs() < 0.1, "pitch drifted: {}", dr);
        }
    }

    #[test]
    fn test_degenerate_spiral() {
        let center = Point::new(1.0, 1.0);
        let pts = archimedean(center, center, 1.0, RotationDir::Cw, 1e-3);
        assert_eq!(pts.len(), 2);
    }
}
