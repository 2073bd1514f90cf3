//! Medial-axis sampling and filtering.
//!
//! Samples the pocket boundary, hands the samples to a Voronoi source and
//! keeps only the bisector segments that run through the pocket interior;
//! those approximate the medial axis transform.

use crate::region::Region;
use crate::voronoi::VoronoiSource;
use pocketkit_core::Point;

/// Builds the filtered medial axis segments of `region`.
///
/// `tol` is the general tolerance: it rejects dust edges and is the
/// clearance band for the strictly-inside test on edge endpoints.
pub fn build_mat(region: &Region, source: &dyn VoronoiSource, tol: f64) -> Vec<(Point, Point)> {
    let samples = region.sample_boundary();
    if samples.is_empty() {
        return Vec::new();
    }
    let bounds = region.bounds().expanded(tol.max(1.0));

    #[cfg(feature = "phantom-point")]
    let (samples, bounds) = stabilise(samples, bounds);

    let edges = source.edges(&samples, &bounds);

    edges
        .into_iter()
        .filter(|(a, b)| a.distance_to(b) > tol)
        .filter(|(a, b)| region.strictly_contains(*a, tol) && region.strictly_contains(*b, tol))
        .filter(|(a, b)| edge_clears_boundary(region, *a, *b))
        .collect()
}

/// Stabiliser for sweep-line generators: one phantom sample below the
/// bottom-left of the set, with the box grown to match. Its edges land
/// outside the region and fall to the interior filter.
#[cfg(feature = "phantom-point")]
fn stabilise(
    mut samples: Vec<Point>,
    bounds: pocketkit_core::Bounds,
) -> (Vec<Point>, pocketkit_core::Bounds) {
    let anchor = samples
        .iter()
        .copied()
        .reduce(|best, p| if (p.y, p.x) < (best.y, best.x) { p } else { best })
        .unwrap();
    let drop = (bounds.max_x - bounds.min_x) / 2.0;
    let phantom = Point::new(anchor.x, anchor.y - drop);
    let bounds = bounds.including_point(phantom.x, phantom.y - drop);
    samples.push(phantom);
    (samples, bounds)
}

#[cfg(feature = "strict-mat-filter")]
fn edge_clears_boundary(region: &Region, a: Point, b: Point) -> bool {
    !region.segment_crosses_boundary(a, b)
}

#[cfg(not(feature = "strict-mat-filter"))]
fn edge_clears_boundary(_region: &Region, _a: Point, _b: Point) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use crate::voronoi::CellVoronoi;
    use cavalier_contours::polyline::{PlineSourceMut, PlineVertex, Polyline};

    fn square(size: f64) -> Polyline<f64> {
        let mut p = Polyline::new();
        p.add_vertex(PlineVertex::new(0.0, 0.0, 0.0));
        p.add_vertex(PlineVertex::new(size, 0.0, 0.0));
        p.add_vertex(PlineVertex::new(size, size, 0.0));
        p.add_vertex(PlineVertex::new(0.0, size, 0.0));
        p.set_is_closed(true);
        p
    }

    #[test]
    fn test_square_mat_runs_through_interior() {
        let region = Region::build(square(10.0), Vec::new(), 1.0, 0.0, 1e-3);
        let mat = build_mat(&region, &CellVoronoi, 1e-3);
        assert!(!mat.is_empty());
        for (a, b) in &mat {
            assert!(region.contains(*a), "endpoint {:?} outside region", a);
            assert!(region.contains(*b), "endpoint {:?} outside region", b);
        }
        // The diagonals of the square medial axis pass near the centre.
        let near_center = mat.iter().any(|(a, b)| {
            a.nearly_equals(Point::new(5.0, 5.0), 0.5) || b.nearly_equals(Point::new(5.0, 5.0), 0.5)
        });
        assert!(near_center);
    }

    #[test]
    fn test_no_dust_edges() {
        let region = Region::build(square(10.0), Vec::new(), 1.0, 0.0, 1e-3);
        let mat = build_mat(&region, &CellVoronoi, 1e-3);
        for (a, b) in &mat {
            assert!(a.distance_to(b) > 1e-3);
        }
    }
}
