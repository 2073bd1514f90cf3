//! Voronoi edge generation for the medial axis.
//!
//! The pipeline only needs unordered bisector segments, so the generator
//! sits behind [`VoronoiSource`] and can be swapped for an external
//! implementation. The built-in [`CellVoronoi`] clips each site's cell
//! out of the bounding rectangle with perpendicular-bisector half-planes,
//! visiting other sites nearest-first and stopping once a bisector can no
//! longer reach the shrunken cell.

use pocketkit_core::{Bounds, Point};

/// Produces the Voronoi edges of a point set within `bounds`.
pub trait VoronoiSource {
    fn edges(&self, sites: &[Point], bounds: &Bounds) -> Vec<(Point, Point)>;
}

/// Built-in half-plane-clipping Voronoi generator.
#[derive(Debug, Default)]
pub struct CellVoronoi;

/// Cell vertex plus the site index that produced the edge leaving it
/// (-1 for a bounding rectangle edge).
#[derive(Debug, Clone, Copy)]
struct CellVertex {
    pos: Point,
    edge_neighbor: i64,
}

impl VoronoiSource for CellVoronoi {
    fn edges(&self, sites: &[Point], bounds: &Bounds) -> Vec<(Point, Point)> {
        let mut edges = Vec::new();
        if sites.len() < 2 {
            return edges;
        }

        // Neighbour candidates ordered by distance, shared across sites.
        let mut order: Vec<usize> = (0..sites.len()).collect();

        for (i, &site) in sites.iter().enumerate() {
            let mut cell = rect_cell(bounds);
            order.sort_by(|&a, &b| {
                let da = sites[a].distance_to(&site);
                let db = sites[b].distance_to(&site);
                da.partial_cmp(&db)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.cmp(&b))
            });

            for &j in order.iter() {
                if j == i || cell.is_empty() {
                    continue;
                }
                let d = sites[j].distance_to(&site);
                if d < f64::EPSILON {
                    continue;
                }
                // Once half the distance exceeds the cell's reach no later
                // (farther) site can clip it either.
                let reach = cell
                    .iter()
                    .map(|v| v.pos.distance_to(&site))
                    .fold(0.0, f64::max);
                if d / 2.0 > reach {
                    break;
                }
                clip_cell(&mut cell, site, sites[j], j as i64);
            }

            // Each bisector edge is shared with one neighbour; the lower
            // site index emits it.
            let n = cell.len();
            for k in 0..n {
                let a = cell[k];
                let b = cell[(k + 1) % n];
                if a.edge_neighbor >= 0
                    && (a.edge_neighbor as usize) > i
                    && a.pos.distance_to(&b.pos) > f64::EPSILON
                {
                    edges.push((a.pos, b.pos));
                }
            }
        }
        edges
    }
}

fn rect_cell(bounds: &Bounds) -> Vec<CellVertex> {
    [
        Point::new(bounds.min_x, bounds.min_y),
        Point::new(bounds.max_x, bounds.min_y),
        Point::new(bounds.max_x, bounds.max_y),
        Point::new(bounds.min_x, bounds.max_y),
    ]
    .into_iter()
    .map(|pos| CellVertex {
        pos,
        edge_neighbor: -1,
    })
    .collect()
}

/// Clips `cell` to the half-plane of points closer to `site` than to
/// `other`; edges created on the bisector carry `neighbor`.
fn clip_cell(cell: &mut Vec<CellVertex>, site: Point, other: Point, neighbor: i64) {
    let mid = site.lerp(other, 0.5);
    let normal = (other - site).unit();
    let side = |p: Point| (p - mid).dot(normal);

    let mut out: Vec<CellVertex> = Vec::with_capacity(cell.len() + 2);
    let n = cell.len();
    for k in 0..n {
        let a = cell[k];
        let b = cell[(k + 1) % n];
        let da = side(a.pos);
        let db = side(b.pos);
        if da <= 0.0 {
            out.push(a);
            if db > 0.0 {
                // Leaving the half-plane: the bisector edge starts here.
                let t = da / (da - db);
                out.push(CellVertex {
                    pos: a.pos.lerp(b.pos, t),
                    edge_neighbor: neighbor,
                });
            }
        } else if db <= 0.0 {
            // Re-entering: the remainder of a's original edge.
            let t = da / (da - db);
            out.push(CellVertex {
                pos: a.pos.lerp(b.pos, t),
                edge_neighbor: a.edge_neighbor,
            });
        }
    }
    *cell = out;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds {
        Bounds::new(-10.0, -10.0, 10.0, 10.0)
    }

    #[test]
    fn test_two_sites_share_one_bisector() {
        let sites = [Point::new(-5.0, 0.0), Point::new(5.0, 0.0)];
        let edges = CellVoronoi.edges(&sites, &bounds());
        assert_eq!(edges.len(), 1);
        let (a, b) = edges[0];
        // Bisector is the x = 0 line.
        assert!(a.x.abs() < 1e-9 && b.x.abs() < 1e-9);
        assert!((a.y - b.y).abs() > 19.0 - 1e-9);
    }

    #[test]
    fn test_square_sites_yield_cross() {
        let sites = [
            Point::new(-2.0, -2.0),
            Point::new(2.0, -2.0),
            Point::new(2.0, 2.0),
            Point::new(-2.0, 2.0),
        ];
        let edges = CellVoronoi.edges(&sites, &bounds());
        // Four bisector edges meeting at the origin (diagonal pairs never
        // share an edge).
        assert_eq!(edges.len(), 4);
        for (a, b) in &edges {
            let touches_origin = a.nearly_equals(Point::new(0.0, 0.0), 1e-9)
                || b.nearly_equals(Point::new(0.0, 0.0), 1e-9);
            assert!(touches_origin, "edge {:?}..{:?} misses the centre", a, b);
        }
    }

    #[test]
    fn test_collinear_sites() {
        let sites = [
            Point::new(-4.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
        ];
        let edges = CellVoronoi.edges(&sites, &bounds());
        assert_eq!(edges.len(), 2);
        for (a, b) in &edges {
            assert!((a.x - b.x).abs() < 1e-9, "bisectors are vertical lines");
            assert!((a.x.abs() - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_edges_are_emitted_once() {
        let sites: Vec<Point> = (0..20)
            .map(|i| Point::new((i % 5) as f64 * 2.0, (i / 5) as f64 * 2.0))
            .collect();
        let edges = CellVoronoi.edges(&sites, &bounds());
        for (i, (a1, b1)) in edges.iter().enumerate() {
            for (a2, b2) in edges.iter().skip(i + 1) {
                let same = (a1.nearly_equals(*a2, 1e-9) && b1.nearly_equals(*b2, 1e-9))
                    || (a1.nearly_equals(*b2, 1e-9) && b1.nearly_equals(*a2, 1e-9));
                assert!(!same, "duplicate edge {:?}..{:?}", a1, b1);
            }
        }
    }
}
